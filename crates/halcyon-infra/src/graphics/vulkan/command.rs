// Copyright 2026 the Halcyon authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command recording for the Vulkan-style backend.
//!
//! The log speaks `vkCmd*` vocabulary: pipeline barriers carry full
//! stage/access masks plus image layout transitions, and bindings are
//! descriptor sets located by their offset into a pool. Unlike the
//! descriptor-heap backend there is no heap-bind step to order against;
//! `set_binding_heaps` only narrows which pools the sets may come from.
//! Recording asserts on the misuses validation layers flag.

use halcyon_core::rhi::api::*;
use halcyon_core::rhi::error::ResourceError;
use halcyon_core::rhi::traits::CommandList;
use std::sync::{Arc, Mutex};

use super::conversions::{map_access_mask, map_index_type, map_layout, map_stage_mask, VkImageLayout};

/// A full image memory barrier in native form.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ImageMemoryBarrier {
    pub image: ResourceId,
    #[allow(dead_code)]
    pub src_stage_mask: u32,
    #[allow(dead_code)]
    pub src_access_mask: u32,
    pub old_layout: VkImageLayout,
    #[allow(dead_code)]
    pub dst_stage_mask: u32,
    #[allow(dead_code)]
    pub dst_access_mask: u32,
    pub new_layout: VkImageLayout,
    #[allow(dead_code)]
    pub range: SubresourceRange,
}

/// A buffer memory barrier in native form.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BufferMemoryBarrier {
    pub buffer: ResourceId,
    #[allow(dead_code)]
    pub src_access_mask: u32,
    #[allow(dead_code)]
    pub dst_access_mask: u32,
}

/// The replayable command vocabulary.
#[derive(Debug, Clone)]
pub(crate) enum VkCommand {
    BeginRendering {
        colors: Vec<ColorAttachment>,
        depth: Option<DepthAttachment>,
    },
    EndRendering,
    BindGraphicsPipeline(RenderPipelineId),
    BindComputePipeline(ComputePipelineId),
    BindDescriptorSets {
        set_index: u32,
        layout: PipelineLayoutId,
        pool_offset: u64,
    },
    BindVertexBuffers {
        first_binding: u32,
        buffers: Vec<VertexBufferBinding>,
    },
    BindIndexBuffer {
        buffer: ResourceId,
        offset: u64,
        index_type: u32,
    },
    Draw {
        vertex_count: u32,
        instance_count: u32,
    },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
    },
    Dispatch {
        groups: [u32; 3],
    },
    DrawIndirect {
        buffer: ResourceId,
        offset: u64,
        draw_count: u32,
    },
    PipelineBarrier {
        src_stage_mask: u32,
        dst_stage_mask: u32,
        buffers: Vec<BufferMemoryBarrier>,
        images: Vec<ImageMemoryBarrier>,
    },
    CopyBuffer {
        src: ResourceId,
        dst: ResourceId,
        regions: Vec<BufferCopy>,
    },
    CopyImage {
        src: ResourceId,
        dst: ResourceId,
        regions: Vec<TextureCopy>,
    },
    CopyBufferToImage {
        src: ResourceId,
        dst: ResourceId,
        regions: Vec<BufferTextureCopy>,
    },
    CopyImageToBuffer {
        src: ResourceId,
        dst: ResourceId,
        regions: Vec<BufferTextureCopy>,
    },
}

/// State shared between a recorder and its device.
#[derive(Debug)]
pub(crate) struct CmdShared {
    pub state: CommandBufferState,
    pub commands: Vec<VkCommand>,
    pub pool: CommandPoolId,
}

#[derive(Debug, Default)]
struct RecordValidation {
    in_pass: bool,
    graphics_pipeline: bool,
    compute_pipeline: bool,
    vertex_buffers: bool,
    index_buffer: bool,
}

/// A command recorder backed by a replayable log.
#[derive(Debug)]
pub struct VulkanCommandList {
    id: CommandBufferId,
    shared: Arc<Mutex<CmdShared>>,
    validation: RecordValidation,
}

impl VulkanCommandList {
    pub(crate) fn new(id: CommandBufferId, shared: Arc<Mutex<CmdShared>>) -> Self {
        Self {
            id,
            shared,
            validation: RecordValidation::default(),
        }
    }

    fn record(&mut self, command: VkCommand) {
        let mut shared = self.shared.lock().unwrap();
        debug_assert_eq!(
            shared.state,
            CommandBufferState::Recording,
            "command recorded outside begin/end"
        );
        shared.commands.push(command);
    }
}

impl CommandList for VulkanCommandList {
    fn handle(&self) -> CommandBufferId {
        self.id
    }

    fn state(&self) -> CommandBufferState {
        self.shared.lock().unwrap().state
    }

    fn begin(&mut self) -> Result<(), ResourceError> {
        let mut shared = self.shared.lock().unwrap();
        match shared.state {
            CommandBufferState::Initial => {}
            // ONE_TIME_SUBMIT semantics: beginning an executable buffer
            // implicitly resets it.
            CommandBufferState::Executable => shared.commands.clear(),
            state => {
                debug_assert!(false, "begin on a command buffer in {state:?}");
                return Err(ResourceError::Backend(format!(
                    "begin on a command buffer in {state:?}"
                )));
            }
        }
        shared.state = CommandBufferState::Recording;
        self.validation = RecordValidation::default();
        Ok(())
    }

    fn end(&mut self) -> Result<(), ResourceError> {
        let mut shared = self.shared.lock().unwrap();
        if shared.state != CommandBufferState::Recording {
            debug_assert!(false, "end on a command buffer in {:?}", shared.state);
            return Err(ResourceError::Backend(format!(
                "end on a command buffer in {:?}",
                shared.state
            )));
        }
        debug_assert!(!self.validation.in_pass, "end inside a render pass");
        shared.state = CommandBufferState::Executable;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ResourceError> {
        let mut shared = self.shared.lock().unwrap();
        if shared.state == CommandBufferState::Pending {
            debug_assert!(false, "reset on a pending command buffer");
            return Err(ResourceError::Backend(
                "reset on a pending command buffer".into(),
            ));
        }
        shared.commands.clear();
        shared.state = CommandBufferState::Initial;
        self.validation = RecordValidation::default();
        Ok(())
    }

    fn begin_rendering(&mut self, descriptor: &RenderingDescriptor) {
        debug_assert!(!self.validation.in_pass, "nested render pass");
        self.validation.in_pass = true;
        self.record(VkCommand::BeginRendering {
            colors: descriptor.colors.to_vec(),
            depth: descriptor.depth,
        });
    }

    fn end_rendering(&mut self) {
        debug_assert!(self.validation.in_pass, "end_rendering outside a pass");
        self.validation.in_pass = false;
        self.record(VkCommand::EndRendering);
    }

    fn set_render_pipeline(&mut self, pipeline: RenderPipelineId) {
        self.validation.graphics_pipeline = true;
        self.record(VkCommand::BindGraphicsPipeline(pipeline));
    }

    fn set_compute_pipeline(&mut self, pipeline: ComputePipelineId) {
        self.validation.compute_pipeline = true;
        self.record(VkCommand::BindComputePipeline(pipeline));
    }

    fn set_binding_heaps(&mut self, _heaps: &[BindingHeapId]) {
        // Descriptor sets carry their pool; there is no heap bind to replay.
    }

    fn set_bindings(&mut self, set_index: u32, layout: PipelineLayoutId, offset: u64) {
        self.record(VkCommand::BindDescriptorSets {
            set_index,
            layout,
            pool_offset: offset,
        });
    }

    fn set_vertex_buffers(&mut self, first_slot: u32, buffers: &[VertexBufferBinding]) {
        self.validation.vertex_buffers = true;
        self.record(VkCommand::BindVertexBuffers {
            first_binding: first_slot,
            buffers: buffers.to_vec(),
        });
    }

    fn set_index_buffer(&mut self, buffer: ResourceId, offset: u64, format: IndexFormat) {
        self.validation.index_buffer = true;
        self.record(VkCommand::BindIndexBuffer {
            buffer,
            offset,
            index_type: map_index_type(format),
        });
    }

    fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        _first_vertex: u32,
        _first_instance: u32,
    ) {
        debug_assert!(self.validation.in_pass, "draw outside a render pass");
        debug_assert!(self.validation.graphics_pipeline, "draw without a pipeline");
        debug_assert!(self.validation.vertex_buffers, "draw without vertex buffers");
        self.record(VkCommand::Draw {
            vertex_count,
            instance_count,
        });
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        _first_index: u32,
        _base_vertex: i32,
        _first_instance: u32,
    ) {
        debug_assert!(self.validation.in_pass, "draw_indexed outside a render pass");
        debug_assert!(
            self.validation.graphics_pipeline,
            "draw_indexed without a pipeline"
        );
        debug_assert!(
            self.validation.index_buffer,
            "draw_indexed without an index buffer"
        );
        self.record(VkCommand::DrawIndexed {
            index_count,
            instance_count,
        });
    }

    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32) {
        debug_assert!(!self.validation.in_pass, "dispatch inside a render pass");
        debug_assert!(self.validation.compute_pipeline, "dispatch without a pipeline");
        self.record(VkCommand::Dispatch {
            groups: [groups_x, groups_y, groups_z],
        });
    }

    fn execute_indirect(&mut self, buffer: ResourceId, offset: u64, draw_count: u32) {
        debug_assert!(self.validation.in_pass, "indirect draw outside a render pass");
        debug_assert!(
            self.validation.graphics_pipeline,
            "indirect draw without a pipeline"
        );
        self.record(VkCommand::DrawIndirect {
            buffer,
            offset,
            draw_count,
        });
    }

    fn barrier(&mut self, descriptor: &BarrierDescriptor) {
        let mut src_stage_mask = 0;
        let mut dst_stage_mask = 0;
        for global in descriptor.global.iter() {
            src_stage_mask |= map_stage_mask(global.src_stage);
            dst_stage_mask |= map_stage_mask(global.dst_stage);
        }
        let buffers: Vec<BufferMemoryBarrier> = descriptor
            .buffers
            .iter()
            .map(|barrier| {
                src_stage_mask |= map_stage_mask(barrier.src_stage);
                dst_stage_mask |= map_stage_mask(barrier.dst_stage);
                BufferMemoryBarrier {
                    buffer: barrier.resource,
                    src_access_mask: map_access_mask(barrier.src_access),
                    dst_access_mask: map_access_mask(barrier.dst_access),
                }
            })
            .collect();
        let images: Vec<ImageMemoryBarrier> = descriptor
            .textures
            .iter()
            .map(|barrier| {
                src_stage_mask |= map_stage_mask(barrier.src_stage);
                dst_stage_mask |= map_stage_mask(barrier.dst_stage);
                ImageMemoryBarrier {
                    image: barrier.resource,
                    src_stage_mask: map_stage_mask(barrier.src_stage),
                    src_access_mask: map_access_mask(barrier.src_access),
                    old_layout: map_layout(barrier.src_layout),
                    dst_stage_mask: map_stage_mask(barrier.dst_stage),
                    dst_access_mask: map_access_mask(barrier.dst_access),
                    new_layout: map_layout(barrier.dst_layout),
                    range: barrier.range,
                }
            })
            .collect();
        self.record(VkCommand::PipelineBarrier {
            src_stage_mask,
            dst_stage_mask,
            buffers,
            images,
        });
    }

    fn copy_buffer(&mut self, src: ResourceId, dst: ResourceId, regions: &[BufferCopy]) {
        debug_assert!(!self.validation.in_pass, "copy inside a render pass");
        self.record(VkCommand::CopyBuffer {
            src,
            dst,
            regions: regions.to_vec(),
        });
    }

    fn copy_texture(&mut self, src: ResourceId, dst: ResourceId, regions: &[TextureCopy]) {
        debug_assert!(!self.validation.in_pass, "copy inside a render pass");
        self.record(VkCommand::CopyImage {
            src,
            dst,
            regions: regions.to_vec(),
        });
    }

    fn copy_buffer_to_texture(
        &mut self,
        src: ResourceId,
        dst: ResourceId,
        regions: &[BufferTextureCopy],
    ) {
        debug_assert!(!self.validation.in_pass, "copy inside a render pass");
        self.record(VkCommand::CopyBufferToImage {
            src,
            dst,
            regions: regions.to_vec(),
        });
    }

    fn copy_texture_to_buffer(
        &mut self,
        src: ResourceId,
        dst: ResourceId,
        regions: &[BufferTextureCopy],
    ) {
        debug_assert!(!self.validation.in_pass, "copy inside a render pass");
        self.record(VkCommand::CopyImageToBuffer {
            src,
            dst,
            regions: regions.to_vec(),
        });
    }
}
