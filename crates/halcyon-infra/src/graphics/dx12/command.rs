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

//! Command recording for the D3D12-style backend.
//!
//! A recorder appends to a command log the device replays at submit time.
//! Barriers are translated into resource-state transitions when recorded,
//! so the log speaks the backend's native vocabulary. Recording keeps a
//! host-side mirror of the bindings a real command list would carry and
//! asserts on the misuses the native debug layer would flag: recording
//! outside `begin`/`end`, draws without a pipeline or vertex buffers, and
//! root-table binds before the descriptor heaps are set.

use halcyon_core::rhi::api::*;
use halcyon_core::rhi::error::ResourceError;
use halcyon_core::rhi::traits::CommandList;
use std::sync::{Arc, Mutex};

use super::conversions::{map_layout, ResourceStates};

/// One resource-state transition, the backend's native barrier form.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StateTransition {
    pub resource: ResourceId,
    pub before: ResourceStates,
    pub after: ResourceStates,
    #[allow(dead_code)]
    pub range: SubresourceRange,
}

/// The replayable command vocabulary.
#[derive(Debug, Clone)]
pub(crate) enum Dx12Command {
    BeginRendering {
        colors: Vec<ColorAttachment>,
        depth: Option<DepthAttachment>,
    },
    EndRendering,
    SetRenderPipeline(RenderPipelineId),
    SetComputePipeline(ComputePipelineId),
    SetDescriptorHeaps(Vec<BindingHeapId>),
    SetRootTable {
        set_index: u32,
        layout: PipelineLayoutId,
        offset: u64,
    },
    SetVertexBuffers {
        first_slot: u32,
        buffers: Vec<VertexBufferBinding>,
    },
    SetIndexBuffer {
        buffer: ResourceId,
        offset: u64,
        format: IndexFormat,
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
    ExecuteIndirect {
        buffer: ResourceId,
        offset: u64,
        draw_count: u32,
    },
    Transitions(Vec<StateTransition>),
    CopyBuffer {
        src: ResourceId,
        dst: ResourceId,
        regions: Vec<BufferCopy>,
    },
    CopyTexture {
        src: ResourceId,
        dst: ResourceId,
        regions: Vec<TextureCopy>,
    },
    CopyBufferToTexture {
        src: ResourceId,
        dst: ResourceId,
        regions: Vec<BufferTextureCopy>,
    },
    CopyTextureToBuffer {
        src: ResourceId,
        dst: ResourceId,
        regions: Vec<BufferTextureCopy>,
    },
}

/// State shared between a recorder and its device: the device replays the
/// log at submit time and flips the lifecycle state from the submit and
/// pool-reset paths.
#[derive(Debug)]
pub(crate) struct CmdShared {
    pub state: CommandBufferState,
    pub commands: Vec<Dx12Command>,
    pub pool: CommandPoolId,
}

/// Host mirror of the bindings a native command list carries, used only
/// for debug-build validation while recording.
#[derive(Debug, Default)]
struct RecordMirror {
    in_pass: bool,
    render_pipeline: bool,
    compute_pipeline: bool,
    heaps_bound: bool,
    vertex_buffers: bool,
    index_buffer: bool,
}

/// A command recorder backed by a replayable log.
#[derive(Debug)]
pub struct Dx12CommandList {
    id: CommandBufferId,
    shared: Arc<Mutex<CmdShared>>,
    mirror: RecordMirror,
}

impl Dx12CommandList {
    pub(crate) fn new(id: CommandBufferId, shared: Arc<Mutex<CmdShared>>) -> Self {
        Self {
            id,
            shared,
            mirror: RecordMirror::default(),
        }
    }

    fn record(&mut self, command: Dx12Command) {
        let mut shared = self.shared.lock().unwrap();
        debug_assert_eq!(
            shared.state,
            CommandBufferState::Recording,
            "command recorded outside begin/end"
        );
        shared.commands.push(command);
    }
}

impl CommandList for Dx12CommandList {
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
            CommandBufferState::Executable => shared.commands.clear(),
            state => {
                debug_assert!(false, "begin on a command buffer in {state:?}");
                return Err(ResourceError::Backend(format!(
                    "begin on a command buffer in {state:?}"
                )));
            }
        }
        shared.state = CommandBufferState::Recording;
        self.mirror = RecordMirror::default();
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
        debug_assert!(!self.mirror.in_pass, "end inside a render pass");
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
        self.mirror = RecordMirror::default();
        Ok(())
    }

    fn begin_rendering(&mut self, descriptor: &RenderingDescriptor) {
        debug_assert!(!self.mirror.in_pass, "nested render pass");
        self.mirror.in_pass = true;
        self.record(Dx12Command::BeginRendering {
            colors: descriptor.colors.to_vec(),
            depth: descriptor.depth,
        });
    }

    fn end_rendering(&mut self) {
        debug_assert!(self.mirror.in_pass, "end_rendering outside a pass");
        self.mirror.in_pass = false;
        self.record(Dx12Command::EndRendering);
    }

    fn set_render_pipeline(&mut self, pipeline: RenderPipelineId) {
        self.mirror.render_pipeline = true;
        self.record(Dx12Command::SetRenderPipeline(pipeline));
    }

    fn set_compute_pipeline(&mut self, pipeline: ComputePipelineId) {
        self.mirror.compute_pipeline = true;
        self.record(Dx12Command::SetComputePipeline(pipeline));
    }

    fn set_binding_heaps(&mut self, heaps: &[BindingHeapId]) {
        debug_assert!(heaps.len() <= BindingHeapKind::COUNT);
        self.mirror.heaps_bound = true;
        self.record(Dx12Command::SetDescriptorHeaps(heaps.to_vec()));
    }

    fn set_bindings(&mut self, set_index: u32, layout: PipelineLayoutId, offset: u64) {
        // Root tables index into the heaps set by SetDescriptorHeaps.
        debug_assert!(
            self.mirror.heaps_bound,
            "set_bindings before set_binding_heaps"
        );
        self.record(Dx12Command::SetRootTable {
            set_index,
            layout,
            offset,
        });
    }

    fn set_vertex_buffers(&mut self, first_slot: u32, buffers: &[VertexBufferBinding]) {
        self.mirror.vertex_buffers = true;
        self.record(Dx12Command::SetVertexBuffers {
            first_slot,
            buffers: buffers.to_vec(),
        });
    }

    fn set_index_buffer(&mut self, buffer: ResourceId, offset: u64, format: IndexFormat) {
        self.mirror.index_buffer = true;
        self.record(Dx12Command::SetIndexBuffer {
            buffer,
            offset,
            format,
        });
    }

    fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        _first_vertex: u32,
        _first_instance: u32,
    ) {
        debug_assert!(self.mirror.in_pass, "draw outside a render pass");
        debug_assert!(self.mirror.render_pipeline, "draw without a pipeline");
        debug_assert!(self.mirror.vertex_buffers, "draw without vertex buffers");
        self.record(Dx12Command::Draw {
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
        debug_assert!(self.mirror.in_pass, "draw_indexed outside a render pass");
        debug_assert!(self.mirror.render_pipeline, "draw_indexed without a pipeline");
        debug_assert!(self.mirror.index_buffer, "draw_indexed without an index buffer");
        self.record(Dx12Command::DrawIndexed {
            index_count,
            instance_count,
        });
    }

    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32) {
        debug_assert!(!self.mirror.in_pass, "dispatch inside a render pass");
        debug_assert!(self.mirror.compute_pipeline, "dispatch without a pipeline");
        self.record(Dx12Command::Dispatch {
            groups: [groups_x, groups_y, groups_z],
        });
    }

    fn execute_indirect(&mut self, buffer: ResourceId, offset: u64, draw_count: u32) {
        debug_assert!(self.mirror.in_pass, "execute_indirect outside a render pass");
        debug_assert!(self.mirror.render_pipeline, "execute_indirect without a pipeline");
        self.record(Dx12Command::ExecuteIndirect {
            buffer,
            offset,
            draw_count,
        });
    }

    fn barrier(&mut self, descriptor: &BarrierDescriptor) {
        // Global and buffer dependencies collapse to execution ordering in
        // an in-order replay; only texture transitions carry state.
        let transitions: Vec<StateTransition> = descriptor
            .textures
            .iter()
            .map(|barrier| StateTransition {
                resource: barrier.resource,
                before: map_layout(barrier.src_layout),
                after: map_layout(barrier.dst_layout),
                range: barrier.range,
            })
            .collect();
        self.record(Dx12Command::Transitions(transitions));
    }

    fn copy_buffer(&mut self, src: ResourceId, dst: ResourceId, regions: &[BufferCopy]) {
        debug_assert!(!self.mirror.in_pass, "copy inside a render pass");
        self.record(Dx12Command::CopyBuffer {
            src,
            dst,
            regions: regions.to_vec(),
        });
    }

    fn copy_texture(&mut self, src: ResourceId, dst: ResourceId, regions: &[TextureCopy]) {
        debug_assert!(!self.mirror.in_pass, "copy inside a render pass");
        self.record(Dx12Command::CopyTexture {
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
        debug_assert!(!self.mirror.in_pass, "copy inside a render pass");
        self.record(Dx12Command::CopyBufferToTexture {
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
        debug_assert!(!self.mirror.in_pass, "copy inside a render pass");
        self.record(Dx12Command::CopyTextureToBuffer {
            src,
            dst,
            regions: regions.to_vec(),
        });
    }
}
