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

//! Command pools, command-buffer lifecycle state, barriers, copies, and
//! rendering brackets.
//!
//! Barriers are entirely explicit: a recorded command buffer must account
//! for every transition the subsequent draws and copies rely on, including
//! moving a presentable image between `Present` and `RenderTarget` layouts
//! around every render pass that touches it. Nothing is inserted on the
//! caller's behalf.

use crate::halcyon_bitflags;
use crate::rhi::api::dimension::{Extent2D, Extent3D, Origin3D};
use crate::rhi::api::queue::QueueId;
use crate::rhi::api::resource::{ResourceId, ResourceViewId, SubresourceRange, TextureLayout};
use std::borrow::Cow;

crate::halcyon_handle! {
    /// An opaque handle to a command pool.
    CommandPoolId
}

crate::halcyon_handle! {
    /// An opaque handle to a command buffer.
    CommandBufferId
}

/// A descriptor used to create a command pool. Pools are not thread-safe;
/// concurrent recording requires one pool per thread.
#[derive(Debug, Clone)]
pub struct CommandPoolDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The queue command buffers from this pool will be submitted to.
    pub queue: QueueId,
}

/// Lifecycle state of a command buffer.
///
/// `Initial` → (`begin`) → `Recording` → (`end`) → `Executable` →
/// (submit) → `Pending`, returning to `Initial` only through an explicit
/// `reset` or a pool reset. `begin` from `Executable` implicitly resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandBufferState {
    /// Freshly allocated or reset; nothing recorded.
    #[default]
    Initial,
    /// Between `begin` and `end`; recording operations are legal.
    Recording,
    /// Recorded and closed; ready for submission.
    Executable,
    /// Submitted; owned by the GPU until reset.
    Pending,
}

halcyon_bitflags! {
    /// Pipeline stages, for barrier scopes.
    pub struct StageFlags: u32 {
        /// Before any work.
        const TOP_OF_PIPE = 1 << 0;
        /// Vertex attribute and index fetch.
        const VERTEX_INPUT = 1 << 1;
        /// Vertex shading.
        const VERTEX_SHADER = 1 << 2;
        /// Fragment shading.
        const FRAGMENT_SHADER = 1 << 3;
        /// Color-target output (and depth-stencil writes).
        const RENDER_TARGET = 1 << 4;
        /// Compute shading.
        const COMPUTE = 1 << 5;
        /// Copy operations.
        const COPY = 1 << 6;
        /// After all work.
        const BOTTOM_OF_PIPE = 1 << 7;
        /// Every stage.
        const ALL = (1 << 8) - 1;
    }
}

halcyon_bitflags! {
    /// Memory access kinds, for barrier scopes.
    pub struct AccessFlags: u32 {
        /// Vertex buffer read.
        const VERTEX_BUFFER = 1 << 0;
        /// Index buffer read.
        const INDEX_BUFFER = 1 << 1;
        /// Constant buffer read.
        const CONSTANT_BUFFER = 1 << 2;
        /// Shader read through a view.
        const SHADER_READ = 1 << 3;
        /// Shader write through a view.
        const SHADER_WRITE = 1 << 4;
        /// Color-target write.
        const RENDER_TARGET_WRITE = 1 << 5;
        /// Depth-stencil write.
        const DEPTH_WRITE = 1 << 6;
        /// Copy source read.
        const COPY_SRC = 1 << 7;
        /// Copy destination write.
        const COPY_DST = 1 << 8;
        /// Indirect argument read.
        const INDIRECT_ARG = 1 << 9;
    }
}

/// An execution-plus-memory dependency not tied to one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalBarrier {
    /// Stages that must complete first.
    pub src_stage: StageFlags,
    /// Accesses made before the barrier.
    pub src_access: AccessFlags,
    /// Stages that wait.
    pub dst_stage: StageFlags,
    /// Accesses made after the barrier.
    pub dst_access: AccessFlags,
}

/// A dependency scoped to one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferBarrier {
    /// The buffer.
    pub resource: ResourceId,
    /// Stages that must complete first.
    pub src_stage: StageFlags,
    /// Accesses made before the barrier.
    pub src_access: AccessFlags,
    /// Stages that wait.
    pub dst_stage: StageFlags,
    /// Accesses made after the barrier.
    pub dst_access: AccessFlags,
}

/// A dependency plus layout transition scoped to one texture subrange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBarrier {
    /// The texture.
    pub resource: ResourceId,
    /// Stages that must complete first.
    pub src_stage: StageFlags,
    /// Accesses made before the barrier.
    pub src_access: AccessFlags,
    /// Layout before the transition. Must match the texture's actual
    /// layout; the RHI does not track or correct it.
    pub src_layout: TextureLayout,
    /// Stages that wait.
    pub dst_stage: StageFlags,
    /// Accesses made after the barrier.
    pub dst_access: AccessFlags,
    /// Layout after the transition.
    pub dst_layout: TextureLayout,
    /// Subresources covered.
    pub range: SubresourceRange,
}

/// Up to three disjoint groups of dependencies recorded as one barrier.
#[derive(Debug, Clone, Default)]
pub struct BarrierDescriptor<'a> {
    /// Dependencies not tied to a resource.
    pub global: Cow<'a, [GlobalBarrier]>,
    /// Buffer dependencies.
    pub buffers: Cow<'a, [BufferBarrier]>,
    /// Texture dependencies with layout transitions.
    pub textures: Cow<'a, [TextureBarrier]>,
}

impl<'a> BarrierDescriptor<'a> {
    /// A descriptor holding a single texture transition.
    pub fn texture(barrier: TextureBarrier) -> BarrierDescriptor<'static> {
        BarrierDescriptor {
            global: Cow::Borrowed(&[]),
            buffers: Cow::Borrowed(&[]),
            textures: Cow::Owned(vec![barrier]),
        }
    }
}

/// What happens to an attachment's contents when rendering begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadOp {
    /// Keep existing contents.
    #[default]
    Load,
    /// Clear to the attachment's clear value.
    Clear,
    /// Contents are undefined; cheapest when fully overwritten.
    DontCare,
}

/// What happens to an attachment's contents when rendering ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StoreOp {
    /// Keep the results.
    #[default]
    Store,
    /// Results may be discarded.
    Discard,
}

/// One color target of a rendering bracket.
#[derive(Debug, Clone, Copy)]
pub struct ColorAttachment {
    /// Render-target view to write.
    pub view: ResourceViewId,
    /// Load behaviour.
    pub load_op: LoadOp,
    /// Store behaviour.
    pub store_op: StoreOp,
    /// Clear color, used when `load_op` is `Clear`.
    pub clear: [f32; 4],
}

/// The depth-stencil target of a rendering bracket.
#[derive(Debug, Clone, Copy)]
pub struct DepthAttachment {
    /// Depth-stencil view to write.
    pub view: ResourceViewId,
    /// Load behaviour.
    pub load_op: LoadOp,
    /// Store behaviour.
    pub store_op: StoreOp,
    /// Clear depth, used when `load_op` is `Clear`.
    pub clear_depth: f32,
}

/// A descriptor bracketing one render pass (`begin_rendering` ..
/// `end_rendering`).
#[derive(Debug, Clone)]
pub struct RenderingDescriptor<'a> {
    /// Color targets, in target-slot order.
    pub colors: Cow<'a, [ColorAttachment]>,
    /// Optional depth-stencil target.
    pub depth: Option<DepthAttachment>,
    /// The area rendered into.
    pub render_area: Extent2D,
}

/// One bound vertex buffer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBufferBinding {
    /// The buffer. Must carry `ResourceUsage::VERTEX`.
    pub buffer: ResourceId,
    /// Byte offset of the first element.
    pub offset: u64,
}

/// Width of index buffer entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// 16-bit unsigned indices.
    Uint16,
    /// 32-bit unsigned indices.
    #[default]
    Uint32,
}

impl IndexFormat {
    /// Number of enumerators; translation tables are sized against this.
    pub const COUNT: usize = 2;

    /// Size of one index in bytes.
    pub const fn size(&self) -> u64 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// A buffer-to-buffer copy region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCopy {
    /// Byte offset in the source.
    pub src_offset: u64,
    /// Byte offset in the destination.
    pub dst_offset: u64,
    /// Bytes to copy.
    pub size: u64,
}

/// A buffer-to-texture or texture-to-buffer copy region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferTextureCopy {
    /// Byte offset of the first texel in the buffer.
    pub buffer_offset: u64,
    /// Byte stride between rows in the buffer; zero means tightly packed.
    pub bytes_per_row: u32,
    /// Mip level on the texture side.
    pub mip_level: u32,
    /// Texel origin on the texture side.
    pub origin: Origin3D,
    /// Texels to copy.
    pub extent: Extent3D,
}

/// A texture-to-texture copy region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureCopy {
    /// Source mip level.
    pub src_mip: u32,
    /// Source origin.
    pub src_origin: Origin3D,
    /// Destination mip level.
    pub dst_mip: u32,
    /// Destination origin.
    pub dst_origin: Origin3D,
    /// Texels to copy.
    pub extent: Extent3D,
}

/// GPU-read arguments for `execute_indirect`, laid out exactly as the
/// indirect buffer stores them.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawIndirectArgs {
    /// Vertices per instance.
    pub vertex_count: u32,
    /// Instances to draw.
    pub instance_count: u32,
    /// First vertex.
    pub first_vertex: u32,
    /// First instance.
    pub first_instance: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_machine_default_is_initial() {
        assert_eq!(CommandBufferState::default(), CommandBufferState::Initial);
    }

    #[test]
    fn indirect_args_layout_is_16_bytes() {
        // Backends read these straight out of buffer memory.
        assert_eq!(std::mem::size_of::<DrawIndirectArgs>(), 16);
    }

    #[test]
    fn stage_all_covers_every_stage() {
        assert!(StageFlags::ALL.contains(StageFlags::TOP_OF_PIPE));
        assert!(StageFlags::ALL.contains(StageFlags::RENDER_TARGET));
        assert!(StageFlags::ALL.contains(StageFlags::BOTTOM_OF_PIPE));
    }

    #[test]
    fn texture_barrier_shorthand_carries_one_transition() {
        let barrier = TextureBarrier {
            resource: ResourceId::NULL,
            src_stage: StageFlags::TOP_OF_PIPE,
            src_access: AccessFlags::EMPTY,
            src_layout: TextureLayout::Present,
            dst_stage: StageFlags::RENDER_TARGET,
            dst_access: AccessFlags::RENDER_TARGET_WRITE,
            dst_layout: TextureLayout::RenderTarget,
            range: SubresourceRange::default(),
        };
        let desc = BarrierDescriptor::texture(barrier);
        assert!(desc.global.is_empty());
        assert!(desc.buffers.is_empty());
        assert_eq!(desc.textures.len(), 1);
    }
}
