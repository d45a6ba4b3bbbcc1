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

use crate::rhi::api::*;
use crate::rhi::error::ResourceError;
use std::fmt::Debug;

/// A recorder for one command buffer.
///
/// The recorder owns the command buffer's lifecycle: `Initial` →
/// [`begin`] → `Recording` → [`end`] → `Executable` → submit → `Pending`,
/// back to `Initial` through [`reset`] or a pool reset. Recording methods
/// are only legal in `Recording`; debug builds assert on state misuse.
///
/// Like its pool, a recorder is externally synchronized. It is `Send` so a
/// recording thread can hand finished buffers over, but two threads must
/// not record through it concurrently.
///
/// Binding descriptor sets is two steps: [`set_binding_heaps`] selects the
/// active heaps, then [`set_bindings`] points a set index at an offset
/// inside them. Draws and dispatches read bindings through the offsets
/// captured at [`set_bindings`] time.
///
/// [`begin`]: CommandList::begin
/// [`end`]: CommandList::end
/// [`reset`]: CommandList::reset
/// [`set_binding_heaps`]: CommandList::set_binding_heaps
/// [`set_bindings`]: CommandList::set_bindings
pub trait CommandList: Send + Debug {
    /// The command buffer this recorder records into.
    fn handle(&self) -> CommandBufferId;

    /// Current lifecycle state.
    fn state(&self) -> CommandBufferState;

    /// Opens the buffer for recording. From `Executable` this implicitly
    /// resets first; from `Pending` it is a contract violation.
    fn begin(&mut self) -> Result<(), ResourceError>;

    /// Closes the buffer, moving it to `Executable`.
    fn end(&mut self) -> Result<(), ResourceError>;

    /// Returns the buffer to `Initial`, discarding recorded commands.
    /// Illegal while `Pending`.
    fn reset(&mut self) -> Result<(), ResourceError>;

    /// Begins a render pass over the given attachments.
    fn begin_rendering(&mut self, descriptor: &RenderingDescriptor);

    /// Ends the current render pass.
    fn end_rendering(&mut self);

    /// Sets the active render pipeline.
    fn set_render_pipeline(&mut self, pipeline: RenderPipelineId);

    /// Sets the active compute pipeline.
    fn set_compute_pipeline(&mut self, pipeline: ComputePipelineId);

    /// Selects the binding heaps subsequent [`set_bindings`] calls index
    /// into. At most one heap per [`BindingHeapKind`].
    ///
    /// [`set_bindings`]: CommandList::set_bindings
    fn set_binding_heaps(&mut self, heaps: &[BindingHeapId]);

    /// Points `set_index` of the bound pipeline layout at `offset` slots
    /// into the active heap.
    fn set_bindings(&mut self, set_index: u32, layout: PipelineLayoutId, offset: u64);

    /// Binds vertex buffers starting at slot `first_slot`.
    fn set_vertex_buffers(&mut self, first_slot: u32, buffers: &[VertexBufferBinding]);

    /// Binds the index buffer.
    fn set_index_buffer(&mut self, buffer: ResourceId, offset: u64, format: IndexFormat);

    /// Records a non-indexed draw.
    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32);

    /// Records an indexed draw.
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    );

    /// Records a compute dispatch.
    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32);

    /// Records draws whose arguments the GPU reads from `buffer` at
    /// `offset`, laid out as [`DrawIndirectArgs`].
    fn execute_indirect(&mut self, buffer: ResourceId, offset: u64, draw_count: u32);

    /// Records an explicit barrier.
    fn barrier(&mut self, descriptor: &BarrierDescriptor);

    /// Copies regions between two buffers.
    fn copy_buffer(&mut self, src: ResourceId, dst: ResourceId, regions: &[BufferCopy]);

    /// Copies regions between two textures.
    fn copy_texture(&mut self, src: ResourceId, dst: ResourceId, regions: &[TextureCopy]);

    /// Copies buffer regions into a texture. The texture must be in the
    /// `CopyDst` layout.
    fn copy_buffer_to_texture(&mut self, src: ResourceId, dst: ResourceId, regions: &[BufferTextureCopy]);

    /// Copies texture regions into a buffer. The texture must be in the
    /// `CopySrc` layout.
    fn copy_texture_to_buffer(&mut self, src: ResourceId, dst: ResourceId, regions: &[BufferTextureCopy]);
}
