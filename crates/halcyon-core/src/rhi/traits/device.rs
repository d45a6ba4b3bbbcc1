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
use crate::rhi::error::{DeviceError, ResourceError, SubmitError, SwapchainError};
use crate::rhi::traits::CommandList;
use std::fmt::Debug;
use std::ptr::NonNull;

/// The main interface for creating and managing GPU objects and submitting
/// work to queues.
///
/// A device is internally synchronized: every method may be called from any
/// thread, with two documented exceptions. Command pools (and the command
/// buffers allocated from them) are externally synchronized, and writing a
/// binding-heap slot that a pending command buffer reads is a race the
/// device does not detect.
///
/// Contract violations — using a destroyed handle, submitting a command
/// buffer that is not `Executable`, rewinding a fence — are programming
/// errors. Debug builds assert on the ones the device can check cheaply;
/// the error types cover the failures a correct program can still hit.
pub trait GpuDevice: Send + Sync + Debug + 'static {
    /// Returns static information about the adapter backing this device.
    fn adapter_info(&self) -> AdapterInfo;

    /// Returns the device queue of the given kind.
    ///
    /// Every device exposes exactly one queue per kind.
    fn queue(&self, kind: QueueKind) -> QueueId;

    // --- Memory ---

    /// Allocates a block of GPU memory.
    /// ## Errors
    /// * `ResourceError::OutOfMemory` - If the heap cannot satisfy the request.
    fn allocate_memory(&self, descriptor: &MemoryDescriptor) -> Result<MemoryId, ResourceError>;

    /// Frees a memory block.
    ///
    /// Resources still bound into the block become invalid; using them
    /// afterwards is a contract violation.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the handle does not name a live block.
    fn free_memory(&self, id: MemoryId) -> Result<(), ResourceError>;

    /// Queries the size and alignment a resource would need from the
    /// allocator.
    ///
    /// Pure with respect to device state; callers query this before
    /// allocating the backing block.
    fn get_resource_allocation_info(&self, descriptor: &ResourceDescriptor) -> AllocationInfo;

    // --- Resources and views ---

    /// Creates a buffer or texture. The resource is unbound until
    /// [`bind_resource_memory`] succeeds.
    ///
    /// [`bind_resource_memory`]: GpuDevice::bind_resource_memory
    /// ## Errors
    /// * `ResourceError::OutOfMemory` - If backend bookkeeping fails.
    fn create_resource(&self, descriptor: &ResourceDescriptor) -> Result<ResourceId, ResourceError>;

    /// Binds a resource into a memory block at the given byte offset.
    ///
    /// The offset must honor the alignment reported by
    /// [`get_resource_allocation_info`], and the window
    /// `[offset, offset + size)` must lie inside the block.
    ///
    /// [`get_resource_allocation_info`]: GpuDevice::get_resource_allocation_info
    /// ## Errors
    /// * `ResourceError::NotFound` - If either handle is dead.
    /// * `ResourceError::OutOfBounds` - If the window leaves the block.
    fn bind_resource_memory(
        &self,
        resource: ResourceId,
        memory: MemoryId,
        offset: u64,
    ) -> Result<(), ResourceError>;

    /// Destroys a resource. Views over it become invalid.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the handle does not name a live resource.
    fn destroy_resource(&self, id: ResourceId) -> Result<(), ResourceError>;

    /// Maps a host-visible resource, returning a pointer to its first byte.
    ///
    /// The pointer stays valid until [`unmap_resource`]. Only resources
    /// bound into `Upload` or `Readback` memory are mappable.
    ///
    /// [`unmap_resource`]: GpuDevice::unmap_resource
    /// ## Errors
    /// * `ResourceError::NotFound` - If the handle is dead.
    /// * `ResourceError::Unbound` - If the resource has no memory yet.
    /// * `ResourceError::Backend` - If the backing heap is not host-visible.
    fn map_resource(&self, id: ResourceId) -> Result<NonNull<u8>, ResourceError>;

    /// Unmaps a previously mapped resource.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the handle is dead.
    fn unmap_resource(&self, id: ResourceId) -> Result<(), ResourceError>;

    /// Creates a typed view over a bound resource.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the resource handle is dead.
    /// * `ResourceError::Unbound` - If the resource has no memory yet.
    fn create_resource_view(
        &self,
        descriptor: &ResourceViewDescriptor,
    ) -> Result<ResourceViewId, ResourceError>;

    /// Destroys a resource view.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the handle does not name a live view.
    fn destroy_resource_view(&self, id: ResourceViewId) -> Result<(), ResourceError>;

    // --- Binding model ---

    /// Creates a binding-set layout.
    fn create_binding_set_layout(
        &self,
        descriptor: &BindingSetLayoutDescriptor,
    ) -> Result<BindingSetLayoutId, ResourceError>;

    /// Destroys a binding-set layout.
    fn destroy_binding_set_layout(&self, id: BindingSetLayoutId) -> Result<(), ResourceError>;

    /// Creates a binding heap with capacity for a fixed number of slots.
    fn create_binding_heap(
        &self,
        descriptor: &BindingHeapDescriptor,
    ) -> Result<BindingHeapId, ResourceError>;

    /// Destroys a binding heap.
    fn destroy_binding_heap(&self, id: BindingHeapId) -> Result<(), ResourceError>;

    /// Returns the slot offset at which `binding_index` of one instance of
    /// `layout` placed at the start of `heap` would live.
    ///
    /// Deterministic: equal inputs always produce equal offsets for the
    /// lifetime of the heap.
    /// ## Errors
    /// * `ResourceError::NotFound` - If either handle is dead.
    /// * `ResourceError::OutOfBounds` - If `binding_index` exceeds the layout.
    fn get_binding_offset(
        &self,
        heap: BindingHeapId,
        layout: BindingSetLayoutId,
        binding_index: u32,
    ) -> Result<u64, ResourceError>;

    /// Writes a resource view into a heap slot.
    ///
    /// Immediately visible to subsequently *submitted* work. Writing a slot
    /// a pending command buffer reads is a race.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the heap or view handle is dead.
    /// * `ResourceError::OutOfBounds` - If `offset` exceeds the heap capacity.
    fn write_binding(
        &self,
        heap: BindingHeapId,
        offset: u64,
        view: ResourceViewId,
    ) -> Result<(), ResourceError>;

    // --- Pipelines ---

    /// Creates a pipeline layout from binding-set layouts and push-constant
    /// ranges.
    fn create_pipeline_layout(
        &self,
        descriptor: &PipelineLayoutDescriptor,
    ) -> Result<PipelineLayoutId, ResourceError>;

    /// Destroys a pipeline layout.
    fn destroy_pipeline_layout(&self, id: PipelineLayoutId) -> Result<(), ResourceError>;

    /// Creates a shader module from backend-native bytecode.
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError>;

    /// Destroys a shader module. Pipelines built from it stay valid.
    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError>;

    /// Creates a render pipeline.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the layout or a shader handle is dead.
    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError>;

    /// Destroys a render pipeline.
    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError>;

    /// Creates a compute pipeline.
    fn create_compute_pipeline(
        &self,
        descriptor: &ComputePipelineDescriptor,
    ) -> Result<ComputePipelineId, ResourceError>;

    /// Destroys a compute pipeline.
    fn destroy_compute_pipeline(&self, id: ComputePipelineId) -> Result<(), ResourceError>;

    // --- Synchronization ---

    /// Creates a monotonic fence starting at `initial_value`.
    fn create_fence(&self, descriptor: &FenceDescriptor) -> Result<FenceId, ResourceError>;

    /// Destroys a fence. Host waits on it must have returned.
    fn destroy_fence(&self, id: FenceId) -> Result<(), ResourceError>;

    /// Reads a fence's current value without blocking.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the handle does not name a live fence.
    fn fence_value(&self, id: FenceId) -> Result<u64, ResourceError>;

    /// Blocks the calling thread until the wait condition is met or the
    /// timeout elapses.
    ///
    /// A wait for value `v` completes once the fence has reached any value
    /// `>= v`, so a waiter that arrives after the signal returns
    /// immediately. `timeout_ns` of [`WAIT_INDEFINITE`] never expires.
    /// Returns [`WaitStatus::TimedOut`] on expiry; a timeout is not an
    /// error.
    fn wait_for_fences(
        &self,
        descriptor: &WaitDescriptor,
        timeout_ns: u64,
    ) -> Result<WaitStatus, DeviceError>;

    /// Creates a binary semaphore in the unsignaled state.
    fn create_semaphore(&self, descriptor: &SemaphoreDescriptor)
        -> Result<SemaphoreId, ResourceError>;

    /// Destroys a semaphore. No pending submission may reference it.
    fn destroy_semaphore(&self, id: SemaphoreId) -> Result<(), ResourceError>;

    // --- Commands ---

    /// Creates a command pool for the given queue.
    fn create_command_pool(
        &self,
        descriptor: &CommandPoolDescriptor,
    ) -> Result<CommandPoolId, ResourceError>;

    /// Resets every command buffer allocated from the pool back to
    /// `Initial` at once.
    ///
    /// All of the pool's buffers must have finished executing; resetting a
    /// pool with a `Pending` buffer is a contract violation.
    fn reset_command_pool(&self, id: CommandPoolId) -> Result<(), ResourceError>;

    /// Destroys a command pool and every command buffer allocated from it.
    fn destroy_command_pool(&self, id: CommandPoolId) -> Result<(), ResourceError>;

    /// Allocates a command buffer from a pool, in the `Initial` state.
    ///
    /// The returned recorder shares the pool's external-synchronization
    /// requirement.
    fn allocate_command_buffer(
        &self,
        pool: CommandPoolId,
    ) -> Result<Box<dyn CommandList>, ResourceError>;

    /// Submits a batch of work to a queue.
    ///
    /// Sub-steps run in a fixed order: wait on semaphores, wait on fences,
    /// execute command buffers, reset the waited semaphores, signal
    /// semaphores, advance fences. If a sub-step fails the batch is
    /// rejected whole and no fence or semaphore changes state. Submitted
    /// command buffers move to `Pending`.
    /// ## Errors
    /// * `SubmitError::EmptySubmit` - If the batch has no command buffers.
    /// * `SubmitError::InvalidHandle` - If any referenced handle is dead.
    /// * `SubmitError::SemaphoreUnsignaled` - If a waited semaphore was
    ///   never signaled by earlier work.
    fn submit(&self, queue: QueueId, descriptor: &SubmitDescriptor) -> Result<(), SubmitError>;

    // --- Presentation ---

    /// Creates a swapchain over a surface.
    /// ## Errors
    /// * `SwapchainError::Resource` - If back-buffer creation fails.
    fn create_swapchain(
        &self,
        surface: &dyn SurfaceProvider,
        descriptor: &SwapchainDescriptor,
    ) -> Result<SwapchainId, SwapchainError>;

    /// Destroys a swapchain and its back-buffer ring.
    fn destroy_swapchain(&self, id: SwapchainId) -> Result<(), SwapchainError>;

    /// Returns the resource and render-target view of one ring image.
    /// ## Errors
    /// * `SwapchainError::Resource` - If `index` exceeds the ring.
    fn back_buffer(&self, swapchain: SwapchainId, index: u32) -> Result<BackBuffer, SwapchainError>;

    /// Acquires the next back buffer for rendering.
    ///
    /// The returned semaphore must be waited on by the first submission
    /// that touches the image.
    /// ## Errors
    /// * `SwapchainError::Acquisition` - If the surface was lost.
    fn acquire_next_frame(&self, swapchain: SwapchainId) -> Result<AcquiredFrame, SwapchainError>;

    /// Presents the most recently acquired back buffer.
    ///
    /// The image must be in the `Present` layout.
    /// ## Errors
    /// * `SwapchainError::SemaphoreUnsignaled` - If a wait semaphore was
    ///   never signaled.
    /// * `SwapchainError::Present` - If presentation itself fails.
    fn present(
        &self,
        swapchain: SwapchainId,
        descriptor: &PresentDescriptor,
    ) -> Result<(), SwapchainError>;

    /// Current device-local memory usage in bytes, for diagnostics.
    fn used_vram_bytes(&self) -> u64;
}
