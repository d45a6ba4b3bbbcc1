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

//! The D3D12-style device.
//!
//! Every GPU object lives in a generational [`HandlePool`] behind its own
//! mutex, so handle lookups validate liveness on every access and the
//! device is internally synchronized without a global lock. Submission
//! replays recorded command logs against host memory in order, which keeps
//! the queue's retire order equal to its submit order by construction.

use halcyon_core::rhi::api::*;
use halcyon_core::rhi::error::{DeviceError, ResourceError, SubmitError, SwapchainError};
use halcyon_core::rhi::traits::{CommandList, GpuDevice, GpuFactory};
use halcyon_core::utils::HandlePool;
use std::cell::UnsafeCell;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::command::{CmdShared, Dx12Command, Dx12CommandList, StateTransition};
use super::conversions::{
    self, map_descriptor_heap_type, map_format, map_heap_type, map_topology, DescriptorHeapType,
    DxgiFormat, HeapType, ResourceStates,
};
use super::sync::{wait_for_values, Dx12Fence, Dx12Semaphore, FenceWaitGroup};

/// The entry point of the D3D12-style backend.
#[derive(Debug, Default)]
pub struct Dx12Factory;

impl Dx12Factory {
    /// Creates the factory.
    pub fn new() -> Self {
        Self
    }
}

impl GpuFactory for Dx12Factory {
    fn backend(&self) -> BackendKind {
        BackendKind::Dx12
    }

    fn enumerate_adapters(&self) -> Vec<AdapterInfo> {
        vec![AdapterInfo {
            name: "Halcyon D3D12 Model Adapter".into(),
            backend: BackendKind::Dx12,
            device_type: DeviceType::Cpu,
        }]
    }

    fn create_device(
        &self,
        adapter_index: usize,
        config: &DeviceConfig,
    ) -> Result<Arc<dyn GpuDevice>, DeviceError> {
        let adapters = self.enumerate_adapters();
        let info = adapters.get(adapter_index).cloned().ok_or_else(|| {
            DeviceError::InitializationFailed(format!("no adapter at index {adapter_index}"))
        })?;
        log::info!(
            "Creating D3D12 device on '{}' ({} frames in flight)",
            info.name,
            config.frames_in_flight
        );
        Ok(Arc::new(Dx12Device::new(info, config.clone())))
    }
}

/// Host storage standing in for one GPU heap. The box never reallocates,
/// so pointers into it stay valid until the block is freed.
#[derive(Debug)]
struct HostBlock {
    bytes: UnsafeCell<Box<[u8]>>,
}

// SAFETY: access goes through raw pointers handed out under the device's
// contract. The host writes mapped Upload/Readback memory while the GPU is
// not using it, and replay runs one command at a time; racing accesses are
// caller contract violations, same as on the native API.
unsafe impl Send for HostBlock {}
unsafe impl Sync for HostBlock {}

impl HostBlock {
    fn new(size: u64) -> Self {
        Self {
            bytes: UnsafeCell::new(vec![0u8; size as usize].into_boxed_slice()),
        }
    }

    fn ptr(&self) -> *mut u8 {
        // SAFETY: only produces the pointer; dereferencing is governed by
        // the contract above.
        unsafe { (*self.bytes.get()).as_mut_ptr() }
    }
}

#[derive(Debug)]
struct MemoryEntry {
    block: Arc<HostBlock>,
    heap_type: MemoryHeapType,
    #[allow(dead_code)]
    native_type: HeapType,
    usage: MemoryUsage,
    size: u64,
}

#[derive(Debug)]
struct ResourceEntry {
    kind: ResourceKind,
    format: Option<Format>,
    extent: Extent3D,
    mip_levels: u32,
    usage: ResourceUsage,
    /// Total byte size (buffer size, or packed texture size across mips).
    size: u64,
    memory: Option<(MemoryId, u64)>,
    state: ResourceStates,
    mapped: bool,
}

#[derive(Debug)]
struct ViewEntry {
    resource: ResourceId,
    kind: ViewKind,
    #[allow(dead_code)]
    format: Option<Format>,
}

#[derive(Debug)]
struct SetLayoutEntry {
    ranges: Vec<BindingRange>,
    #[allow(dead_code)]
    visibility: ShaderStageFlags,
}

#[derive(Debug)]
struct DescriptorHeapEntry {
    native_type: DescriptorHeapType,
    slots: Vec<ResourceViewId>,
}

#[derive(Debug)]
struct PipelineLayoutEntry {
    set_layouts: Vec<BindingSetLayoutId>,
    #[allow(dead_code)]
    push_constants: Vec<PushConstantRange>,
}

#[derive(Debug)]
struct ShaderEntry {
    stage: ShaderStage,
    #[allow(dead_code)]
    entry_point: String,
}

#[derive(Debug)]
struct RenderPipelineEntry {
    #[allow(dead_code)]
    layout: PipelineLayoutId,
    #[allow(dead_code)]
    topology: u32,
    #[allow(dead_code)]
    color_formats: Vec<DxgiFormat>,
}

#[derive(Debug)]
struct ComputePipelineEntry {
    #[allow(dead_code)]
    layout: PipelineLayoutId,
}

#[derive(Debug)]
struct FenceEntry {
    fence: Arc<Dx12Fence>,
}

#[derive(Debug)]
struct SemaphoreEntry {
    semaphore: Arc<Dx12Semaphore>,
}

#[derive(Debug)]
struct QueueEntry {
    #[allow(dead_code)]
    kind: QueueKind,
}

#[derive(Debug)]
struct PoolEntry {
    #[allow(dead_code)]
    queue: QueueId,
    buffers: Vec<CommandBufferId>,
}

#[derive(Debug)]
struct CmdEntry {
    shared: Arc<Mutex<CmdShared>>,
}

#[derive(Debug)]
struct SwapchainEntry {
    images: Vec<BackBuffer>,
    available: Vec<SemaphoreId>,
    memory: MemoryId,
    next: u32,
    acquired: Option<u32>,
}

/// Extent of one mip level.
fn mip_extent(extent: Extent3D, mip: u32) -> Extent3D {
    Extent3D {
        width: (extent.width >> mip).max(1),
        height: (extent.height >> mip).max(1),
        depth_or_array_layers: extent.depth_or_array_layers.max(1),
    }
}

/// Byte size of one mip level, tightly packed.
fn mip_size(extent: Extent3D, mip: u32, format: Format) -> u64 {
    let e = mip_extent(extent, mip);
    u64::from(e.width)
        * u64::from(e.height)
        * u64::from(e.depth_or_array_layers)
        * u64::from(format.bytes_per_texel())
}

/// Byte offset of a mip level within a packed texture.
fn mip_offset(extent: Extent3D, mip: u32, format: Format) -> u64 {
    (0..mip).map(|level| mip_size(extent, level, format)).sum()
}

fn texture_size(extent: Extent3D, mip_levels: u32, format: Format) -> u64 {
    (0..mip_levels.max(1))
        .map(|level| mip_size(extent, level, format))
        .sum()
}

fn align_up(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// True when the window `[offset, offset + size)` lies inside `limit`
/// without the addition wrapping.
fn fits(offset: u64, size: u64, limit: u64) -> bool {
    offset.checked_add(size).is_some_and(|end| end <= limit)
}

/// True when a copy region lies inside the given mip extent.
fn region_fits(origin: Origin3D, extent: Extent3D, mip: Extent3D) -> bool {
    u64::from(origin.x) + u64::from(extent.width) <= u64::from(mip.width)
        && u64::from(origin.y) + u64::from(extent.height) <= u64::from(mip.height)
        && u64::from(origin.z) + u64::from(extent.depth_or_array_layers)
            <= u64::from(mip.depth_or_array_layers)
}

/// A device speaking the descriptor-heap execution model.
#[derive(Debug)]
pub struct Dx12Device {
    info: AdapterInfo,
    #[allow(dead_code)]
    config: DeviceConfig,
    queue_ids: [QueueId; QueueKind::COUNT],
    wait_group: Arc<FenceWaitGroup>,
    used_vram: AtomicU64,

    queues: Mutex<HandlePool<QueueEntry>>,
    memory: Mutex<HandlePool<MemoryEntry>>,
    resources: Mutex<HandlePool<ResourceEntry>>,
    views: Mutex<HandlePool<ViewEntry>>,
    set_layouts: Mutex<HandlePool<SetLayoutEntry>>,
    descriptor_heaps: Mutex<HandlePool<DescriptorHeapEntry>>,
    pipeline_layouts: Mutex<HandlePool<PipelineLayoutEntry>>,
    shaders: Mutex<HandlePool<ShaderEntry>>,
    render_pipelines: Mutex<HandlePool<RenderPipelineEntry>>,
    compute_pipelines: Mutex<HandlePool<ComputePipelineEntry>>,
    fences: Mutex<HandlePool<FenceEntry>>,
    semaphores: Mutex<HandlePool<SemaphoreEntry>>,
    pools: Mutex<HandlePool<PoolEntry>>,
    command_buffers: Mutex<HandlePool<CmdEntry>>,
    swapchains: Mutex<HandlePool<SwapchainEntry>>,
}

impl Dx12Device {
    fn new(info: AdapterInfo, config: DeviceConfig) -> Self {
        let mut queues = HandlePool::new();
        let queue_ids =
            QueueKind::ALL.map(|kind| QueueId::from(queues.insert(QueueEntry { kind })));
        Self {
            info,
            config,
            queue_ids,
            wait_group: Arc::new(FenceWaitGroup::default()),
            used_vram: AtomicU64::new(0),
            queues: Mutex::new(queues),
            memory: Mutex::new(HandlePool::new()),
            resources: Mutex::new(HandlePool::new()),
            views: Mutex::new(HandlePool::new()),
            set_layouts: Mutex::new(HandlePool::new()),
            descriptor_heaps: Mutex::new(HandlePool::new()),
            pipeline_layouts: Mutex::new(HandlePool::new()),
            shaders: Mutex::new(HandlePool::new()),
            render_pipelines: Mutex::new(HandlePool::new()),
            compute_pipelines: Mutex::new(HandlePool::new()),
            fences: Mutex::new(HandlePool::new()),
            semaphores: Mutex::new(HandlePool::new()),
            pools: Mutex::new(HandlePool::new()),
            command_buffers: Mutex::new(HandlePool::new()),
            swapchains: Mutex::new(HandlePool::new()),
        }
    }

    /// Resolves a resource to its backing storage window.
    fn storage_of(
        &self,
        id: ResourceId,
    ) -> Result<(Arc<HostBlock>, u64, u64), SubmitError> {
        let resources = self.resources.lock().unwrap();
        let entry = resources.get(id.raw()).ok_or(SubmitError::InvalidHandle)?;
        let (memory_id, offset) = entry.memory.ok_or_else(|| {
            SubmitError::Backend("copy touches a resource with no bound memory".into())
        })?;
        let size = entry.size;
        drop(resources);

        let memory = self.memory.lock().unwrap();
        let block = memory
            .get(memory_id.raw())
            .ok_or(SubmitError::InvalidHandle)?;
        Ok((Arc::clone(&block.block), offset, size))
    }

    fn texture_info(
        &self,
        id: ResourceId,
    ) -> Result<(Format, Extent3D, u32), SubmitError> {
        let resources = self.resources.lock().unwrap();
        let entry = resources.get(id.raw()).ok_or(SubmitError::InvalidHandle)?;
        debug_assert_eq!(entry.kind, ResourceKind::Texture);
        let format = entry
            .format
            .ok_or_else(|| SubmitError::Backend("texture copy on a formatless resource".into()))?;
        Ok((format, entry.extent, entry.mip_levels))
    }

    fn execute_transitions(&self, transitions: &[StateTransition]) -> Result<(), SubmitError> {
        let mut resources = self.resources.lock().unwrap();
        for transition in transitions {
            let entry = resources
                .get_mut(transition.resource.raw())
                .ok_or(SubmitError::InvalidHandle)?;
            if entry.state != transition.before {
                debug_assert!(
                    false,
                    "transition 'before' state {:?} does not match tracked state {:?}",
                    transition.before, entry.state
                );
                log::warn!(
                    "Resource state mismatch in barrier: recorded {:?}, tracked {:?}",
                    transition.before,
                    entry.state
                );
            }
            entry.state = transition.after;
        }
        Ok(())
    }

    fn execute_copy_buffer(
        &self,
        src: ResourceId,
        dst: ResourceId,
        regions: &[BufferCopy],
    ) -> Result<(), SubmitError> {
        let (src_block, src_base, src_size) = self.storage_of(src)?;
        let (dst_block, dst_base, dst_size) = self.storage_of(dst)?;
        for region in regions {
            if !fits(region.src_offset, region.size, src_size)
                || !fits(region.dst_offset, region.size, dst_size)
            {
                return Err(SubmitError::Backend(
                    "buffer copy region out of bounds".into(),
                ));
            }
            // SAFETY: both windows were bounds-checked against their
            // resources, the blocks outlive the copy through the Arcs, and
            // copy regions between live resources do not overlap by
            // contract.
            unsafe {
                std::ptr::copy_nonoverlapping(
                    src_block.ptr().add((src_base + region.src_offset) as usize),
                    dst_block.ptr().add((dst_base + region.dst_offset) as usize),
                    region.size as usize,
                );
            }
        }
        Ok(())
    }

    /// Row-by-row copy between a buffer window and a texture mip window.
    /// `buffer_to_texture` picks the direction.
    fn execute_copy_buffer_texture(
        &self,
        buffer: ResourceId,
        texture: ResourceId,
        regions: &[BufferTextureCopy],
        buffer_to_texture: bool,
    ) -> Result<(), SubmitError> {
        let (buf_block, buf_base, buf_size) = self.storage_of(buffer)?;
        let (tex_block, tex_base, tex_size) = self.storage_of(texture)?;
        let (format, extent, mip_levels) = self.texture_info(texture)?;

        for region in regions {
            if region.mip_level >= mip_levels.max(1) {
                return Err(SubmitError::Backend("copy addresses a missing mip".into()));
            }
            let mip = mip_extent(extent, region.mip_level);
            let texel = u64::from(format.bytes_per_texel());
            let row_bytes = u64::from(region.extent.width) * texel;
            let buf_pitch = if region.bytes_per_row == 0 {
                row_bytes
            } else {
                u64::from(region.bytes_per_row)
            };
            if !region_fits(region.origin, region.extent, mip) {
                return Err(SubmitError::Backend("texture copy region out of bounds".into()));
            }

            let mip_rel = mip_offset(extent, region.mip_level, format);
            let slice_rows = u64::from(mip.height);
            let mip_pitch = u64::from(mip.width) * texel;

            for z in 0..u64::from(region.extent.depth_or_array_layers) {
                for row in 0..u64::from(region.extent.height) {
                    let row_base = (z * u64::from(region.extent.height) + row) * buf_pitch;
                    let buf_off = match region.buffer_offset.checked_add(row_base) {
                        Some(off) if fits(off, row_bytes, buf_size) => off,
                        _ => {
                            return Err(SubmitError::Backend(
                                "buffer/texture copy row out of bounds".into(),
                            ))
                        }
                    };
                    let tex_off = mip_rel
                        + ((u64::from(region.origin.z) + z) * slice_rows
                            + u64::from(region.origin.y)
                            + row)
                            * mip_pitch
                        + u64::from(region.origin.x) * texel;
                    if !fits(tex_off, row_bytes, tex_size) {
                        return Err(SubmitError::Backend(
                            "buffer/texture copy row out of bounds".into(),
                        ));
                    }
                    // SAFETY: row windows were bounds-checked above and the
                    // two resources are distinct by contract.
                    unsafe {
                        let buf_ptr = buf_block.ptr().add((buf_base + buf_off) as usize);
                        let tex_ptr = tex_block.ptr().add((tex_base + tex_off) as usize);
                        if buffer_to_texture {
                            std::ptr::copy_nonoverlapping(buf_ptr, tex_ptr, row_bytes as usize);
                        } else {
                            std::ptr::copy_nonoverlapping(tex_ptr, buf_ptr, row_bytes as usize);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn execute_copy_texture(
        &self,
        src: ResourceId,
        dst: ResourceId,
        regions: &[TextureCopy],
    ) -> Result<(), SubmitError> {
        let (src_block, src_base, _) = self.storage_of(src)?;
        let (dst_block, dst_base, _) = self.storage_of(dst)?;
        let (src_format, src_extent, src_mips) = self.texture_info(src)?;
        let (dst_format, dst_extent, dst_mips) = self.texture_info(dst)?;
        if src_format.bytes_per_texel() != dst_format.bytes_per_texel() {
            return Err(SubmitError::Backend(
                "texture copy between incompatible formats".into(),
            ));
        }
        let texel = u64::from(src_format.bytes_per_texel());

        for region in regions {
            if region.src_mip >= src_mips.max(1) || region.dst_mip >= dst_mips.max(1) {
                return Err(SubmitError::Backend("copy addresses a missing mip".into()));
            }
            let src_mip = mip_extent(src_extent, region.src_mip);
            let dst_mip = mip_extent(dst_extent, region.dst_mip);
            if !region_fits(region.src_origin, region.extent, src_mip)
                || !region_fits(region.dst_origin, region.extent, dst_mip)
            {
                return Err(SubmitError::Backend(
                    "texture copy region out of bounds".into(),
                ));
            }
            let src_mip_base = src_base + mip_offset(src_extent, region.src_mip, src_format);
            let dst_mip_base = dst_base + mip_offset(dst_extent, region.dst_mip, dst_format);
            let row_bytes = u64::from(region.extent.width) * texel;

            for z in 0..u64::from(region.extent.depth_or_array_layers) {
                for row in 0..u64::from(region.extent.height) {
                    let src_off = src_mip_base
                        + ((u64::from(region.src_origin.z) + z) * u64::from(src_mip.height)
                            + u64::from(region.src_origin.y)
                            + row)
                            * u64::from(src_mip.width)
                            * texel
                        + u64::from(region.src_origin.x) * texel;
                    let dst_off = dst_mip_base
                        + ((u64::from(region.dst_origin.z) + z) * u64::from(dst_mip.height)
                            + u64::from(region.dst_origin.y)
                            + row)
                            * u64::from(dst_mip.width)
                            * texel
                        + u64::from(region.dst_origin.x) * texel;
                    // SAFETY: distinct resources by contract; offsets derive
                    // from each texture's own packed layout.
                    unsafe {
                        std::ptr::copy_nonoverlapping(
                            src_block.ptr().add(src_off as usize),
                            dst_block.ptr().add(dst_off as usize),
                            row_bytes as usize,
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn execute_indirect(
        &self,
        buffer: ResourceId,
        offset: u64,
        draw_count: u32,
    ) -> Result<(), SubmitError> {
        let resources = self.resources.lock().unwrap();
        let entry = resources
            .get(buffer.raw())
            .ok_or(SubmitError::InvalidHandle)?;
        if !entry.usage.contains(ResourceUsage::INDIRECT) {
            return Err(SubmitError::Backend(
                "indirect buffer lacks INDIRECT usage".into(),
            ));
        }
        let args_bytes = std::mem::size_of::<DrawIndirectArgs>() as u64;
        if !fits(offset, u64::from(draw_count) * args_bytes, entry.size) {
            return Err(SubmitError::Backend(
                "indirect arguments out of bounds".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, commands: &[Dx12Command]) -> Result<(), SubmitError> {
        for command in commands {
            match command {
                Dx12Command::Transitions(transitions) => {
                    self.execute_transitions(transitions)?;
                }
                Dx12Command::CopyBuffer { src, dst, regions } => {
                    self.execute_copy_buffer(*src, *dst, regions)?;
                }
                Dx12Command::CopyTexture { src, dst, regions } => {
                    self.execute_copy_texture(*src, *dst, regions)?;
                }
                Dx12Command::CopyBufferToTexture { src, dst, regions } => {
                    self.execute_copy_buffer_texture(*src, *dst, regions, true)?;
                }
                Dx12Command::CopyTextureToBuffer { src, dst, regions } => {
                    self.execute_copy_buffer_texture(*dst, *src, regions, false)?;
                }
                Dx12Command::ExecuteIndirect {
                    buffer,
                    offset,
                    draw_count,
                } => {
                    self.execute_indirect(*buffer, *offset, *draw_count)?;
                }
                // State setters and draws carry no host-memory effect; they
                // were validated while recording.
                _ => {}
            }
        }
        Ok(())
    }
}

impl GpuDevice for Dx12Device {
    fn adapter_info(&self) -> AdapterInfo {
        self.info.clone()
    }

    fn queue(&self, kind: QueueKind) -> QueueId {
        self.queue_ids[kind as usize]
    }

    fn allocate_memory(&self, descriptor: &MemoryDescriptor) -> Result<MemoryId, ResourceError> {
        if descriptor.size == 0 {
            return Err(ResourceError::Backend("zero-sized allocation".into()));
        }
        debug_assert!(descriptor.alignment.is_power_of_two());
        let size = align_up(descriptor.size, descriptor.alignment.max(1));
        let entry = MemoryEntry {
            block: Arc::new(HostBlock::new(size)),
            heap_type: descriptor.heap_type,
            native_type: map_heap_type(descriptor.heap_type),
            usage: descriptor.usage,
            size,
        };
        if descriptor.heap_type == MemoryHeapType::Default {
            self.used_vram.fetch_add(size, Ordering::Relaxed);
        }
        log::debug!(
            "Allocated {} bytes of {:?} memory ({:?})",
            size,
            descriptor.heap_type,
            descriptor.label.as_deref().unwrap_or("unlabelled")
        );
        Ok(MemoryId::from(self.memory.lock().unwrap().insert(entry)))
    }

    fn free_memory(&self, id: MemoryId) -> Result<(), ResourceError> {
        let entry = self
            .memory
            .lock()
            .unwrap()
            .remove(id.raw())
            .ok_or(ResourceError::NotFound)?;
        if entry.heap_type == MemoryHeapType::Default {
            self.used_vram.fetch_sub(entry.size, Ordering::Relaxed);
        }
        Ok(())
    }

    fn get_resource_allocation_info(&self, descriptor: &ResourceDescriptor) -> AllocationInfo {
        match descriptor.kind {
            ResourceKind::Buffer => {
                let alignment = if descriptor.usage.contains(ResourceUsage::CONSTANT) {
                    conversions::CONSTANT_BUFFER_ALIGNMENT
                } else {
                    256
                };
                AllocationInfo {
                    size: align_up(descriptor.size.max(1), alignment),
                    alignment,
                }
            }
            ResourceKind::Texture => {
                let format = descriptor.format.unwrap_or(Format::Rgba8Unorm);
                AllocationInfo {
                    size: align_up(
                        texture_size(descriptor.extent, descriptor.mip_levels, format),
                        conversions::PLACEMENT_ALIGNMENT,
                    ),
                    alignment: conversions::PLACEMENT_ALIGNMENT,
                }
            }
        }
    }

    fn create_resource(&self, descriptor: &ResourceDescriptor) -> Result<ResourceId, ResourceError> {
        let size = match descriptor.kind {
            ResourceKind::Buffer => descriptor.size,
            ResourceKind::Texture => {
                let format = descriptor
                    .format
                    .ok_or_else(|| ResourceError::Backend("texture without a format".into()))?;
                texture_size(descriptor.extent, descriptor.mip_levels, format)
            }
        };
        if size == 0 {
            return Err(ResourceError::Backend("zero-sized resource".into()));
        }
        let entry = ResourceEntry {
            kind: descriptor.kind,
            format: descriptor.format,
            extent: descriptor.extent,
            mip_levels: descriptor.mip_levels,
            usage: descriptor.usage,
            size,
            memory: None,
            state: ResourceStates::COMMON,
            mapped: false,
        };
        Ok(ResourceId::from(
            self.resources.lock().unwrap().insert(entry),
        ))
    }

    fn bind_resource_memory(
        &self,
        resource: ResourceId,
        memory: MemoryId,
        offset: u64,
    ) -> Result<(), ResourceError> {
        let (block_size, block_usage) = {
            let memory_pool = self.memory.lock().unwrap();
            let entry = memory_pool.get(memory.raw()).ok_or(ResourceError::NotFound)?;
            (entry.size, entry.usage)
        };
        let mut resources = self.resources.lock().unwrap();
        let entry = resources
            .get_mut(resource.raw())
            .ok_or(ResourceError::NotFound)?;
        if !fits(offset, entry.size, block_size) {
            return Err(ResourceError::OutOfBounds);
        }
        let needs_rt_heap = entry
            .usage
            .intersects(ResourceUsage::RENDER_TARGET | ResourceUsage::DEPTH_STENCIL);
        if needs_rt_heap && !block_usage.contains(MemoryUsage::RENDER_TARGETS) {
            return Err(ResourceError::Backend(
                "render targets must bind into a RENDER_TARGETS heap".into(),
            ));
        }
        if !needs_rt_heap && !block_usage.contains(MemoryUsage::BUFFERS) {
            return Err(ResourceError::Backend(
                "resource class does not match the heap's usage".into(),
            ));
        }
        entry.memory = Some((memory, offset));
        Ok(())
    }

    fn destroy_resource(&self, id: ResourceId) -> Result<(), ResourceError> {
        self.resources
            .lock()
            .unwrap()
            .remove(id.raw())
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn map_resource(&self, id: ResourceId) -> Result<NonNull<u8>, ResourceError> {
        let (memory_id, offset) = {
            let resources = self.resources.lock().unwrap();
            let entry = resources.get(id.raw()).ok_or(ResourceError::NotFound)?;
            entry.memory.ok_or(ResourceError::Unbound)?
        };
        let ptr = {
            let memory = self.memory.lock().unwrap();
            let block = memory.get(memory_id.raw()).ok_or(ResourceError::NotFound)?;
            if !conversions::is_host_visible(block.heap_type) {
                return Err(ResourceError::Backend(
                    "mapped resource lives in a non-host-visible heap".into(),
                ));
            }
            // SAFETY: offset was validated against the block at bind time.
            let raw = unsafe { block.block.ptr().add(offset as usize) };
            NonNull::new(raw).ok_or_else(|| ResourceError::Backend("null mapping".into()))?
        };
        // The mapped flag flips only once every check has passed.
        let mut resources = self.resources.lock().unwrap();
        if let Some(entry) = resources.get_mut(id.raw()) {
            entry.mapped = true;
        }
        Ok(ptr)
    }

    fn unmap_resource(&self, id: ResourceId) -> Result<(), ResourceError> {
        let mut resources = self.resources.lock().unwrap();
        let entry = resources.get_mut(id.raw()).ok_or(ResourceError::NotFound)?;
        debug_assert!(entry.mapped, "unmap without a map");
        entry.mapped = false;
        Ok(())
    }

    fn create_resource_view(
        &self,
        descriptor: &ResourceViewDescriptor,
    ) -> Result<ResourceViewId, ResourceError> {
        let resources = self.resources.lock().unwrap();
        let entry = resources
            .get(descriptor.resource.raw())
            .ok_or(ResourceError::NotFound)?;
        if entry.memory.is_none() {
            return Err(ResourceError::Unbound);
        }
        let compatible = match descriptor.kind {
            ViewKind::RenderTarget => entry.usage.contains(ResourceUsage::RENDER_TARGET),
            ViewKind::DepthStencil => entry.usage.contains(ResourceUsage::DEPTH_STENCIL),
            ViewKind::ConstantBuffer => entry.usage.contains(ResourceUsage::CONSTANT),
            ViewKind::ShaderResource => entry.usage.contains(ResourceUsage::SHADER_RESOURCE),
            ViewKind::UnorderedAccess => entry.usage.contains(ResourceUsage::STORAGE),
        };
        if !compatible {
            return Err(ResourceError::Backend(format!(
                "{:?} view over a resource without the matching usage",
                descriptor.kind
            )));
        }
        let view = ViewEntry {
            resource: descriptor.resource,
            kind: descriptor.kind,
            format: descriptor.format.or(entry.format),
        };
        drop(resources);
        Ok(ResourceViewId::from(self.views.lock().unwrap().insert(view)))
    }

    fn destroy_resource_view(&self, id: ResourceViewId) -> Result<(), ResourceError> {
        self.views
            .lock()
            .unwrap()
            .remove(id.raw())
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_binding_set_layout(
        &self,
        descriptor: &BindingSetLayoutDescriptor,
    ) -> Result<BindingSetLayoutId, ResourceError> {
        let entry = SetLayoutEntry {
            ranges: descriptor.ranges.to_vec(),
            visibility: descriptor.visibility,
        };
        Ok(BindingSetLayoutId::from(
            self.set_layouts.lock().unwrap().insert(entry),
        ))
    }

    fn destroy_binding_set_layout(&self, id: BindingSetLayoutId) -> Result<(), ResourceError> {
        self.set_layouts
            .lock()
            .unwrap()
            .remove(id.raw())
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_binding_heap(
        &self,
        descriptor: &BindingHeapDescriptor,
    ) -> Result<BindingHeapId, ResourceError> {
        let entry = DescriptorHeapEntry {
            native_type: map_descriptor_heap_type(descriptor.kind),
            slots: vec![ResourceViewId::NULL; descriptor.capacity as usize],
        };
        Ok(BindingHeapId::from(
            self.descriptor_heaps.lock().unwrap().insert(entry),
        ))
    }

    fn destroy_binding_heap(&self, id: BindingHeapId) -> Result<(), ResourceError> {
        self.descriptor_heaps
            .lock()
            .unwrap()
            .remove(id.raw())
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn get_binding_offset(
        &self,
        heap: BindingHeapId,
        layout: BindingSetLayoutId,
        binding_index: u32,
    ) -> Result<u64, ResourceError> {
        let heaps = self.descriptor_heaps.lock().unwrap();
        let heap_entry = heaps.get(heap.raw()).ok_or(ResourceError::NotFound)?;
        let layouts = self.set_layouts.lock().unwrap();
        let layout_entry = layouts.get(layout.raw()).ok_or(ResourceError::NotFound)?;
        let range = layout_entry
            .ranges
            .get(binding_index as usize)
            .ok_or(ResourceError::OutOfBounds)?;
        let expected = map_descriptor_heap_type(match range.binding_type {
            BindingType::Sampler => BindingHeapKind::Sampler,
            _ => BindingHeapKind::ShaderResource,
        });
        if heap_entry.native_type != expected {
            return Err(ResourceError::Backend(
                "binding range class does not match the heap type".into(),
            ));
        }
        // Descriptors of one set occupy consecutive slots, range by range,
        // so the offset of a binding is the sum of the counts before it.
        let offset: u64 = layout_entry.ranges[..binding_index as usize]
            .iter()
            .map(|r| u64::from(r.count))
            .sum();
        if !fits(offset, u64::from(range.count), heap_entry.slots.len() as u64) {
            return Err(ResourceError::OutOfBounds);
        }
        Ok(offset)
    }

    fn write_binding(
        &self,
        heap: BindingHeapId,
        offset: u64,
        view: ResourceViewId,
    ) -> Result<(), ResourceError> {
        {
            let views = self.views.lock().unwrap();
            views.get(view.raw()).ok_or(ResourceError::NotFound)?;
        }
        let mut heaps = self.descriptor_heaps.lock().unwrap();
        let entry = heaps.get_mut(heap.raw()).ok_or(ResourceError::NotFound)?;
        let slot = entry
            .slots
            .get_mut(offset as usize)
            .ok_or(ResourceError::OutOfBounds)?;
        *slot = view;
        Ok(())
    }

    fn create_pipeline_layout(
        &self,
        descriptor: &PipelineLayoutDescriptor,
    ) -> Result<PipelineLayoutId, ResourceError> {
        {
            let layouts = self.set_layouts.lock().unwrap();
            for set in descriptor.set_layouts.iter() {
                layouts.get(set.raw()).ok_or(ResourceError::NotFound)?;
            }
        }
        let entry = PipelineLayoutEntry {
            set_layouts: descriptor.set_layouts.to_vec(),
            push_constants: descriptor.push_constants.to_vec(),
        };
        Ok(PipelineLayoutId::from(
            self.pipeline_layouts.lock().unwrap().insert(entry),
        ))
    }

    fn destroy_pipeline_layout(&self, id: PipelineLayoutId) -> Result<(), ResourceError> {
        self.pipeline_layouts
            .lock()
            .unwrap()
            .remove(id.raw())
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        if descriptor.bytecode.is_empty() {
            return Err(ResourceError::Backend("empty shader bytecode".into()));
        }
        let entry = ShaderEntry {
            stage: descriptor.stage,
            entry_point: descriptor.entry_point.to_string(),
        };
        Ok(ShaderModuleId::from(
            self.shaders.lock().unwrap().insert(entry),
        ))
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        self.shaders
            .lock()
            .unwrap()
            .remove(id.raw())
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError> {
        {
            let layouts = self.pipeline_layouts.lock().unwrap();
            layouts
                .get(descriptor.layout.raw())
                .ok_or(ResourceError::NotFound)?;
        }
        {
            let shaders = self.shaders.lock().unwrap();
            let vertex = shaders
                .get(descriptor.vertex_shader.raw())
                .ok_or(ResourceError::NotFound)?;
            debug_assert_eq!(vertex.stage, ShaderStage::Vertex);
            if let Some(fragment) = descriptor.fragment_shader {
                let fragment = shaders
                    .get(fragment.raw())
                    .ok_or(ResourceError::NotFound)?;
                debug_assert_eq!(fragment.stage, ShaderStage::Fragment);
            }
        }
        let entry = RenderPipelineEntry {
            layout: descriptor.layout,
            topology: map_topology(descriptor.topology),
            color_formats: descriptor
                .color_formats
                .iter()
                .map(|format| map_format(*format))
                .collect(),
        };
        Ok(RenderPipelineId::from(
            self.render_pipelines.lock().unwrap().insert(entry),
        ))
    }

    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError> {
        self.render_pipelines
            .lock()
            .unwrap()
            .remove(id.raw())
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_compute_pipeline(
        &self,
        descriptor: &ComputePipelineDescriptor,
    ) -> Result<ComputePipelineId, ResourceError> {
        {
            let layouts = self.pipeline_layouts.lock().unwrap();
            layouts
                .get(descriptor.layout.raw())
                .ok_or(ResourceError::NotFound)?;
            let shaders = self.shaders.lock().unwrap();
            let shader = shaders
                .get(descriptor.shader.raw())
                .ok_or(ResourceError::NotFound)?;
            debug_assert_eq!(shader.stage, ShaderStage::Compute);
        }
        let entry = ComputePipelineEntry {
            layout: descriptor.layout,
        };
        Ok(ComputePipelineId::from(
            self.compute_pipelines.lock().unwrap().insert(entry),
        ))
    }

    fn destroy_compute_pipeline(&self, id: ComputePipelineId) -> Result<(), ResourceError> {
        self.compute_pipelines
            .lock()
            .unwrap()
            .remove(id.raw())
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_fence(&self, descriptor: &FenceDescriptor) -> Result<FenceId, ResourceError> {
        let entry = FenceEntry {
            fence: Arc::new(Dx12Fence::new(descriptor.initial_value)),
        };
        Ok(FenceId::from(self.fences.lock().unwrap().insert(entry)))
    }

    fn destroy_fence(&self, id: FenceId) -> Result<(), ResourceError> {
        self.fences
            .lock()
            .unwrap()
            .remove(id.raw())
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn fence_value(&self, id: FenceId) -> Result<u64, ResourceError> {
        let fences = self.fences.lock().unwrap();
        let entry = fences.get(id.raw()).ok_or(ResourceError::NotFound)?;
        Ok(entry.fence.completed_value())
    }

    fn wait_for_fences(
        &self,
        descriptor: &WaitDescriptor,
        timeout_ns: u64,
    ) -> Result<WaitStatus, DeviceError> {
        let targets: Vec<(Arc<Dx12Fence>, u64)> = {
            let fences = self.fences.lock().unwrap();
            descriptor
                .fences
                .iter()
                .map(|op| {
                    fences
                        .get(op.fence.raw())
                        .map(|entry| (Arc::clone(&entry.fence), op.value))
                        .ok_or(DeviceError::Resource(ResourceError::NotFound))
                })
                .collect::<Result<_, _>>()?
        };
        if targets.is_empty() {
            return Ok(WaitStatus::Signaled);
        }
        Ok(wait_for_values(
            &self.wait_group,
            &targets,
            descriptor.wait_all,
            timeout_ns,
        ))
    }

    fn create_semaphore(
        &self,
        _descriptor: &SemaphoreDescriptor,
    ) -> Result<SemaphoreId, ResourceError> {
        let entry = SemaphoreEntry {
            semaphore: Arc::new(Dx12Semaphore::new()),
        };
        Ok(SemaphoreId::from(
            self.semaphores.lock().unwrap().insert(entry),
        ))
    }

    fn destroy_semaphore(&self, id: SemaphoreId) -> Result<(), ResourceError> {
        self.semaphores
            .lock()
            .unwrap()
            .remove(id.raw())
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_command_pool(
        &self,
        descriptor: &CommandPoolDescriptor,
    ) -> Result<CommandPoolId, ResourceError> {
        {
            let queues = self.queues.lock().unwrap();
            queues
                .get(descriptor.queue.raw())
                .ok_or(ResourceError::NotFound)?;
        }
        let entry = PoolEntry {
            queue: descriptor.queue,
            buffers: Vec::new(),
        };
        Ok(CommandPoolId::from(self.pools.lock().unwrap().insert(entry)))
    }

    fn reset_command_pool(&self, id: CommandPoolId) -> Result<(), ResourceError> {
        let buffers = {
            let pools = self.pools.lock().unwrap();
            let entry = pools.get(id.raw()).ok_or(ResourceError::NotFound)?;
            entry.buffers.clone()
        };
        let command_buffers = self.command_buffers.lock().unwrap();
        for buffer in buffers {
            if let Some(entry) = command_buffers.get(buffer.raw()) {
                let mut shared = entry.shared.lock().unwrap();
                shared.commands.clear();
                shared.state = CommandBufferState::Initial;
            }
        }
        Ok(())
    }

    fn destroy_command_pool(&self, id: CommandPoolId) -> Result<(), ResourceError> {
        let entry = self
            .pools
            .lock()
            .unwrap()
            .remove(id.raw())
            .ok_or(ResourceError::NotFound)?;
        let mut command_buffers = self.command_buffers.lock().unwrap();
        for buffer in entry.buffers {
            command_buffers.remove(buffer.raw());
        }
        Ok(())
    }

    fn allocate_command_buffer(
        &self,
        pool: CommandPoolId,
    ) -> Result<Box<dyn CommandList>, ResourceError> {
        let mut pools = self.pools.lock().unwrap();
        let pool_entry = pools.get_mut(pool.raw()).ok_or(ResourceError::NotFound)?;
        let shared = Arc::new(Mutex::new(CmdShared {
            state: CommandBufferState::Initial,
            commands: Vec::new(),
            pool,
        }));
        let id = CommandBufferId::from(self.command_buffers.lock().unwrap().insert(CmdEntry {
            shared: Arc::clone(&shared),
        }));
        pool_entry.buffers.push(id);
        Ok(Box::new(Dx12CommandList::new(id, shared)))
    }

    fn submit(&self, queue: QueueId, descriptor: &SubmitDescriptor) -> Result<(), SubmitError> {
        if descriptor.command_buffers.is_empty() {
            return Err(SubmitError::EmptySubmit);
        }
        {
            let queues = self.queues.lock().unwrap();
            queues.get(queue.raw()).ok_or(SubmitError::InvalidHandle)?;
        }

        // Resolve and validate everything before any state changes, so a
        // rejected batch leaves every fence and semaphore untouched.
        let (wait_semaphores, signal_semaphores) = {
            let semaphores = self.semaphores.lock().unwrap();
            let resolve = |ids: &[SemaphoreId]| -> Result<Vec<Arc<Dx12Semaphore>>, SubmitError> {
                ids.iter()
                    .map(|id| {
                        semaphores
                            .get(id.raw())
                            .map(|entry| Arc::clone(&entry.semaphore))
                            .ok_or(SubmitError::InvalidHandle)
                    })
                    .collect()
            };
            (
                resolve(&descriptor.wait_semaphores)?,
                resolve(&descriptor.signal_semaphores)?,
            )
        };
        for semaphore in &wait_semaphores {
            if !semaphore.is_signaled() {
                return Err(SubmitError::SemaphoreUnsignaled);
            }
        }

        let (wait_fences, signal_fences) = {
            let fences = self.fences.lock().unwrap();
            let resolve = |ops: &[FenceOperation]| -> Result<Vec<(Arc<Dx12Fence>, u64)>, SubmitError> {
                ops.iter()
                    .map(|op| {
                        fences
                            .get(op.fence.raw())
                            .map(|entry| (Arc::clone(&entry.fence), op.value))
                            .ok_or(SubmitError::InvalidHandle)
                    })
                    .collect()
            };
            (
                resolve(&descriptor.wait_fences)?,
                resolve(&descriptor.signal_fences)?,
            )
        };

        let logs: Vec<Arc<Mutex<CmdShared>>> = {
            let command_buffers = self.command_buffers.lock().unwrap();
            descriptor
                .command_buffers
                .iter()
                .map(|id| {
                    command_buffers
                        .get(id.raw())
                        .map(|entry| Arc::clone(&entry.shared))
                        .ok_or(SubmitError::InvalidHandle)
                })
                .collect::<Result<_, _>>()?
        };
        for log in &logs {
            if log.lock().unwrap().state != CommandBufferState::Executable {
                return Err(SubmitError::InvalidHandle);
            }
        }

        // Queue-side fence waits. Values signaled by earlier submissions on
        // any queue have already landed; a forward wait blocks here.
        if !wait_fences.is_empty() {
            wait_for_values(&self.wait_group, &wait_fences, true, WAIT_INDEFINITE);
        }

        for log in &logs {
            let commands = {
                let mut shared = log.lock().unwrap();
                shared.state = CommandBufferState::Pending;
                shared.commands.clone()
            };
            self.execute(&commands)?;
        }

        for semaphore in &wait_semaphores {
            semaphore.reset();
        }
        for semaphore in &signal_semaphores {
            semaphore.signal(&self.wait_group);
        }
        for (fence, value) in &signal_fences {
            fence.signal(*value, &self.wait_group);
        }
        Ok(())
    }

    fn create_swapchain(
        &self,
        surface: &dyn SurfaceProvider,
        descriptor: &SwapchainDescriptor,
    ) -> Result<SwapchainId, SwapchainError> {
        debug_assert!(descriptor.buffer_count >= 2, "swapchains are ring-buffered");
        let extent = if descriptor.extent == Extent2D::default() {
            surface.surface_extent()
        } else {
            descriptor.extent
        };
        let extent3d = Extent3D::from_2d(extent);
        let image_desc = ResourceDescriptor::texture_2d(
            descriptor.format,
            extent3d,
            ResourceUsage::RENDER_TARGET | ResourceUsage::COPY_SRC | ResourceUsage::COPY_DST,
        );
        let info = self.get_resource_allocation_info(&image_desc);
        let stride = align_up(info.size, info.alignment);

        let memory = self.allocate_memory(&MemoryDescriptor {
            label: Some("swapchain back buffers".into()),
            size: stride * u64::from(descriptor.buffer_count),
            alignment: info.alignment,
            heap_type: MemoryHeapType::Default,
            usage: MemoryUsage::RENDER_TARGETS,
        })?;

        let mut images = Vec::with_capacity(descriptor.buffer_count as usize);
        let mut available = Vec::with_capacity(descriptor.buffer_count as usize);
        for index in 0..descriptor.buffer_count {
            let resource = self.create_resource(&image_desc)?;
            self.bind_resource_memory(resource, memory, stride * u64::from(index))?;
            // Back buffers start their life presentable.
            {
                let mut resources = self.resources.lock().unwrap();
                if let Some(entry) = resources.get_mut(resource.raw()) {
                    entry.state = ResourceStates::PRESENT;
                }
            }
            let view =
                self.create_resource_view(&ResourceViewDescriptor::whole(resource, ViewKind::RenderTarget))?;
            images.push(BackBuffer { resource, view });
            available.push(self.create_semaphore(&SemaphoreDescriptor::default())?);
        }

        let entry = SwapchainEntry {
            images,
            available,
            memory,
            next: 0,
            acquired: None,
        };
        log::info!(
            "Created {}x{} swapchain with {} back buffers",
            extent.width,
            extent.height,
            descriptor.buffer_count
        );
        Ok(SwapchainId::from(
            self.swapchains.lock().unwrap().insert(entry),
        ))
    }

    fn destroy_swapchain(&self, id: SwapchainId) -> Result<(), SwapchainError> {
        let entry = self
            .swapchains
            .lock()
            .unwrap()
            .remove(id.raw())
            .ok_or(SwapchainError::Resource(ResourceError::NotFound))?;
        for image in entry.images {
            self.destroy_resource_view(image.view)?;
            self.destroy_resource(image.resource)?;
        }
        for semaphore in entry.available {
            self.destroy_semaphore(semaphore)?;
        }
        self.free_memory(entry.memory)?;
        Ok(())
    }

    fn back_buffer(&self, swapchain: SwapchainId, index: u32) -> Result<BackBuffer, SwapchainError> {
        let swapchains = self.swapchains.lock().unwrap();
        let entry = swapchains
            .get(swapchain.raw())
            .ok_or(SwapchainError::Resource(ResourceError::NotFound))?;
        entry
            .images
            .get(index as usize)
            .copied()
            .ok_or(SwapchainError::Resource(ResourceError::OutOfBounds))
    }

    fn acquire_next_frame(&self, swapchain: SwapchainId) -> Result<AcquiredFrame, SwapchainError> {
        let (index, available) = {
            let mut swapchains = self.swapchains.lock().unwrap();
            let entry = swapchains
                .get_mut(swapchain.raw())
                .ok_or(SwapchainError::Resource(ResourceError::NotFound))?;
            let index = entry.next;
            entry.next = (entry.next + 1) % entry.images.len() as u32;
            entry.acquired = Some(index);
            (index, entry.available[index as usize])
        };
        // The model's presentation engine releases an image the moment it
        // is acquired, so the availability semaphore is signaled here.
        let semaphores = self.semaphores.lock().unwrap();
        let entry = semaphores
            .get(available.raw())
            .ok_or(SwapchainError::Acquisition("availability semaphore died".into()))?;
        if !entry.semaphore.is_signaled() {
            entry.semaphore.signal(&self.wait_group);
        }
        Ok(AcquiredFrame { index, available })
    }

    fn present(
        &self,
        swapchain: SwapchainId,
        descriptor: &PresentDescriptor,
    ) -> Result<(), SwapchainError> {
        let image = {
            let mut swapchains = self.swapchains.lock().unwrap();
            let entry = swapchains
                .get_mut(swapchain.raw())
                .ok_or(SwapchainError::Resource(ResourceError::NotFound))?;
            let index = entry
                .acquired
                .take()
                .ok_or_else(|| SwapchainError::Present("present without an acquired image".into()))?;
            entry.images[index as usize].resource
        };

        {
            let semaphores = self.semaphores.lock().unwrap();
            let resolved: Vec<Arc<Dx12Semaphore>> = descriptor
                .wait_semaphores
                .iter()
                .map(|id| {
                    semaphores
                        .get(id.raw())
                        .map(|entry| Arc::clone(&entry.semaphore))
                        .ok_or(SwapchainError::Present("dead wait semaphore".into()))
                })
                .collect::<Result<_, _>>()?;
            for semaphore in &resolved {
                if !semaphore.is_signaled() {
                    return Err(SwapchainError::SemaphoreUnsignaled);
                }
            }
            for semaphore in &resolved {
                semaphore.reset();
            }
        }

        let resources = self.resources.lock().unwrap();
        if let Some(entry) = resources.get(image.raw()) {
            debug_assert_eq!(
                entry.state,
                ResourceStates::PRESENT,
                "presented image is not in the PRESENT state"
            );
        }
        Ok(())
    }

    fn used_vram_bytes(&self) -> u64 {
        self.used_vram.load(Ordering::Relaxed)
    }
}
