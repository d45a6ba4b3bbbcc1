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

//! The Vulkan-style device.
//!
//! Buffers and images are distinct object classes, as they are natively;
//! a `ResourceId` resolves to one or the other and operations that only
//! make sense for one class reject the other. Fences are timeline
//! semaphores, presentation availability is a binary semaphore, and every
//! image tracks its `VkImageLayout` so pipeline barriers can be checked
//! against what the image is actually in.

use halcyon_core::rhi::api::*;
use halcyon_core::rhi::error::{DeviceError, ResourceError, SubmitError, SwapchainError};
use halcyon_core::rhi::traits::{CommandList, GpuDevice, GpuFactory};
use halcyon_core::utils::HandlePool;
use std::cell::UnsafeCell;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::command::{CmdShared, VkCommand, VulkanCommandList};
use super::conversions::{
    self, map_descriptor_type, map_format, map_memory_properties, MemoryPropertyFlags, VkFormat,
    VkImageLayout,
};
use super::sync::{wait_timelines, BinarySemaphore, SyncTable, TimelineSemaphore};

/// The entry point of the Vulkan-style backend.
#[derive(Debug, Default)]
pub struct VulkanFactory;

impl VulkanFactory {
    /// Creates the factory.
    pub fn new() -> Self {
        Self
    }
}

impl GpuFactory for VulkanFactory {
    fn backend(&self) -> BackendKind {
        BackendKind::Vulkan
    }

    fn enumerate_adapters(&self) -> Vec<AdapterInfo> {
        vec![AdapterInfo {
            name: "Halcyon Vulkan Model Adapter".into(),
            backend: BackendKind::Vulkan,
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
            "Creating Vulkan device on '{}' ({} frames in flight)",
            info.name,
            config.frames_in_flight
        );
        Ok(Arc::new(VulkanDevice::new(info, config.clone())))
    }
}

/// Host storage standing in for one VkDeviceMemory allocation. The box
/// never reallocates, so pointers into it stay valid until freed.
#[derive(Debug)]
struct DeviceMemoryStorage {
    bytes: UnsafeCell<Box<[u8]>>,
}

// SAFETY: access goes through raw pointers handed out under the device's
// contract; racing host and replay accesses to the same bytes are caller
// contract violations, exactly as on the native API.
unsafe impl Send for DeviceMemoryStorage {}
unsafe impl Sync for DeviceMemoryStorage {}

impl DeviceMemoryStorage {
    fn new(size: u64) -> Self {
        Self {
            bytes: UnsafeCell::new(vec![0u8; size as usize].into_boxed_slice()),
        }
    }

    fn ptr(&self) -> *mut u8 {
        // SAFETY: only produces the pointer; see the contract above.
        unsafe { (*self.bytes.get()).as_mut_ptr() }
    }
}

#[derive(Debug)]
struct DeviceMemoryEntry {
    storage: Arc<DeviceMemoryStorage>,
    properties: MemoryPropertyFlags,
    usage: MemoryUsage,
    size: u64,
}

#[derive(Debug)]
struct BufferEntry {
    size: u64,
    usage: ResourceUsage,
    memory: Option<(MemoryId, u64)>,
    mapped: bool,
}

#[derive(Debug)]
struct ImageEntry {
    format: Format,
    extent: Extent3D,
    mip_levels: u32,
    usage: ResourceUsage,
    /// Packed byte size across all mips.
    size: u64,
    memory: Option<(MemoryId, u64)>,
    layout: VkImageLayout,
}

/// A resource is natively either a VkBuffer or a VkImage.
#[derive(Debug)]
enum ResourceEntry {
    Buffer(BufferEntry),
    Image(ImageEntry),
}

impl ResourceEntry {
    fn size(&self) -> u64 {
        match self {
            ResourceEntry::Buffer(buffer) => buffer.size,
            ResourceEntry::Image(image) => image.size,
        }
    }

    fn memory(&self) -> Option<(MemoryId, u64)> {
        match self {
            ResourceEntry::Buffer(buffer) => buffer.memory,
            ResourceEntry::Image(image) => image.memory,
        }
    }

    fn usage(&self) -> ResourceUsage {
        match self {
            ResourceEntry::Buffer(buffer) => buffer.usage,
            ResourceEntry::Image(image) => image.usage,
        }
    }
}

#[derive(Debug)]
struct ViewEntry {
    resource: ResourceId,
    kind: ViewKind,
    #[allow(dead_code)]
    format: Option<VkFormat>,
}

#[derive(Debug)]
struct SetLayoutEntry {
    ranges: Vec<BindingRange>,
    #[allow(dead_code)]
    visibility: ShaderStageFlags,
}

/// A descriptor pool: flat storage the sets of one or more layouts are
/// suballocated from at stable offsets.
#[derive(Debug)]
struct DescriptorPoolEntry {
    kind: BindingHeapKind,
    descriptors: Vec<ResourceViewId>,
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
    color_formats: Vec<VkFormat>,
}

#[derive(Debug)]
struct ComputePipelineEntry {
    #[allow(dead_code)]
    layout: PipelineLayoutId,
}

#[derive(Debug)]
struct FenceEntry {
    timeline: Arc<TimelineSemaphore>,
}

#[derive(Debug)]
struct SemaphoreEntry {
    semaphore: Arc<BinarySemaphore>,
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

fn mip_extent(extent: Extent3D, mip: u32) -> Extent3D {
    Extent3D {
        width: (extent.width >> mip).max(1),
        height: (extent.height >> mip).max(1),
        depth_or_array_layers: extent.depth_or_array_layers.max(1),
    }
}

fn mip_size(extent: Extent3D, mip: u32, format: Format) -> u64 {
    let e = mip_extent(extent, mip);
    u64::from(e.width)
        * u64::from(e.height)
        * u64::from(e.depth_or_array_layers)
        * u64::from(format.bytes_per_texel())
}

fn mip_offset(extent: Extent3D, mip: u32, format: Format) -> u64 {
    (0..mip).map(|level| mip_size(extent, level, format)).sum()
}

fn image_size(extent: Extent3D, mip_levels: u32, format: Format) -> u64 {
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

/// A device speaking the descriptor-set execution model.
#[derive(Debug)]
pub struct VulkanDevice {
    info: AdapterInfo,
    #[allow(dead_code)]
    config: DeviceConfig,
    queue_ids: [QueueId; QueueKind::COUNT],
    sync_table: Arc<SyncTable>,
    used_vram: AtomicU64,

    queues: Mutex<HandlePool<QueueEntry>>,
    memory: Mutex<HandlePool<DeviceMemoryEntry>>,
    resources: Mutex<HandlePool<ResourceEntry>>,
    views: Mutex<HandlePool<ViewEntry>>,
    set_layouts: Mutex<HandlePool<SetLayoutEntry>>,
    descriptor_pools: Mutex<HandlePool<DescriptorPoolEntry>>,
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

impl VulkanDevice {
    fn new(info: AdapterInfo, config: DeviceConfig) -> Self {
        let mut queues = HandlePool::new();
        let queue_ids =
            QueueKind::ALL.map(|kind| QueueId::from(queues.insert(QueueEntry { kind })));
        Self {
            info,
            config,
            queue_ids,
            sync_table: Arc::new(SyncTable::default()),
            used_vram: AtomicU64::new(0),
            queues: Mutex::new(queues),
            memory: Mutex::new(HandlePool::new()),
            resources: Mutex::new(HandlePool::new()),
            views: Mutex::new(HandlePool::new()),
            set_layouts: Mutex::new(HandlePool::new()),
            descriptor_pools: Mutex::new(HandlePool::new()),
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

    fn storage_of(&self, id: ResourceId) -> Result<(Arc<DeviceMemoryStorage>, u64, u64), SubmitError> {
        let (memory_id, offset, size) = {
            let resources = self.resources.lock().unwrap();
            let entry = resources.get(id.raw()).ok_or(SubmitError::InvalidHandle)?;
            let (memory_id, offset) = entry.memory().ok_or_else(|| {
                SubmitError::Backend("copy touches a resource with no bound memory".into())
            })?;
            (memory_id, offset, entry.size())
        };
        let memory = self.memory.lock().unwrap();
        let entry = memory
            .get(memory_id.raw())
            .ok_or(SubmitError::InvalidHandle)?;
        Ok((Arc::clone(&entry.storage), offset, size))
    }

    fn image_info(&self, id: ResourceId) -> Result<(Format, Extent3D, u32), SubmitError> {
        let resources = self.resources.lock().unwrap();
        match resources.get(id.raw()).ok_or(SubmitError::InvalidHandle)? {
            ResourceEntry::Image(image) => Ok((image.format, image.extent, image.mip_levels)),
            ResourceEntry::Buffer(_) => Err(SubmitError::Backend(
                "image operation on a buffer resource".into(),
            )),
        }
    }

    fn execute_pipeline_barrier(
        &self,
        images: &[super::command::ImageMemoryBarrier],
    ) -> Result<(), SubmitError> {
        let mut resources = self.resources.lock().unwrap();
        for barrier in images {
            let entry = resources
                .get_mut(barrier.image.raw())
                .ok_or(SubmitError::InvalidHandle)?;
            let image = match entry {
                ResourceEntry::Image(image) => image,
                ResourceEntry::Buffer(_) => {
                    return Err(SubmitError::Backend(
                        "image barrier on a buffer resource".into(),
                    ))
                }
            };
            // oldLayout may legally be UNDEFINED, which discards contents.
            if barrier.old_layout != VkImageLayout::Undefined
                && image.layout != barrier.old_layout
            {
                debug_assert!(
                    false,
                    "barrier oldLayout {:?} does not match tracked layout {:?}",
                    barrier.old_layout, image.layout
                );
                log::warn!(
                    "Image layout mismatch in barrier: recorded {:?}, tracked {:?}",
                    barrier.old_layout,
                    image.layout
                );
            }
            image.layout = barrier.new_layout;
        }
        Ok(())
    }

    fn execute_copy_buffer(
        &self,
        src: ResourceId,
        dst: ResourceId,
        regions: &[BufferCopy],
    ) -> Result<(), SubmitError> {
        let (src_storage, src_base, src_size) = self.storage_of(src)?;
        let (dst_storage, dst_base, dst_size) = self.storage_of(dst)?;
        for region in regions {
            if !fits(region.src_offset, region.size, src_size)
                || !fits(region.dst_offset, region.size, dst_size)
            {
                return Err(SubmitError::Backend(
                    "buffer copy region out of bounds".into(),
                ));
            }
            // SAFETY: windows bounds-checked above; distinct resources by
            // contract; storages outlive the copy through the Arcs.
            unsafe {
                std::ptr::copy_nonoverlapping(
                    src_storage.ptr().add((src_base + region.src_offset) as usize),
                    dst_storage.ptr().add((dst_base + region.dst_offset) as usize),
                    region.size as usize,
                );
            }
        }
        Ok(())
    }

    fn execute_copy_buffer_image(
        &self,
        buffer: ResourceId,
        image: ResourceId,
        regions: &[BufferTextureCopy],
        buffer_to_image: bool,
    ) -> Result<(), SubmitError> {
        let (buf_storage, buf_base, buf_size) = self.storage_of(buffer)?;
        let (img_storage, img_base, img_size) = self.storage_of(image)?;
        let (format, extent, mip_levels) = self.image_info(image)?;

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
                return Err(SubmitError::Backend("image copy region out of bounds".into()));
            }

            let mip_rel = mip_offset(extent, region.mip_level, format);
            let mip_pitch = u64::from(mip.width) * texel;

            for z in 0..u64::from(region.extent.depth_or_array_layers) {
                for row in 0..u64::from(region.extent.height) {
                    let row_base = (z * u64::from(region.extent.height) + row) * buf_pitch;
                    let buf_off = match region.buffer_offset.checked_add(row_base) {
                        Some(off) if fits(off, row_bytes, buf_size) => off,
                        _ => {
                            return Err(SubmitError::Backend(
                                "buffer/image copy row out of bounds".into(),
                            ))
                        }
                    };
                    let img_off = mip_rel
                        + ((u64::from(region.origin.z) + z) * u64::from(mip.height)
                            + u64::from(region.origin.y)
                            + row)
                            * mip_pitch
                        + u64::from(region.origin.x) * texel;
                    if !fits(img_off, row_bytes, img_size) {
                        return Err(SubmitError::Backend(
                            "buffer/image copy row out of bounds".into(),
                        ));
                    }
                    // SAFETY: row windows bounds-checked above; distinct
                    // resources by contract.
                    unsafe {
                        let buf_ptr = buf_storage.ptr().add((buf_base + buf_off) as usize);
                        let img_ptr = img_storage.ptr().add((img_base + img_off) as usize);
                        if buffer_to_image {
                            std::ptr::copy_nonoverlapping(buf_ptr, img_ptr, row_bytes as usize);
                        } else {
                            std::ptr::copy_nonoverlapping(img_ptr, buf_ptr, row_bytes as usize);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn execute_copy_image(
        &self,
        src: ResourceId,
        dst: ResourceId,
        regions: &[TextureCopy],
    ) -> Result<(), SubmitError> {
        let (src_storage, src_base, _) = self.storage_of(src)?;
        let (dst_storage, dst_base, _) = self.storage_of(dst)?;
        let (src_format, src_extent, src_mips) = self.image_info(src)?;
        let (dst_format, dst_extent, dst_mips) = self.image_info(dst)?;
        if src_format.bytes_per_texel() != dst_format.bytes_per_texel() {
            return Err(SubmitError::Backend(
                "image copy between incompatible formats".into(),
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
                    "image copy region out of bounds".into(),
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
                    // SAFETY: distinct images by contract; offsets derive
                    // from each image's own packed layout.
                    unsafe {
                        std::ptr::copy_nonoverlapping(
                            src_storage.ptr().add(src_off as usize),
                            dst_storage.ptr().add(dst_off as usize),
                            row_bytes as usize,
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn execute_draw_indirect(
        &self,
        buffer: ResourceId,
        offset: u64,
        draw_count: u32,
    ) -> Result<(), SubmitError> {
        let resources = self.resources.lock().unwrap();
        let entry = resources
            .get(buffer.raw())
            .ok_or(SubmitError::InvalidHandle)?;
        if !entry.usage().contains(ResourceUsage::INDIRECT) {
            return Err(SubmitError::Backend(
                "indirect buffer lacks INDIRECT usage".into(),
            ));
        }
        let args_bytes = std::mem::size_of::<DrawIndirectArgs>() as u64;
        if !fits(offset, u64::from(draw_count) * args_bytes, entry.size()) {
            return Err(SubmitError::Backend(
                "indirect arguments out of bounds".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, commands: &[VkCommand]) -> Result<(), SubmitError> {
        for command in commands {
            match command {
                VkCommand::PipelineBarrier { images, .. } => {
                    self.execute_pipeline_barrier(images)?;
                }
                VkCommand::CopyBuffer { src, dst, regions } => {
                    self.execute_copy_buffer(*src, *dst, regions)?;
                }
                VkCommand::CopyImage { src, dst, regions } => {
                    self.execute_copy_image(*src, *dst, regions)?;
                }
                VkCommand::CopyBufferToImage { src, dst, regions } => {
                    self.execute_copy_buffer_image(*src, *dst, regions, true)?;
                }
                VkCommand::CopyImageToBuffer { src, dst, regions } => {
                    self.execute_copy_buffer_image(*dst, *src, regions, false)?;
                }
                VkCommand::DrawIndirect {
                    buffer,
                    offset,
                    draw_count,
                } => {
                    self.execute_draw_indirect(*buffer, *offset, *draw_count)?;
                }
                // Binds and draws were validated while recording and carry
                // no host-memory effect.
                _ => {}
            }
        }
        Ok(())
    }
}

impl GpuDevice for VulkanDevice {
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
        let properties = map_memory_properties(descriptor.heap_type);
        let entry = DeviceMemoryEntry {
            storage: Arc::new(DeviceMemoryStorage::new(size)),
            properties,
            usage: descriptor.usage,
            size,
        };
        if properties.contains(MemoryPropertyFlags::DEVICE_LOCAL) {
            self.used_vram.fetch_add(size, Ordering::Relaxed);
        }
        log::debug!(
            "Allocated {} bytes with properties {:?} ({:?})",
            size,
            properties,
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
        if entry.properties.contains(MemoryPropertyFlags::DEVICE_LOCAL) {
            self.used_vram.fetch_sub(entry.size, Ordering::Relaxed);
        }
        Ok(())
    }

    fn get_resource_allocation_info(&self, descriptor: &ResourceDescriptor) -> AllocationInfo {
        match descriptor.kind {
            ResourceKind::Buffer => AllocationInfo {
                size: align_up(descriptor.size.max(1), conversions::BUFFER_ALIGNMENT),
                alignment: conversions::BUFFER_ALIGNMENT,
            },
            ResourceKind::Texture => {
                let format = descriptor.format.unwrap_or(Format::Rgba8Unorm);
                AllocationInfo {
                    size: align_up(
                        image_size(descriptor.extent, descriptor.mip_levels, format),
                        conversions::IMAGE_ALIGNMENT,
                    ),
                    alignment: conversions::IMAGE_ALIGNMENT,
                }
            }
        }
    }

    fn create_resource(&self, descriptor: &ResourceDescriptor) -> Result<ResourceId, ResourceError> {
        let entry = match descriptor.kind {
            ResourceKind::Buffer => {
                if descriptor.size == 0 {
                    return Err(ResourceError::Backend("zero-sized buffer".into()));
                }
                ResourceEntry::Buffer(BufferEntry {
                    size: descriptor.size,
                    usage: descriptor.usage,
                    memory: None,
                    mapped: false,
                })
            }
            ResourceKind::Texture => {
                let format = descriptor
                    .format
                    .ok_or_else(|| ResourceError::Backend("image without a format".into()))?;
                let size = image_size(descriptor.extent, descriptor.mip_levels, format);
                if size == 0 {
                    return Err(ResourceError::Backend("zero-sized image".into()));
                }
                ResourceEntry::Image(ImageEntry {
                    format,
                    extent: descriptor.extent,
                    mip_levels: descriptor.mip_levels,
                    usage: descriptor.usage,
                    size,
                    memory: None,
                    layout: VkImageLayout::Undefined,
                })
            }
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
        if !fits(offset, entry.size(), block_size) {
            return Err(ResourceError::OutOfBounds);
        }
        let needs_rt_heap = entry
            .usage()
            .intersects(ResourceUsage::RENDER_TARGET | ResourceUsage::DEPTH_STENCIL);
        if needs_rt_heap && !block_usage.contains(MemoryUsage::RENDER_TARGETS) {
            return Err(ResourceError::Backend(
                "attachments must bind into a RENDER_TARGETS allocation".into(),
            ));
        }
        if !needs_rt_heap && !block_usage.contains(MemoryUsage::BUFFERS) {
            return Err(ResourceError::Backend(
                "resource class does not match the allocation's usage".into(),
            ));
        }
        match entry {
            ResourceEntry::Buffer(buffer) => buffer.memory = Some((memory, offset)),
            ResourceEntry::Image(image) => image.memory = Some((memory, offset)),
        }
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
            match resources.get(id.raw()).ok_or(ResourceError::NotFound)? {
                ResourceEntry::Buffer(buffer) => buffer.memory.ok_or(ResourceError::Unbound)?,
                // Only linear buffers are mappable; images go through copies.
                ResourceEntry::Image(_) => {
                    return Err(ResourceError::Backend(
                        "images are not host-mappable".into(),
                    ))
                }
            }
        };
        let ptr = {
            let memory = self.memory.lock().unwrap();
            let entry = memory.get(memory_id.raw()).ok_or(ResourceError::NotFound)?;
            if !entry.properties.contains(MemoryPropertyFlags::HOST_VISIBLE) {
                return Err(ResourceError::Backend(
                    "mapped memory is not HOST_VISIBLE".into(),
                ));
            }
            // SAFETY: offset was validated against the allocation at bind time.
            let raw = unsafe { entry.storage.ptr().add(offset as usize) };
            NonNull::new(raw).ok_or_else(|| ResourceError::Backend("null mapping".into()))?
        };
        // The mapped flag flips only once every check has passed.
        let mut resources = self.resources.lock().unwrap();
        if let Some(ResourceEntry::Buffer(buffer)) = resources.get_mut(id.raw()) {
            buffer.mapped = true;
        }
        Ok(ptr)
    }

    fn unmap_resource(&self, id: ResourceId) -> Result<(), ResourceError> {
        let mut resources = self.resources.lock().unwrap();
        match resources.get_mut(id.raw()).ok_or(ResourceError::NotFound)? {
            ResourceEntry::Buffer(buffer) => {
                debug_assert!(buffer.mapped, "unmap without a map");
                buffer.mapped = false;
                Ok(())
            }
            ResourceEntry::Image(_) => Err(ResourceError::Backend(
                "images are not host-mappable".into(),
            )),
        }
    }

    fn create_resource_view(
        &self,
        descriptor: &ResourceViewDescriptor,
    ) -> Result<ResourceViewId, ResourceError> {
        let native_format = {
            let resources = self.resources.lock().unwrap();
            let entry = resources
                .get(descriptor.resource.raw())
                .ok_or(ResourceError::NotFound)?;
            if entry.memory().is_none() {
                return Err(ResourceError::Unbound);
            }
            let compatible = match descriptor.kind {
                ViewKind::RenderTarget => entry.usage().contains(ResourceUsage::RENDER_TARGET),
                ViewKind::DepthStencil => entry.usage().contains(ResourceUsage::DEPTH_STENCIL),
                ViewKind::ConstantBuffer => entry.usage().contains(ResourceUsage::CONSTANT),
                ViewKind::ShaderResource => entry.usage().contains(ResourceUsage::SHADER_RESOURCE),
                ViewKind::UnorderedAccess => entry.usage().contains(ResourceUsage::STORAGE),
            };
            if !compatible {
                return Err(ResourceError::Backend(format!(
                    "{:?} view over a resource without the matching usage",
                    descriptor.kind
                )));
            }
            match entry {
                ResourceEntry::Image(image) => {
                    Some(map_format(descriptor.format.unwrap_or(image.format)))
                }
                ResourceEntry::Buffer(_) => descriptor.format.map(map_format),
            }
        };
        let view = ViewEntry {
            resource: descriptor.resource,
            kind: descriptor.kind,
            format: native_format,
        };
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
        let entry = DescriptorPoolEntry {
            kind: descriptor.kind,
            descriptors: vec![ResourceViewId::NULL; descriptor.capacity as usize],
        };
        Ok(BindingHeapId::from(
            self.descriptor_pools.lock().unwrap().insert(entry),
        ))
    }

    fn destroy_binding_heap(&self, id: BindingHeapId) -> Result<(), ResourceError> {
        self.descriptor_pools
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
        let pools = self.descriptor_pools.lock().unwrap();
        let pool = pools.get(heap.raw()).ok_or(ResourceError::NotFound)?;
        let layouts = self.set_layouts.lock().unwrap();
        let layout_entry = layouts.get(layout.raw()).ok_or(ResourceError::NotFound)?;
        let range = layout_entry
            .ranges
            .get(binding_index as usize)
            .ok_or(ResourceError::OutOfBounds)?;
        let wants_sampler_pool = map_descriptor_type(range.binding_type)
            == super::conversions::VkDescriptorType::Sampler;
        let is_sampler_pool = pool.kind == BindingHeapKind::Sampler;
        if wants_sampler_pool != is_sampler_pool {
            return Err(ResourceError::Backend(
                "descriptor type does not match the pool class".into(),
            ));
        }
        // A set is suballocated contiguously from the pool start, so a
        // binding's offset is the sum of the range counts before it. The
        // same rule the descriptor-heap backend uses, which is what makes
        // offsets portable across backends.
        let offset: u64 = layout_entry.ranges[..binding_index as usize]
            .iter()
            .map(|r| u64::from(r.count))
            .sum();
        if !fits(offset, u64::from(range.count), pool.descriptors.len() as u64) {
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
        let mut pools = self.descriptor_pools.lock().unwrap();
        let pool = pools.get_mut(heap.raw()).ok_or(ResourceError::NotFound)?;
        let slot = pool
            .descriptors
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
        // SPIR-V words are 32-bit.
        if descriptor.bytecode.len() % 4 != 0 {
            return Err(ResourceError::Backend(
                "shader bytecode is not a whole number of words".into(),
            ));
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
                let fragment = shaders.get(fragment.raw()).ok_or(ResourceError::NotFound)?;
                debug_assert_eq!(fragment.stage, ShaderStage::Fragment);
            }
        }
        let entry = RenderPipelineEntry {
            layout: descriptor.layout,
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
            timeline: Arc::new(TimelineSemaphore::new(descriptor.initial_value)),
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
        Ok(entry.timeline.counter())
    }

    fn wait_for_fences(
        &self,
        descriptor: &WaitDescriptor,
        timeout_ns: u64,
    ) -> Result<WaitStatus, DeviceError> {
        let targets: Vec<(Arc<TimelineSemaphore>, u64)> = {
            let fences = self.fences.lock().unwrap();
            descriptor
                .fences
                .iter()
                .map(|op| {
                    fences
                        .get(op.fence.raw())
                        .map(|entry| (Arc::clone(&entry.timeline), op.value))
                        .ok_or(DeviceError::Resource(ResourceError::NotFound))
                })
                .collect::<Result<_, _>>()?
        };
        if targets.is_empty() {
            return Ok(WaitStatus::Signaled);
        }
        Ok(wait_timelines(
            &self.sync_table,
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
            semaphore: Arc::new(BinarySemaphore::new()),
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
        Ok(Box::new(VulkanCommandList::new(id, shared)))
    }

    fn submit(&self, queue: QueueId, descriptor: &SubmitDescriptor) -> Result<(), SubmitError> {
        if descriptor.command_buffers.is_empty() {
            return Err(SubmitError::EmptySubmit);
        }
        {
            let queues = self.queues.lock().unwrap();
            queues.get(queue.raw()).ok_or(SubmitError::InvalidHandle)?;
        }

        // Resolve and validate everything first; a rejected batch must not
        // change any fence or semaphore.
        let (wait_semaphores, signal_semaphores) = {
            let semaphores = self.semaphores.lock().unwrap();
            let resolve = |ids: &[SemaphoreId]| -> Result<Vec<Arc<BinarySemaphore>>, SubmitError> {
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

        let (wait_timeline_ops, signal_timeline_ops) = {
            let fences = self.fences.lock().unwrap();
            let resolve =
                |ops: &[FenceOperation]| -> Result<Vec<(Arc<TimelineSemaphore>, u64)>, SubmitError> {
                    ops.iter()
                        .map(|op| {
                            fences
                                .get(op.fence.raw())
                                .map(|entry| (Arc::clone(&entry.timeline), op.value))
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

        if !wait_timeline_ops.is_empty() {
            wait_timelines(&self.sync_table, &wait_timeline_ops, true, WAIT_INDEFINITE);
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
            semaphore.consume();
        }
        for semaphore in &signal_semaphores {
            semaphore.signal();
        }
        for (timeline, value) in &signal_timeline_ops {
            timeline.advance(*value, &self.sync_table);
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
            label: Some("swapchain images".into()),
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
            // The presentation engine hands images over in PRESENT_SRC.
            {
                let mut resources = self.resources.lock().unwrap();
                if let Some(ResourceEntry::Image(image)) = resources.get_mut(resource.raw()) {
                    image.layout = VkImageLayout::PresentSrcKhr;
                }
            }
            let view = self.create_resource_view(&ResourceViewDescriptor::whole(
                resource,
                ViewKind::RenderTarget,
            ))?;
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
            "Created {}x{} swapchain with {} images",
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
        // The model's presentation engine releases images immediately, so
        // the availability semaphore is signaled at acquire time.
        let semaphores = self.semaphores.lock().unwrap();
        let entry = semaphores
            .get(available.raw())
            .ok_or_else(|| SwapchainError::Acquisition("availability semaphore died".into()))?;
        if !entry.semaphore.is_signaled() {
            entry.semaphore.signal();
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
            let index = entry.acquired.take().ok_or_else(|| {
                SwapchainError::Present("present without an acquired image".into())
            })?;
            entry.images[index as usize].resource
        };

        {
            let semaphores = self.semaphores.lock().unwrap();
            let resolved: Vec<Arc<BinarySemaphore>> = descriptor
                .wait_semaphores
                .iter()
                .map(|id| {
                    semaphores
                        .get(id.raw())
                        .map(|entry| Arc::clone(&entry.semaphore))
                        .ok_or_else(|| SwapchainError::Present("dead wait semaphore".into()))
                })
                .collect::<Result<_, _>>()?;
            for semaphore in &resolved {
                if !semaphore.is_signaled() {
                    return Err(SwapchainError::SemaphoreUnsignaled);
                }
            }
            for semaphore in &resolved {
                semaphore.consume();
            }
        }

        let resources = self.resources.lock().unwrap();
        if let Some(ResourceEntry::Image(entry)) = resources.get(image.raw()) {
            debug_assert_eq!(
                entry.layout,
                VkImageLayout::PresentSrcKhr,
                "presented image is not in PRESENT_SRC layout"
            );
        }
        Ok(())
    }

    fn used_vram_bytes(&self) -> u64 {
        self.used_vram.load(Ordering::Relaxed)
    }
}
