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

//! Explicit GPU memory allocation.
//!
//! Memory is allocated in typed blocks; resources bind into a block at a
//! caller-chosen offset. The required size and alignment come from
//! [`GpuDevice::get_resource_allocation_info`], which must be queried
//! before allocating — that ordering is part of the contract.
//!
//! [`GpuDevice::get_resource_allocation_info`]: crate::rhi::traits::GpuDevice::get_resource_allocation_info

use crate::halcyon_bitflags;
use std::borrow::Cow;

/// Which side of the bus owns a memory block and how the host may touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryHeapType {
    /// Host-visible, write-combined. The host maps and writes; the GPU reads.
    Upload,
    /// Device-local. Not host-visible; populated through copies.
    Default,
    /// Host-visible, cached for reading results back from the GPU.
    Readback,
}

halcyon_bitflags! {
    /// What class of resources a memory block may back. Backends place
    /// render targets in dedicated heaps, so the usage class is fixed at
    /// allocation time.
    pub struct MemoryUsage: u32 {
        /// The block backs buffers.
        const BUFFERS = 1 << 0;
        /// The block backs render-target and depth-stencil textures.
        const RENDER_TARGETS = 1 << 1;
    }
}

/// A descriptor used to allocate a memory block.
#[derive(Debug, Clone)]
pub struct MemoryDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Size of the block in bytes.
    pub size: u64,
    /// Minimum alignment of the block's base address. Must be a power of
    /// two; backends round up to their native placement alignment.
    pub alignment: u64,
    /// Heap the block is allocated from.
    pub heap_type: MemoryHeapType,
    /// Resource class the block will back.
    pub usage: MemoryUsage,
}

crate::halcyon_handle! {
    /// An opaque handle to an allocated memory block.
    MemoryId
}

/// Size and alignment a resource needs from the memory allocator.
///
/// `alignment` is always a power of two and `size` is at least the
/// resource's logical size, rounded up to the backend's placement rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationInfo {
    /// Required allocation size in bytes.
    pub size: u64,
    /// Required placement alignment in bytes.
    pub alignment: u64,
}
