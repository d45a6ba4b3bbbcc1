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

//! Translation between RHI types and the backend's D3D12-flavored
//! vocabulary.
//!
//! Every ordinal-indexed table is sized by the RHI enum's `COUNT`, so
//! adding an enumerator without extending its table is a compile error.

use halcyon_core::halcyon_bitflags;
use halcyon_core::rhi::api::{
    BindingHeapKind, Format, MemoryHeapType, PrimitiveTopology, TextureLayout,
};

/// Placement alignment of buffers and textures inside a heap.
pub const PLACEMENT_ALIGNMENT: u64 = 64 * 1024;

/// Alignment of constant-buffer views.
pub const CONSTANT_BUFFER_ALIGNMENT: u64 = 256;

/// DXGI format codes, numbered as the native enumeration numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DxgiFormat {
    /// DXGI_FORMAT_R32G32B32A32_FLOAT
    R32g32b32a32Float = 2,
    /// DXGI_FORMAT_R16G16B16A16_FLOAT
    R16g16b16a16Float = 10,
    /// DXGI_FORMAT_R32G32_FLOAT
    R32g32Float = 16,
    /// DXGI_FORMAT_R8G8B8A8_UNORM
    R8g8b8a8Unorm = 28,
    /// DXGI_FORMAT_D32_FLOAT
    D32Float = 40,
    /// DXGI_FORMAT_R32_FLOAT
    R32Float = 41,
    /// DXGI_FORMAT_R32_UINT
    R32Uint = 42,
    /// DXGI_FORMAT_D24_UNORM_S8_UINT
    D24UnormS8Uint = 45,
    /// DXGI_FORMAT_B8G8R8A8_UNORM_SRGB
    B8g8r8a8UnormSrgb = 91,
}

const FORMAT_TABLE: [DxgiFormat; Format::COUNT] = [
    DxgiFormat::R8g8b8a8Unorm,
    DxgiFormat::B8g8r8a8UnormSrgb,
    DxgiFormat::R16g16b16a16Float,
    DxgiFormat::R32Float,
    DxgiFormat::R32g32Float,
    DxgiFormat::R32g32b32a32Float,
    DxgiFormat::R32Uint,
    DxgiFormat::D32Float,
    DxgiFormat::D24UnormS8Uint,
];

/// Maps an RHI format to its DXGI code.
pub fn map_format(format: Format) -> DxgiFormat {
    FORMAT_TABLE[format as usize]
}

halcyon_bitflags! {
    /// D3D12-style resource state bits. `COMMON` and `PRESENT` are both the
    /// zero state, exactly as the native API defines them.
    pub struct ResourceStates: u32 {
        /// D3D12_RESOURCE_STATE_VERTEX_AND_CONSTANT_BUFFER
        const VERTEX_AND_CONSTANT_BUFFER = 0x1;
        /// D3D12_RESOURCE_STATE_INDEX_BUFFER
        const INDEX_BUFFER = 0x2;
        /// D3D12_RESOURCE_STATE_RENDER_TARGET
        const RENDER_TARGET = 0x4;
        /// D3D12_RESOURCE_STATE_UNORDERED_ACCESS
        const UNORDERED_ACCESS = 0x8;
        /// D3D12_RESOURCE_STATE_DEPTH_WRITE
        const DEPTH_WRITE = 0x10;
        /// D3D12_RESOURCE_STATE_PIXEL_SHADER_RESOURCE
        const PIXEL_SHADER_RESOURCE = 0x80;
        /// D3D12_RESOURCE_STATE_COPY_DEST
        const COPY_DEST = 0x400;
        /// D3D12_RESOURCE_STATE_COPY_SOURCE
        const COPY_SOURCE = 0x800;
    }
}

impl ResourceStates {
    /// D3D12_RESOURCE_STATE_COMMON, the zero state.
    pub const COMMON: ResourceStates = ResourceStates::EMPTY;
    /// D3D12_RESOURCE_STATE_PRESENT, an alias of `COMMON`.
    pub const PRESENT: ResourceStates = ResourceStates::EMPTY;
}

const LAYOUT_TABLE: [ResourceStates; TextureLayout::COUNT] = [
    ResourceStates::COMMON,
    ResourceStates::UNORDERED_ACCESS,
    ResourceStates::RENDER_TARGET,
    ResourceStates::DEPTH_WRITE,
    ResourceStates::PIXEL_SHADER_RESOURCE,
    ResourceStates::COPY_SOURCE,
    ResourceStates::COPY_DEST,
    ResourceStates::PRESENT,
];

/// Maps an RHI texture layout to the resource states it stands for.
pub fn map_layout(layout: TextureLayout) -> ResourceStates {
    LAYOUT_TABLE[layout as usize]
}

/// D3D12_HEAP_TYPE values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum HeapType {
    /// D3D12_HEAP_TYPE_DEFAULT
    Default = 1,
    /// D3D12_HEAP_TYPE_UPLOAD
    Upload = 2,
    /// D3D12_HEAP_TYPE_READBACK
    Readback = 3,
}

/// Maps an RHI heap type to its native value.
pub fn map_heap_type(heap: MemoryHeapType) -> HeapType {
    match heap {
        MemoryHeapType::Upload => HeapType::Upload,
        MemoryHeapType::Default => HeapType::Default,
        MemoryHeapType::Readback => HeapType::Readback,
    }
}

/// Returns `true` for heap types the host may map.
pub fn is_host_visible(heap: MemoryHeapType) -> bool {
    matches!(heap, MemoryHeapType::Upload | MemoryHeapType::Readback)
}

/// D3D12_DESCRIPTOR_HEAP_TYPE values for the two shader-visible classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DescriptorHeapType {
    /// D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV
    CbvSrvUav = 0,
    /// D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER
    Sampler = 1,
}

/// Maps an RHI binding-heap kind to its native descriptor-heap type.
pub fn map_descriptor_heap_type(kind: BindingHeapKind) -> DescriptorHeapType {
    match kind {
        BindingHeapKind::ShaderResource => DescriptorHeapType::CbvSrvUav,
        BindingHeapKind::Sampler => DescriptorHeapType::Sampler,
    }
}

const TOPOLOGY_TABLE: [u32; PrimitiveTopology::COUNT] = [
    // D3D_PRIMITIVE_TOPOLOGY_* codes.
    1, // POINTLIST
    2, // LINELIST
    4, // TRIANGLELIST
    5, // TRIANGLESTRIP
];

/// Maps an RHI topology to its D3D primitive topology code.
pub fn map_topology(topology: PrimitiveTopology) -> u32 {
    TOPOLOGY_TABLE[topology as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_format_has_a_dxgi_code() {
        for format in Format::ALL {
            // Depth formats must stay depth-capable through the mapping.
            if format.is_depth() {
                assert!(matches!(
                    map_format(format),
                    DxgiFormat::D32Float | DxgiFormat::D24UnormS8Uint
                ));
            }
        }
        assert_eq!(map_format(Format::Bgra8UnormSrgb), DxgiFormat::B8g8r8a8UnormSrgb);
    }

    #[test]
    fn present_is_the_common_state() {
        assert_eq!(ResourceStates::PRESENT, ResourceStates::COMMON);
        assert_eq!(map_layout(TextureLayout::Present).bits(), 0);
    }

    #[test]
    fn layout_table_distinguishes_writable_states() {
        assert_eq!(
            map_layout(TextureLayout::RenderTarget),
            ResourceStates::RENDER_TARGET
        );
        assert_ne!(
            map_layout(TextureLayout::CopySrc),
            map_layout(TextureLayout::CopyDst)
        );
    }
}
