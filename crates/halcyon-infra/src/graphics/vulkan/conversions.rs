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

//! Translation between RHI types and the backend's Vulkan-flavored
//! vocabulary. Formats and layouts go through ordinal-indexed tables sized
//! by the RHI enum's `COUNT`; stage and access masks are remapped bit by
//! bit.

use halcyon_core::halcyon_bitflags;
use halcyon_core::rhi::api::{
    AccessFlags, BindingType, Format, IndexFormat, MemoryHeapType, StageFlags, TextureLayout,
};

/// Minimum alignment of buffer bindings inside a memory block.
pub const BUFFER_ALIGNMENT: u64 = 256;

/// Minimum alignment of image bindings inside a memory block.
pub const IMAGE_ALIGNMENT: u64 = 4096;

/// VkFormat codes, numbered as the native enumeration numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum VkFormat {
    /// VK_FORMAT_R8G8B8A8_UNORM
    R8g8b8a8Unorm = 37,
    /// VK_FORMAT_B8G8R8A8_SRGB
    B8g8r8a8Srgb = 50,
    /// VK_FORMAT_R16G16B16A16_SFLOAT
    R16g16b16a16Sfloat = 97,
    /// VK_FORMAT_R32_UINT
    R32Uint = 98,
    /// VK_FORMAT_R32_SFLOAT
    R32Sfloat = 100,
    /// VK_FORMAT_R32G32_SFLOAT
    R32g32Sfloat = 103,
    /// VK_FORMAT_R32G32B32A32_SFLOAT
    R32g32b32a32Sfloat = 109,
    /// VK_FORMAT_D32_SFLOAT
    D32Sfloat = 126,
    /// VK_FORMAT_D24_UNORM_S8_UINT
    D24UnormS8Uint = 129,
}

const FORMAT_TABLE: [VkFormat; Format::COUNT] = [
    VkFormat::R8g8b8a8Unorm,
    VkFormat::B8g8r8a8Srgb,
    VkFormat::R16g16b16a16Sfloat,
    VkFormat::R32Sfloat,
    VkFormat::R32g32Sfloat,
    VkFormat::R32g32b32a32Sfloat,
    VkFormat::R32Uint,
    VkFormat::D32Sfloat,
    VkFormat::D24UnormS8Uint,
];

/// Maps an RHI format to its VkFormat code.
pub fn map_format(format: Format) -> VkFormat {
    FORMAT_TABLE[format as usize]
}

/// VkImageLayout values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum VkImageLayout {
    /// VK_IMAGE_LAYOUT_UNDEFINED
    Undefined = 0,
    /// VK_IMAGE_LAYOUT_GENERAL
    General = 1,
    /// VK_IMAGE_LAYOUT_COLOR_ATTACHMENT_OPTIMAL
    ColorAttachmentOptimal = 2,
    /// VK_IMAGE_LAYOUT_DEPTH_STENCIL_ATTACHMENT_OPTIMAL
    DepthStencilAttachmentOptimal = 3,
    /// VK_IMAGE_LAYOUT_SHADER_READ_ONLY_OPTIMAL
    ShaderReadOnlyOptimal = 5,
    /// VK_IMAGE_LAYOUT_TRANSFER_SRC_OPTIMAL
    TransferSrcOptimal = 6,
    /// VK_IMAGE_LAYOUT_TRANSFER_DST_OPTIMAL
    TransferDstOptimal = 7,
    /// VK_IMAGE_LAYOUT_PRESENT_SRC_KHR
    PresentSrcKhr = 1_000_001_002,
}

const LAYOUT_TABLE: [VkImageLayout; TextureLayout::COUNT] = [
    VkImageLayout::Undefined,
    VkImageLayout::General,
    VkImageLayout::ColorAttachmentOptimal,
    VkImageLayout::DepthStencilAttachmentOptimal,
    VkImageLayout::ShaderReadOnlyOptimal,
    VkImageLayout::TransferSrcOptimal,
    VkImageLayout::TransferDstOptimal,
    VkImageLayout::PresentSrcKhr,
];

/// Maps an RHI texture layout to its VkImageLayout.
pub fn map_layout(layout: TextureLayout) -> VkImageLayout {
    LAYOUT_TABLE[layout as usize]
}

halcyon_bitflags! {
    /// VkMemoryPropertyFlags bits.
    pub struct MemoryPropertyFlags: u32 {
        /// VK_MEMORY_PROPERTY_DEVICE_LOCAL_BIT
        const DEVICE_LOCAL = 0x1;
        /// VK_MEMORY_PROPERTY_HOST_VISIBLE_BIT
        const HOST_VISIBLE = 0x2;
        /// VK_MEMORY_PROPERTY_HOST_COHERENT_BIT
        const HOST_COHERENT = 0x4;
        /// VK_MEMORY_PROPERTY_HOST_CACHED_BIT
        const HOST_CACHED = 0x8;
    }
}

/// Maps an RHI heap type to the memory properties it selects.
pub fn map_memory_properties(heap: MemoryHeapType) -> MemoryPropertyFlags {
    match heap {
        MemoryHeapType::Upload => {
            MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT
        }
        MemoryHeapType::Default => MemoryPropertyFlags::DEVICE_LOCAL,
        MemoryHeapType::Readback => {
            MemoryPropertyFlags::HOST_VISIBLE
                | MemoryPropertyFlags::HOST_COHERENT
                | MemoryPropertyFlags::HOST_CACHED
        }
    }
}

/// VkDescriptorType values for the binding types the RHI exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum VkDescriptorType {
    /// VK_DESCRIPTOR_TYPE_SAMPLER
    Sampler = 0,
    /// VK_DESCRIPTOR_TYPE_SAMPLED_IMAGE
    SampledImage = 2,
    /// VK_DESCRIPTOR_TYPE_UNIFORM_BUFFER
    UniformBuffer = 6,
    /// VK_DESCRIPTOR_TYPE_STORAGE_BUFFER
    StorageBuffer = 7,
}

const DESCRIPTOR_TABLE: [VkDescriptorType; BindingType::COUNT] = [
    VkDescriptorType::UniformBuffer,
    VkDescriptorType::SampledImage,
    VkDescriptorType::StorageBuffer,
    VkDescriptorType::Sampler,
];

/// Maps an RHI binding type to its descriptor type.
pub fn map_descriptor_type(binding_type: BindingType) -> VkDescriptorType {
    DESCRIPTOR_TABLE[binding_type as usize]
}

/// VkIndexType codes.
pub fn map_index_type(format: IndexFormat) -> u32 {
    match format {
        IndexFormat::Uint16 => 0,
        IndexFormat::Uint32 => 1,
    }
}

/// Maps RHI pipeline stages onto VkPipelineStageFlags bits.
pub fn map_stage_mask(stages: StageFlags) -> u32 {
    const PAIRS: [(StageFlags, u32); 8] = [
        (StageFlags::TOP_OF_PIPE, 0x1),
        (StageFlags::VERTEX_INPUT, 0x4),
        (StageFlags::VERTEX_SHADER, 0x8),
        (StageFlags::FRAGMENT_SHADER, 0x80),
        (StageFlags::RENDER_TARGET, 0x400),
        (StageFlags::COMPUTE, 0x800),
        (StageFlags::COPY, 0x1000),
        (StageFlags::BOTTOM_OF_PIPE, 0x2000),
    ];
    PAIRS
        .iter()
        .filter(|(flag, _)| stages.contains(*flag))
        .fold(0, |mask, (_, bit)| mask | bit)
}

/// Maps RHI access kinds onto VkAccessFlags bits.
pub fn map_access_mask(access: AccessFlags) -> u32 {
    const PAIRS: [(AccessFlags, u32); 10] = [
        (AccessFlags::INDIRECT_ARG, 0x1),
        (AccessFlags::INDEX_BUFFER, 0x2),
        (AccessFlags::VERTEX_BUFFER, 0x4),
        (AccessFlags::CONSTANT_BUFFER, 0x8),
        (AccessFlags::SHADER_READ, 0x20),
        (AccessFlags::SHADER_WRITE, 0x40),
        (AccessFlags::RENDER_TARGET_WRITE, 0x100),
        (AccessFlags::DEPTH_WRITE, 0x400),
        (AccessFlags::COPY_SRC, 0x800),
        (AccessFlags::COPY_DST, 0x1000),
    ];
    PAIRS
        .iter()
        .filter(|(flag, _)| access.contains(*flag))
        .fold(0, |mask, (_, bit)| mask | bit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_layout_has_a_native_value() {
        for layout in TextureLayout::ALL {
            let native = map_layout(layout);
            if layout == TextureLayout::Present {
                assert_eq!(native, VkImageLayout::PresentSrcKhr);
            }
            if layout == TextureLayout::Undefined {
                assert_eq!(native as u32, 0);
            }
        }
    }

    #[test]
    fn swapchain_format_maps_to_bgra_srgb() {
        assert_eq!(map_format(Format::Bgra8UnormSrgb), VkFormat::B8g8r8a8Srgb);
    }

    #[test]
    fn upload_memory_is_host_visible_and_coherent() {
        let props = map_memory_properties(MemoryHeapType::Upload);
        assert!(props.contains(MemoryPropertyFlags::HOST_VISIBLE));
        assert!(props.contains(MemoryPropertyFlags::HOST_COHERENT));
        assert!(!props.contains(MemoryPropertyFlags::DEVICE_LOCAL));
    }

    #[test]
    fn stage_masks_remap_bit_by_bit() {
        let mask = map_stage_mask(StageFlags::RENDER_TARGET | StageFlags::COPY);
        assert_eq!(mask, 0x400 | 0x1000);
        assert_eq!(map_stage_mask(StageFlags::EMPTY), 0);
    }

    #[test]
    fn access_masks_remap_bit_by_bit() {
        let mask = map_access_mask(AccessFlags::COPY_DST | AccessFlags::SHADER_READ);
        assert_eq!(mask, 0x1000 | 0x20);
    }
}
