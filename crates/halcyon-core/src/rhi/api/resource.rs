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

//! Buffers, textures, and typed views over them.
//!
//! A resource is created unbound and must be bound to a memory block before
//! first use; views are created over bound resources. Enumerations that
//! backends translate through ordinal-indexed tables carry a `COUNT`
//! constant and an `ALL` array so each table's length is checked at compile
//! time and its entries are checkable in tests.

use crate::halcyon_bitflags;
use crate::rhi::api::dimension::Extent3D;
use std::borrow::Cow;

/// Whether a resource is a linear buffer or a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A linear byte buffer.
    Buffer,
    /// A formatted texture.
    Texture,
}

/// The memory format of texels in a texture (or of typed buffer views).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Four 8-bit unsigned normalized components.
    Rgba8Unorm,
    /// Four 8-bit unsigned normalized components, BGRA order, sRGB. The
    /// common swapchain format.
    Bgra8UnormSrgb,
    /// Four 16-bit float components.
    Rgba16Float,
    /// One 32-bit float component.
    R32Float,
    /// Two 32-bit float components.
    Rg32Float,
    /// Four 32-bit float components.
    Rgba32Float,
    /// One 32-bit unsigned integer component.
    R32Uint,
    /// A 32-bit float depth format.
    Depth32Float,
    /// 24-bit depth with an 8-bit stencil component.
    Depth24UnormStencil8,
}

impl Format {
    /// Number of enumerators; translation tables are sized against this.
    pub const COUNT: usize = 9;

    /// All enumerators in ordinal order.
    pub const ALL: [Format; Format::COUNT] = [
        Format::Rgba8Unorm,
        Format::Bgra8UnormSrgb,
        Format::Rgba16Float,
        Format::R32Float,
        Format::Rg32Float,
        Format::Rgba32Float,
        Format::R32Uint,
        Format::Depth32Float,
        Format::Depth24UnormStencil8,
    ];

    /// Size in bytes of one texel in this format.
    pub const fn bytes_per_texel(&self) -> u32 {
        match self {
            Format::Rgba8Unorm | Format::Bgra8UnormSrgb => 4,
            Format::Rgba16Float => 8,
            Format::R32Float | Format::R32Uint => 4,
            Format::Rg32Float => 8,
            Format::Rgba32Float => 16,
            Format::Depth32Float => 4,
            Format::Depth24UnormStencil8 => 4,
        }
    }

    /// Returns `true` for depth and depth-stencil formats.
    pub const fn is_depth(&self) -> bool {
        matches!(self, Format::Depth32Float | Format::Depth24UnormStencil8)
    }
}

/// The layout a texture subresource is in. Transitions between layouts are
/// explicit: the caller records them through barriers, and the RHI never
/// inserts one on its behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureLayout {
    /// Initial layout of a freshly created texture; contents undefined.
    #[default]
    Undefined,
    /// Any access, unoptimized.
    General,
    /// Writable as a color render target.
    RenderTarget,
    /// Writable as a depth-stencil target.
    DepthWrite,
    /// Readable from shaders.
    ShaderResource,
    /// Source of a copy operation.
    CopySrc,
    /// Destination of a copy operation.
    CopyDst,
    /// Handed to the presentation engine.
    Present,
}

impl TextureLayout {
    /// Number of enumerators; translation tables are sized against this.
    pub const COUNT: usize = 8;

    /// All enumerators in ordinal order.
    pub const ALL: [TextureLayout; TextureLayout::COUNT] = [
        TextureLayout::Undefined,
        TextureLayout::General,
        TextureLayout::RenderTarget,
        TextureLayout::DepthWrite,
        TextureLayout::ShaderResource,
        TextureLayout::CopySrc,
        TextureLayout::CopyDst,
        TextureLayout::Present,
    ];
}

halcyon_bitflags! {
    /// Allowed usages of a resource, fixed at creation. Backends use these
    /// to pick native flags and to validate bindings in debug builds.
    pub struct ResourceUsage: u32 {
        /// Bindable as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Bindable as an index buffer.
        const INDEX = 1 << 1;
        /// Bindable as a constant (uniform) buffer.
        const CONSTANT = 1 << 2;
        /// Readable from shaders through a shader-resource view.
        const SHADER_RESOURCE = 1 << 3;
        /// Read/write from shaders through an unordered-access view.
        const STORAGE = 1 << 4;
        /// Writable as a color render target.
        const RENDER_TARGET = 1 << 5;
        /// Writable as a depth-stencil target.
        const DEPTH_STENCIL = 1 << 6;
        /// Source of copy operations.
        const COPY_SRC = 1 << 7;
        /// Destination of copy operations.
        const COPY_DST = 1 << 8;
        /// Source of indirect draw/dispatch arguments.
        const INDIRECT = 1 << 9;
    }
}

/// Cross-queue sharing mode of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SharingMode {
    /// Owned by one queue at a time; ownership moves through barriers.
    #[default]
    Exclusive,
    /// Usable from several queues without ownership transfer.
    Concurrent,
}

/// A descriptor used to create a buffer or texture.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Buffer or texture.
    pub kind: ResourceKind,
    /// Logical size in bytes. Buffers only; zero for textures.
    pub size: u64,
    /// Texel format. Textures only.
    pub format: Option<Format>,
    /// Texture extent. Textures only.
    pub extent: Extent3D,
    /// Mip level count. Textures only.
    pub mip_levels: u32,
    /// Allowed usages.
    pub usage: ResourceUsage,
    /// Cross-queue sharing mode.
    pub sharing: SharingMode,
}

impl<'a> ResourceDescriptor<'a> {
    /// Shorthand for a plain buffer descriptor.
    pub fn buffer(size: u64, usage: ResourceUsage) -> Self {
        Self {
            label: None,
            kind: ResourceKind::Buffer,
            size,
            format: None,
            extent: Extent3D::default(),
            mip_levels: 1,
            usage,
            sharing: SharingMode::Exclusive,
        }
    }

    /// Shorthand for a single-mip 2D texture descriptor.
    pub fn texture_2d(format: Format, extent: Extent3D, usage: ResourceUsage) -> Self {
        Self {
            label: None,
            kind: ResourceKind::Texture,
            size: 0,
            format: Some(format),
            extent,
            mip_levels: 1,
            usage,
            sharing: SharingMode::Exclusive,
        }
    }

    /// Attaches a debug label.
    #[must_use]
    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(Cow::Borrowed(label));
        self
    }
}

crate::halcyon_handle! {
    /// An opaque handle to a buffer or texture.
    ResourceId
}

/// The access a view grants over its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Color render-target view.
    RenderTarget,
    /// Depth-stencil view.
    DepthStencil,
    /// Constant-buffer view.
    ConstantBuffer,
    /// Read-only shader-resource view.
    ShaderResource,
    /// Read/write unordered-access view.
    UnorderedAccess,
}

impl ViewKind {
    /// Number of enumerators; translation tables are sized against this.
    pub const COUNT: usize = 5;

    /// All enumerators in ordinal order.
    pub const ALL: [ViewKind; ViewKind::COUNT] = [
        ViewKind::RenderTarget,
        ViewKind::DepthStencil,
        ViewKind::ConstantBuffer,
        ViewKind::ShaderResource,
        ViewKind::UnorderedAccess,
    ];
}

/// The subresource window a view or barrier covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubresourceRange {
    /// First mip level.
    pub base_mip: u32,
    /// Number of mip levels.
    pub mip_count: u32,
    /// First array layer.
    pub base_layer: u32,
    /// Number of array layers.
    pub layer_count: u32,
}

impl Default for SubresourceRange {
    fn default() -> Self {
        Self {
            base_mip: 0,
            mip_count: 1,
            base_layer: 0,
            layer_count: 1,
        }
    }
}

/// A descriptor used to create a typed view over a bound resource.
#[derive(Debug, Clone)]
pub struct ResourceViewDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The resource the view windows into. Must be bound to memory.
    pub resource: ResourceId,
    /// Access the view grants.
    pub kind: ViewKind,
    /// View format; `None` inherits the resource format.
    pub format: Option<Format>,
    /// Subresource window. Textures only.
    pub range: SubresourceRange,
    /// Byte offset of the viewed window. Buffers only.
    pub offset: u64,
    /// Byte size of the viewed window. Buffers only; zero means whole.
    pub size: u64,
}

impl<'a> ResourceViewDescriptor<'a> {
    /// A whole-resource view of the given kind.
    pub fn whole(resource: ResourceId, kind: ViewKind) -> Self {
        Self {
            label: None,
            resource,
            kind,
            format: None,
            range: SubresourceRange::default(),
            offset: 0,
            size: 0,
        }
    }
}

crate::halcyon_handle! {
    /// An opaque handle to a typed resource view.
    ResourceViewId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_ordinals_match_all_array() {
        for (ordinal, format) in Format::ALL.iter().enumerate() {
            assert_eq!(*format as usize, ordinal);
        }
    }

    #[test]
    fn layout_ordinals_match_all_array() {
        for (ordinal, layout) in TextureLayout::ALL.iter().enumerate() {
            assert_eq!(*layout as usize, ordinal);
        }
    }

    #[test]
    fn depth_formats_are_flagged() {
        assert!(Format::Depth32Float.is_depth());
        assert!(Format::Depth24UnormStencil8.is_depth());
        assert!(!Format::Bgra8UnormSrgb.is_depth());
    }

    #[test]
    fn texel_sizes() {
        assert_eq!(Format::Rgba8Unorm.bytes_per_texel(), 4);
        assert_eq!(Format::Rgba32Float.bytes_per_texel(), 16);
    }

    #[test]
    fn buffer_shorthand_is_a_buffer() {
        let desc = ResourceDescriptor::buffer(96, ResourceUsage::VERTEX);
        assert_eq!(desc.kind, ResourceKind::Buffer);
        assert_eq!(desc.size, 96);
        assert!(desc.format.is_none());
    }
}
