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

//! Shader modules, pipeline layouts, and pipeline state objects.
//!
//! Shader front-end compilation and reflection are external collaborators:
//! [`ShaderModuleDescriptor`] consumes opaque bytecode plus the reflected
//! binding and vertex-input metadata verbatim. A pipeline is an atomic
//! object — there is no partial update after creation.

use crate::halcyon_bitflags;
use crate::rhi::api::binding::{BindingSetLayoutId, BindingType};
use crate::rhi::api::resource::Format;
use std::borrow::Cow;

/// The programmable stage a shader module targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,
    /// The fragment (pixel) stage.
    Fragment,
    /// The compute stage.
    Compute,
}

halcyon_bitflags! {
    /// Which shader stages may access a binding.
    pub struct ShaderStageFlags: u32 {
        /// Vertex stage.
        const VERTEX = 1 << 0;
        /// Fragment stage.
        const FRAGMENT = 1 << 1;
        /// Compute stage.
        const COMPUTE = 1 << 2;
        /// Vertex and fragment stages.
        const GRAPHICS = Self::VERTEX.bits() | Self::FRAGMENT.bits();
        /// Every stage.
        const ALL = Self::VERTEX.bits() | Self::FRAGMENT.bits() | Self::COMPUTE.bits();
    }
}

/// One reflected resource binding, as produced by the shader compiler
/// collaborator.
#[derive(Debug, Clone)]
pub struct ShaderBindingInfo {
    /// Shader register (binding number within its set/space).
    pub register: u32,
    /// Binding set (register space).
    pub set: u32,
    /// Kind of binding.
    pub binding_type: BindingType,
    /// Array size; 1 for scalars.
    pub count: u32,
}

/// Component type and arity of a vertex input attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// One 32-bit float.
    Float32,
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
    /// Four 32-bit floats.
    Float32x4,
    /// One 32-bit unsigned integer.
    Uint32,
    /// Four 8-bit unsigned normalized components.
    Unorm8x4,
}

impl VertexFormat {
    /// Number of enumerators; translation tables are sized against this.
    pub const COUNT: usize = 6;

    /// All enumerators in ordinal order.
    pub const ALL: [VertexFormat; VertexFormat::COUNT] = [
        VertexFormat::Float32,
        VertexFormat::Float32x2,
        VertexFormat::Float32x3,
        VertexFormat::Float32x4,
        VertexFormat::Uint32,
        VertexFormat::Unorm8x4,
    ];

    /// Size of one attribute in bytes.
    pub const fn size(&self) -> u64 {
        match self {
            VertexFormat::Float32 | VertexFormat::Uint32 | VertexFormat::Unorm8x4 => 4,
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }
}

/// One reflected vertex input element, as produced by the shader compiler
/// collaborator for vertex stages.
#[derive(Debug, Clone)]
pub struct VertexInputInfo<'a> {
    /// Semantic name (e.g. `POSITION`).
    pub semantic: Cow<'a, str>,
    /// Shader input location.
    pub location: u32,
    /// Component type and arity.
    pub format: VertexFormat,
}

/// A descriptor used to create a shader module from compiled bytecode.
#[derive(Debug, Clone)]
pub struct ShaderModuleDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Target stage.
    pub stage: ShaderStage,
    /// Entry point name inside the bytecode.
    pub entry_point: Cow<'a, str>,
    /// Opaque compiled bytecode; the RHI never inspects it.
    pub bytecode: Cow<'a, [u8]>,
    /// Reflected resource bindings, consumed verbatim.
    pub bindings: Cow<'a, [ShaderBindingInfo]>,
    /// Reflected vertex inputs. Vertex stages only.
    pub vertex_inputs: Cow<'a, [VertexInputInfo<'a>]>,
}

crate::halcyon_handle! {
    /// An opaque handle to a shader module.
    ShaderModuleId
}

/// A push-constant range a pipeline layout exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushConstantRange {
    /// Stages that may read the range.
    pub stages: ShaderStageFlags,
    /// Byte offset within the push-constant block.
    pub offset: u32,
    /// Byte size of the range.
    pub size: u32,
}

/// A descriptor for the full set of binding-set layouts and push-constant
/// ranges a pipeline expects. Immutable after creation.
#[derive(Debug, Clone)]
pub struct PipelineLayoutDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Binding-set layouts, ordered by set index.
    pub set_layouts: Cow<'a, [BindingSetLayoutId]>,
    /// Push-constant ranges.
    pub push_constants: Cow<'a, [PushConstantRange]>,
}

crate::halcyon_handle! {
    /// An opaque handle to a pipeline layout.
    PipelineLayoutId
}

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Isolated points.
    PointList,
    /// Isolated line segments.
    LineList,
    /// Isolated triangles.
    #[default]
    TriangleList,
    /// A connected triangle strip.
    TriangleStrip,
}

impl PrimitiveTopology {
    /// Number of enumerators; translation tables are sized against this.
    pub const COUNT: usize = 4;

    /// All enumerators in ordinal order.
    pub const ALL: [PrimitiveTopology; PrimitiveTopology::COUNT] = [
        PrimitiveTopology::PointList,
        PrimitiveTopology::LineList,
        PrimitiveTopology::TriangleList,
        PrimitiveTopology::TriangleStrip,
    ];
}

/// Which faces the rasterizer culls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// No culling.
    #[default]
    None,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    Back,
}

/// Winding order of front faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    /// Counter-clockwise.
    #[default]
    Ccw,
    /// Clockwise.
    Cw,
}

/// Depth/stencil comparison function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    /// Never passes.
    Never,
    /// Passes when incoming < stored.
    #[default]
    Less,
    /// Passes when equal.
    Equal,
    /// Passes when incoming <= stored.
    LessEqual,
    /// Passes when incoming > stored.
    Greater,
    /// Passes when different.
    NotEqual,
    /// Passes when incoming >= stored.
    GreaterEqual,
    /// Always passes.
    Always,
}

impl CompareFunction {
    /// Number of enumerators; translation tables are sized against this.
    pub const COUNT: usize = 8;

    /// All enumerators in ordinal order.
    pub const ALL: [CompareFunction; CompareFunction::COUNT] = [
        CompareFunction::Never,
        CompareFunction::Less,
        CompareFunction::Equal,
        CompareFunction::LessEqual,
        CompareFunction::Greater,
        CompareFunction::NotEqual,
        CompareFunction::GreaterEqual,
        CompareFunction::Always,
    ];
}

/// Fixed-function rasterizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RasterState {
    /// Face culling mode.
    pub cull_mode: CullMode,
    /// Front-face winding.
    pub front_face: FrontFace,
    /// Rasterize lines instead of filled polygons.
    pub wireframe: bool,
}

/// Fixed-function depth state. Absent means no depth target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthState {
    /// Format of the depth-stencil target.
    pub format: Format,
    /// Enables depth writes.
    pub write: bool,
    /// Depth test function.
    pub compare: CompareFunction,
}

/// Source/destination blend factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendFactor {
    /// Factor of zero.
    Zero,
    /// Factor of one.
    #[default]
    One,
    /// Source alpha.
    SrcAlpha,
    /// One minus source alpha.
    OneMinusSrcAlpha,
}

/// How blended source and destination combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOperation {
    /// src*sf + dst*df
    #[default]
    Add,
    /// src*sf - dst*df
    Subtract,
    /// min(src, dst)
    Min,
    /// max(src, dst)
    Max,
}

/// Fixed-function blend state applied to every color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlendState {
    /// Enables blending; when `false` the source overwrites.
    pub enabled: bool,
    /// Source factor.
    pub src_factor: BlendFactor,
    /// Destination factor.
    pub dst_factor: BlendFactor,
    /// Combine operation.
    pub operation: BlendOperation,
}

/// Per-vertex or per-instance advance of a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexStepMode {
    /// Advance per vertex.
    #[default]
    Vertex,
    /// Advance per instance.
    Instance,
}

/// One attribute within a vertex buffer layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Byte offset within one element.
    pub offset: u64,
    /// Component type and arity.
    pub format: VertexFormat,
}

/// The layout of one bound vertex buffer slot.
#[derive(Debug, Clone)]
pub struct VertexBufferLayout<'a> {
    /// Byte stride between consecutive elements.
    pub stride: u64,
    /// Per-vertex or per-instance advance.
    pub step_mode: VertexStepMode,
    /// Attributes sourced from this buffer.
    pub attributes: Cow<'a, [VertexAttribute]>,
}

/// A descriptor used to create a graphics pipeline: shader stages plus all
/// fixed-function state, compiled into one atomic object.
#[derive(Debug, Clone)]
pub struct RenderPipelineDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The binding shape the pipeline expects.
    pub layout: PipelineLayoutId,
    /// Vertex stage module.
    pub vertex_shader: ShaderModuleId,
    /// Fragment stage module; absent for depth-only pipelines.
    pub fragment_shader: Option<ShaderModuleId>,
    /// Vertex buffer slots.
    pub vertex_buffers: Cow<'a, [VertexBufferLayout<'a>]>,
    /// Primitive assembly.
    pub topology: PrimitiveTopology,
    /// Rasterizer state.
    pub raster: RasterState,
    /// Depth state; `None` disables the depth target.
    pub depth: Option<DepthState>,
    /// Blend state for all color targets.
    pub blend: BlendState,
    /// Formats of the color targets the pipeline renders into.
    pub color_formats: Cow<'a, [Format]>,
}

crate::halcyon_handle! {
    /// An opaque handle to a compiled graphics pipeline.
    RenderPipelineId
}

/// A descriptor used to create a compute pipeline.
#[derive(Debug, Clone)]
pub struct ComputePipelineDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The binding shape the pipeline expects.
    pub layout: PipelineLayoutId,
    /// Compute stage module.
    pub shader: ShaderModuleId,
}

crate::halcyon_handle! {
    /// An opaque handle to a compiled compute pipeline.
    ComputePipelineId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_format_sizes() {
        assert_eq!(VertexFormat::Float32x3.size(), 12);
        assert_eq!(VertexFormat::Unorm8x4.size(), 4);
    }

    #[test]
    fn vertex_format_ordinals_match_all_array() {
        for (ordinal, format) in VertexFormat::ALL.iter().enumerate() {
            assert_eq!(*format as usize, ordinal);
        }
    }

    #[test]
    fn graphics_stage_flags_cover_vertex_and_fragment() {
        assert!(ShaderStageFlags::GRAPHICS.contains(ShaderStageFlags::VERTEX));
        assert!(ShaderStageFlags::GRAPHICS.contains(ShaderStageFlags::FRAGMENT));
        assert!(!ShaderStageFlags::GRAPHICS.contains(ShaderStageFlags::COMPUTE));
    }

    #[test]
    fn default_handles_are_null() {
        assert!(RenderPipelineId::default().is_null());
        assert!(PipelineLayoutId::NULL.is_null());
    }
}
