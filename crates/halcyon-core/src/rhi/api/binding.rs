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

//! Binding-set layouts and binding heaps.
//!
//! A [`BindingSetLayoutDescriptor`] declares the *shape* of one set of
//! shader-visible bindings; a binding heap is the *storage* those bindings
//! are written into. Offsets into a heap are queried through
//! `GpuDevice::get_binding_offset` and are stable for the heap's lifetime,
//! so one heap can serve many sets. Heap contents are shared mutable state:
//! writing a slot a pending command buffer will read is a race the RHI does
//! not protect against.

use crate::rhi::api::pipeline::ShaderStageFlags;
use std::borrow::Cow;

/// The kind of one shader-visible binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    /// Constant (uniform) buffer.
    ConstantBuffer,
    /// Read-only shader resource (texture or structured buffer).
    ShaderResource,
    /// Read/write unordered-access resource.
    UnorderedAccess,
    /// Texture sampler.
    Sampler,
}

impl BindingType {
    /// Number of enumerators; translation tables are sized against this.
    pub const COUNT: usize = 4;

    /// All enumerators in ordinal order.
    pub const ALL: [BindingType; BindingType::COUNT] = [
        BindingType::ConstantBuffer,
        BindingType::ShaderResource,
        BindingType::UnorderedAccess,
        BindingType::Sampler,
    ];
}

/// A contiguous run of bindings of one type within a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingRange {
    /// Kind of every binding in the range.
    pub binding_type: BindingType,
    /// First shader register the range occupies.
    pub base_register: u32,
    /// Number of consecutive registers (heap slots) in the range.
    pub count: u32,
}

/// A descriptor declaring the shape of one binding set.
#[derive(Debug, Clone)]
pub struct BindingSetLayoutDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Binding ranges, in binding-index order.
    pub ranges: Cow<'a, [BindingRange]>,
    /// Stages that may read the set.
    pub visibility: ShaderStageFlags,
}

impl<'a> BindingSetLayoutDescriptor<'a> {
    /// Total heap slots one instance of this layout occupies.
    pub fn slot_count(&self) -> u64 {
        self.ranges.iter().map(|range| u64::from(range.count)).sum()
    }
}

crate::halcyon_handle! {
    /// An opaque handle to a binding-set layout.
    BindingSetLayoutId
}

/// Which native heap class a binding heap stores into. Samplers live in
/// their own heap on the descriptor-heap backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindingHeapKind {
    /// Constant-buffer, shader-resource, and unordered-access bindings.
    #[default]
    ShaderResource,
    /// Sampler bindings.
    Sampler,
}

impl BindingHeapKind {
    /// Number of enumerators; translation tables are sized against this.
    pub const COUNT: usize = 2;
}

/// A descriptor used to create a binding heap.
#[derive(Debug, Clone)]
pub struct BindingHeapDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Heap class.
    pub kind: BindingHeapKind,
    /// Capacity in binding slots.
    pub capacity: u32,
}

crate::halcyon_handle! {
    /// An opaque handle to a binding heap.
    BindingHeapId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_count_sums_ranges() {
        let desc = BindingSetLayoutDescriptor {
            label: None,
            ranges: Cow::Borrowed(&[
                BindingRange {
                    binding_type: BindingType::ConstantBuffer,
                    base_register: 0,
                    count: 1,
                },
                BindingRange {
                    binding_type: BindingType::ShaderResource,
                    base_register: 0,
                    count: 4,
                },
            ]),
            visibility: ShaderStageFlags::GRAPHICS,
        };
        assert_eq!(desc.slot_count(), 5);
    }

    #[test]
    fn binding_type_ordinals_match_all_array() {
        for (ordinal, binding_type) in BindingType::ALL.iter().enumerate() {
            assert_eq!(*binding_type as usize, ordinal);
        }
    }
}
