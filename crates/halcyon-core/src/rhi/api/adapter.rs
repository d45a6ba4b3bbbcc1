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

//! Adapter enumeration and device configuration.

/// The execution model a backend implements. This is a closed set: every
/// enumerator in the RHI has a translation-table entry in each backend, so
/// adding a kind means adding a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// The explicit descriptor-heap backend: root signatures, monotonic
    /// fences as the only native sync primitive, resource-state barriers.
    Dx12,
    /// The immediate-mode backend: descriptor sets, true binary semaphores
    /// plus timeline fences, stage/access/layout barriers.
    Vulkan,
}

/// The physical kind of an enumerated adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceType {
    /// A GPU integrated with the CPU.
    IntegratedGpu,
    /// A discrete, dedicated GPU.
    DiscreteGpu,
    /// A virtualized or software-modelled GPU.
    VirtualGpu,
    /// A software renderer running on the CPU.
    Cpu,
    /// Unknown or unsupported.
    #[default]
    Unknown,
}

/// Backend-agnostic information about one enumerated adapter.
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    /// Adapter name as reported by the backend.
    pub name: String,
    /// The backend that enumerated this adapter.
    pub backend: BackendKind,
    /// Physical device kind.
    pub device_type: DeviceType,
}

/// Device-wide configuration, fixed at creation.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Enables the debug-layer style validation the backends perform on the
    /// host-mirrored command state. Release builds compile the checks out
    /// regardless.
    pub enable_validation: bool,
    /// How many frames the host may record ahead of the GPU. Sizes the
    /// canonical N-buffering pattern (one fence per in-flight slot).
    pub frames_in_flight: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            enable_validation: true,
            frames_in_flight: 2,
        }
    }
}
