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

//! Graphics backend implementations.
//!
//! Both backends drive host memory instead of a native driver, but each is
//! a faithful model of its API's execution rules. The `dx12` backend
//! speaks resource states, descriptor heaps, and monotonic fences; the
//! `vulkan` backend speaks image layouts, descriptor pools, binary
//! semaphores, and timeline values. Rendering code only sees the
//! `halcyon-core` contract, so everything that passes against one backend
//! must pass against the other.

pub mod dx12;
pub mod vulkan;

#[cfg(test)]
mod conformance;

use halcyon_core::rhi::api::BackendKind;
use halcyon_core::rhi::traits::GpuFactory;

/// Creates the factory for the requested backend.
pub fn create_factory(backend: BackendKind) -> Box<dyn GpuFactory> {
    match backend {
        BackendKind::Dx12 => Box::new(dx12::Dx12Factory::new()),
        BackendKind::Vulkan => Box::new(vulkan::VulkanFactory::new()),
    }
}
