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

//! The Vulkan-style backend.
//!
//! Its execution model: bindings are descriptor sets suballocated from
//! pools, barriers carry full stage and access masks plus image layout
//! transitions, and synchronization splits into binary semaphores for
//! queue ordering and timeline semaphores for host-visible progress.

mod command;
mod conversions;
mod device;
mod sync;

pub use self::command::VulkanCommandList;
pub use self::device::{VulkanDevice, VulkanFactory};
