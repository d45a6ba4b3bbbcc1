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

//! Backend-agnostic descriptor structs, handles, enums, and flag sets.
//!
//! Organized by the object they describe:
//!
//! - **[`adapter`]**: adapter enumeration and device configuration.
//! - **[`dimension`]**: extents, origins, and subresource ranges.
//! - **[`surface`]**: the window/surface collaborator interface.
//! - **[`memory`]**: explicit GPU memory allocation.
//! - **[`resource`]**: buffers, textures, and typed views over them.
//! - **[`binding`]**: binding-set layouts and binding heaps.
//! - **[`pipeline`]**: shader modules, pipeline layouts, pipeline state.
//! - **[`command`]**: command pools/buffers, barriers, copies, rendering.
//! - **[`queue`]**: submission descriptors.
//! - **[`sync`]**: fences and binary semaphores.
//! - **[`swapchain`]**: the presentable back-buffer ring.

pub mod adapter;
pub mod binding;
pub mod command;
pub mod dimension;
pub mod memory;
pub mod pipeline;
pub mod queue;
pub mod resource;
pub mod surface;
pub mod swapchain;
pub mod sync;

pub use self::adapter::*;
pub use self::binding::*;
pub use self::command::*;
pub use self::dimension::*;
pub use self::memory::*;
pub use self::pipeline::*;
pub use self::queue::*;
pub use self::resource::*;
pub use self::surface::*;
pub use self::swapchain::*;
pub use self::sync::*;
