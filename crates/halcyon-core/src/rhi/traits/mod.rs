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

//! The core architectural traits of the RHI.
//!
//! These contracts decouple rendering code from any specific graphics
//! backend.
//!
//! - [`GpuFactory`]: Enumerates adapters and opens devices for one backend.
//! - [`GpuDevice`]: Creates and manages every GPU object, and submits work.
//! - [`CommandList`]: Records GPU commands into one command buffer.

mod command_list;
mod device;
mod factory;

pub use self::command_list::CommandList;
pub use self::device::GpuDevice;
pub use self::factory::GpuFactory;
