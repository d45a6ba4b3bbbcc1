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

//! The D3D12-style backend.
//!
//! Its execution model: descriptor heaps are flat shader-visible tables
//! indexed through root-signature offsets, resource states are the barrier
//! vocabulary, and the monotonic fence is the only native synchronization
//! primitive. Binary semaphores ride on fences pinned to zero or one.

mod command;
mod conversions;
mod device;
mod sync;

pub use self::command::Dx12CommandList;
pub use self::device::{Dx12Device, Dx12Factory};
