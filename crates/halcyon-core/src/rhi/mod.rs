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

//! The public, backend-agnostic Render Hardware Interface.
//!
//! This module is the common language for all GPU work: the abstract traits
//! ([`GpuDevice`], [`CommandList`], [`GpuFactory`]), the descriptor structs
//! they consume, and the error taxonomy they surface. It defines the *what*;
//! the *how* lives in the backend implementations in `halcyon-infra`, which
//! must all satisfy the same contract so that callers never branch on the
//! underlying graphics API.
//!
//! Two error classes are distinguished throughout. Contract violations
//! (recording outside the `Recording` state, out-of-range binding offsets,
//! destroying a foreign handle) are caller bugs surfaced by assertions.
//! Environment failures (native rejection, out of memory, device loss) are
//! recoverable and surfaced as error values.

pub mod api;
pub mod error;
pub mod traits;

pub use self::api::*;
pub use self::error::{DeviceError, ResourceError, SubmitError, SwapchainError};
pub use self::traits::{CommandList, GpuDevice, GpuFactory};
