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

//! The window/surface collaborator interface.
//!
//! Window creation and the OS event loop are outside the RHI. Swapchain
//! creation only needs a drawable handle and its pixel size, so the
//! collaborator hands those over through this trait.

use crate::rhi::api::dimension::Extent2D;
use raw_window_handle::RawWindowHandle;

/// Supplies a native drawable and its pixel dimensions to swapchain
/// creation. Implemented by the windowing layer; headless providers (tests,
/// offscreen tooling) return `None` for the native handle.
pub trait SurfaceProvider: Send + Sync {
    /// Current pixel size of the drawable area.
    fn surface_extent(&self) -> Extent2D;

    /// The native window handle, if one exists.
    fn raw_window_handle(&self) -> Option<RawWindowHandle> {
        None
    }
}
