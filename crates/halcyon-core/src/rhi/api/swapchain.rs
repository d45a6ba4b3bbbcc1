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

//! Swapchains and presentation.
//!
//! A swapchain owns a ring of back-buffer images. Each frame the caller
//! acquires an image index together with an availability semaphore, records
//! work that waits on that semaphore, and presents with semaphores the
//! rendering work signals. Back-buffer images start in the `Present`
//! layout; rendering into one requires an explicit transition to
//! `RenderTarget` and back.

use crate::rhi::api::dimension::Extent2D;
use crate::rhi::api::queue::QueueId;
use crate::rhi::api::resource::{Format, ResourceId, ResourceViewId};
use crate::rhi::api::sync::SemaphoreId;
use std::borrow::Cow;

crate::halcyon_handle! {
    /// An opaque handle to a swapchain.
    SwapchainId
}

/// A descriptor used to create a swapchain over a surface.
#[derive(Debug, Clone)]
pub struct SwapchainDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Size of every back-buffer image.
    pub extent: Extent2D,
    /// Format of every back-buffer image.
    pub format: Format,
    /// Number of images in the ring. At least two.
    pub buffer_count: u32,
    /// Queue presentation happens on.
    pub queue: QueueId,
}

/// The result of acquiring the next back buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquiredFrame {
    /// Index of the acquired image in the ring.
    pub index: u32,
    /// Semaphore that becomes signaled when the image is actually ready.
    /// The first submission touching the image must wait on it.
    pub available: SemaphoreId,
}

/// A descriptor for presenting the most recently acquired image.
#[derive(Debug, Clone, Default)]
pub struct PresentDescriptor<'a> {
    /// Semaphores presentation waits on. Each is reset by the wait.
    pub wait_semaphores: Cow<'a, [SemaphoreId]>,
}

/// One image of the back-buffer ring, exposed as an ordinary resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackBuffer {
    /// The image resource. Usable in barriers and copies like any texture.
    pub resource: ResourceId,
    /// A render-target view over the whole image.
    pub view: ResourceViewId,
}
