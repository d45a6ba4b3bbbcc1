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

//! Synchronization primitives.
//!
//! A fence is a monotonically increasing 64-bit counter readable from the
//! host; a wait for value `v` completes once the fence has reached *any*
//! value greater than or equal to `v`, so waiters can never miss a signal.
//! A semaphore is a GPU-only binary flag with single-producer
//! single-consumer discipline per cycle: exactly one submission signals it
//! and exactly one waits on it before it is signaled again.

use crate::rhi::api::queue::FenceOperation;
use std::borrow::Cow;

crate::halcyon_handle! {
    /// An opaque handle to a monotonic fence.
    FenceId
}

crate::halcyon_handle! {
    /// An opaque handle to a binary semaphore.
    SemaphoreId
}

/// A descriptor used to create a fence.
#[derive(Debug, Clone, Default)]
pub struct FenceDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Value the fence starts at. Later values must only grow.
    pub initial_value: u64,
}

/// A descriptor used to create a semaphore. Semaphores start unsignaled.
#[derive(Debug, Clone, Default)]
pub struct SemaphoreDescriptor<'a> {
    /// Optional debug label.
    pub label: Option<Cow<'a, str>>,
}

/// Timeout value that never expires.
pub const WAIT_INDEFINITE: u64 = u64::MAX;

/// A descriptor for a host-side wait on one or more fences.
#[derive(Debug, Clone)]
pub struct WaitDescriptor<'a> {
    /// Fence values to wait for.
    pub fences: Cow<'a, [FenceOperation]>,
    /// `true` waits until every fence reaches its value, `false` until any
    /// one does.
    pub wait_all: bool,
}

impl<'a> WaitDescriptor<'a> {
    /// A wait on a single fence value.
    pub fn one(operation: FenceOperation) -> WaitDescriptor<'static> {
        WaitDescriptor {
            fences: Cow::Owned(vec![operation]),
            wait_all: true,
        }
    }
}

/// Outcome of a host-side fence wait. A timeout is an expected outcome,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// The wait condition was met.
    Signaled,
    /// The timeout elapsed first.
    TimedOut,
}
