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

//! Queues and submission.
//!
//! A submission executes its sub-steps in a fixed order: wait on
//! semaphores, wait on fences, execute command buffers, reset the waited
//! semaphores, signal semaphores, then advance fences. Callers build a
//! [`SubmitDescriptor`] per batch; within one queue, batches retire in
//! submission order.

use crate::rhi::api::command::CommandBufferId;
use crate::rhi::api::sync::{FenceId, SemaphoreId};
use std::borrow::Cow;

/// The class of work a queue accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    /// Graphics, compute, and copy work.
    Graphics,
    /// Compute and copy work.
    Compute,
    /// Copy work only.
    Transfer,
}

impl QueueKind {
    /// Number of enumerators; translation tables are sized against this.
    pub const COUNT: usize = 3;

    /// All enumerators in ordinal order.
    pub const ALL: [QueueKind; QueueKind::COUNT] =
        [QueueKind::Graphics, QueueKind::Compute, QueueKind::Transfer];
}

crate::halcyon_handle! {
    /// An opaque handle to a device queue.
    QueueId
}

/// A fence paired with a target value, used both to wait until the fence
/// reaches the value and to advance the fence to the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceOperation {
    /// The fence.
    pub fence: FenceId,
    /// Target value. Waits complete once the fence's value is greater than
    /// or equal to it; signals advance the fence to it.
    pub value: u64,
}

/// One batch of work handed to a queue.
#[derive(Debug, Clone, Default)]
pub struct SubmitDescriptor<'a> {
    /// Semaphores that must be signaled before execution starts. Each is
    /// reset after the wait completes.
    pub wait_semaphores: Cow<'a, [SemaphoreId]>,
    /// Fence values that must be reached before execution starts.
    pub wait_fences: Cow<'a, [FenceOperation]>,
    /// Command buffers to execute, in order. Must be `Executable`.
    pub command_buffers: Cow<'a, [CommandBufferId]>,
    /// Semaphores signaled after execution completes.
    pub signal_semaphores: Cow<'a, [SemaphoreId]>,
    /// Fences advanced after execution completes. Values must exceed each
    /// fence's current value.
    pub signal_fences: Cow<'a, [FenceOperation]>,
}
