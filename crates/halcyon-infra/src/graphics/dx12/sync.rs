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

//! Fence machinery for the D3D12-style backend.
//!
//! The backend has one native synchronization primitive, the monotonic
//! fence; binary semaphores are emulated over a fence whose value is
//! pinned to zero or one. Every fence on a device shares one wait group,
//! so a signal only has to notify one condvar and a waiter can watch any
//! number of fences at once. Signals store the new value while holding the
//! group lock, which is what rules out a lost wakeup between a waiter's
//! check and its sleep.

use halcyon_core::rhi::api::{WaitStatus, WAIT_INDEFINITE};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// The shared wakeup channel of every fence on one device.
#[derive(Debug, Default)]
pub(crate) struct FenceWaitGroup {
    lock: Mutex<()>,
    cv: Condvar,
}

/// A monotonic 64-bit fence.
#[derive(Debug)]
pub(crate) struct Dx12Fence {
    value: AtomicU64,
}

impl Dx12Fence {
    pub(crate) fn new(initial_value: u64) -> Self {
        Self {
            value: AtomicU64::new(initial_value),
        }
    }

    /// The highest value the fence has reached.
    pub(crate) fn completed_value(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Advances the fence to `value` and wakes every waiter on the group.
    /// Rewinding a fence is a contract violation.
    pub(crate) fn signal(&self, value: u64, group: &FenceWaitGroup) {
        let _guard = group.lock.lock().unwrap();
        debug_assert!(
            value > self.value.load(Ordering::Relaxed),
            "fence values must be strictly increasing"
        );
        self.value.store(value, Ordering::Release);
        group.cv.notify_all();
    }
}

/// A binary semaphore emulated over a zero-or-one fence.
#[derive(Debug)]
pub(crate) struct Dx12Semaphore {
    fence: Dx12Fence,
}

impl Dx12Semaphore {
    pub(crate) fn new() -> Self {
        Self {
            fence: Dx12Fence::new(0),
        }
    }

    pub(crate) fn is_signaled(&self) -> bool {
        self.fence.completed_value() != 0
    }

    /// Signals the semaphore. Double-signaling without an intervening wait
    /// breaks the single-producer discipline.
    pub(crate) fn signal(&self, group: &FenceWaitGroup) {
        debug_assert!(
            !self.is_signaled(),
            "binary semaphore signaled while already signaled"
        );
        self.fence.signal(1, group);
    }

    /// Resets the semaphore after a completed wait.
    pub(crate) fn reset(&self) {
        self.fence.value.store(0, Ordering::Release);
    }
}

/// Blocks until the given fence values are reached (`wait_all`) or any one
/// is (`!wait_all`), or until `timeout_ns` elapses.
pub(crate) fn wait_for_values(
    group: &FenceWaitGroup,
    targets: &[(Arc<Dx12Fence>, u64)],
    wait_all: bool,
    timeout_ns: u64,
) -> WaitStatus {
    let satisfied = |targets: &[(Arc<Dx12Fence>, u64)]| {
        if wait_all {
            targets.iter().all(|(f, v)| f.completed_value() >= *v)
        } else {
            targets.iter().any(|(f, v)| f.completed_value() >= *v)
        }
    };

    let deadline = if timeout_ns == WAIT_INDEFINITE {
        None
    } else {
        Some(Instant::now() + Duration::from_nanos(timeout_ns))
    };

    let mut guard = group.lock.lock().unwrap();
    loop {
        if satisfied(targets) {
            return WaitStatus::Signaled;
        }
        match deadline {
            None => {
                guard = group.cv.wait(guard).unwrap();
            }
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return WaitStatus::TimedOut;
                }
                let (next, _) = group.cv.wait_timeout(guard, deadline - now).unwrap();
                guard = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn wait_returns_immediately_for_reached_value() {
        let group = FenceWaitGroup::default();
        let fence = Arc::new(Dx12Fence::new(5));
        let status = wait_for_values(&group, &[(fence, 3)], true, 0);
        assert_eq!(status, WaitStatus::Signaled);
    }

    #[test]
    fn wait_times_out_without_a_signal() {
        let group = FenceWaitGroup::default();
        let fence = Arc::new(Dx12Fence::new(0));
        let status = wait_for_values(&group, &[(fence, 1)], true, 2_000_000);
        assert_eq!(status, WaitStatus::TimedOut);
    }

    #[test]
    fn cross_thread_signal_wakes_the_waiter() {
        let group = Arc::new(FenceWaitGroup::default());
        let fence = Arc::new(Dx12Fence::new(0));

        let signaler = {
            let group = Arc::clone(&group);
            let fence = Arc::clone(&fence);
            thread::spawn(move || fence.signal(7, &group))
        };

        let status = wait_for_values(&group, &[(fence, 7)], true, WAIT_INDEFINITE);
        assert_eq!(status, WaitStatus::Signaled);
        signaler.join().unwrap();
    }

    #[test]
    fn semaphore_cycles_through_signal_and_reset() {
        let group = FenceWaitGroup::default();
        let semaphore = Dx12Semaphore::new();
        assert!(!semaphore.is_signaled());
        semaphore.signal(&group);
        assert!(semaphore.is_signaled());
        semaphore.reset();
        assert!(!semaphore.is_signaled());
    }
}
