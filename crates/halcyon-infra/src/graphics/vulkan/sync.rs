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

//! Synchronization primitives for the Vulkan-style backend.
//!
//! The backend has two native primitives and they are kept distinct: the
//! binary semaphore, a GPU-only flag the host never waits on, and the
//! timeline semaphore, a monotonic counter that backs every RHI fence.
//! Host waits go through one device-wide condvar; timeline signals store
//! their value while holding its lock so a waiter cannot sleep through a
//! signal it was about to observe.

use halcyon_core::rhi::api::{WaitStatus, WAIT_INDEFINITE};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// The device-wide host-wait channel.
#[derive(Debug, Default)]
pub(crate) struct SyncTable {
    lock: Mutex<()>,
    cv: Condvar,
}

/// A monotonic timeline semaphore. Backs RHI fences.
#[derive(Debug)]
pub(crate) struct TimelineSemaphore {
    value: AtomicU64,
}

impl TimelineSemaphore {
    pub(crate) fn new(initial_value: u64) -> Self {
        Self {
            value: AtomicU64::new(initial_value),
        }
    }

    pub(crate) fn counter(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Advances the timeline and wakes host waiters. Timeline values only
    /// grow.
    pub(crate) fn advance(&self, value: u64, table: &SyncTable) {
        let _guard = table.lock.lock().unwrap();
        debug_assert!(
            value > self.value.load(Ordering::Relaxed),
            "timeline values must be strictly increasing"
        );
        self.value.store(value, Ordering::Release);
        table.cv.notify_all();
    }
}

/// A GPU-only binary semaphore with single-producer single-consumer
/// discipline per signal/wait cycle.
#[derive(Debug)]
pub(crate) struct BinarySemaphore {
    signaled: AtomicBool,
}

impl BinarySemaphore {
    pub(crate) fn new() -> Self {
        Self {
            signaled: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::Acquire)
    }

    pub(crate) fn signal(&self) {
        let was = self.signaled.swap(true, Ordering::AcqRel);
        debug_assert!(!was, "binary semaphore signaled while already signaled");
    }

    /// Consumes the signal after a completed queue wait.
    pub(crate) fn consume(&self) {
        self.signaled.store(false, Ordering::Release);
    }
}

/// Blocks until the timeline targets are met (`wait_all`) or any one is
/// (`!wait_all`), or until `timeout_ns` elapses.
pub(crate) fn wait_timelines(
    table: &SyncTable,
    targets: &[(Arc<TimelineSemaphore>, u64)],
    wait_all: bool,
    timeout_ns: u64,
) -> WaitStatus {
    let met = |targets: &[(Arc<TimelineSemaphore>, u64)]| {
        if wait_all {
            targets.iter().all(|(t, v)| t.counter() >= *v)
        } else {
            targets.iter().any(|(t, v)| t.counter() >= *v)
        }
    };

    let deadline = if timeout_ns == WAIT_INDEFINITE {
        None
    } else {
        Some(Instant::now() + Duration::from_nanos(timeout_ns))
    };

    let mut guard = table.lock.lock().unwrap();
    loop {
        if met(targets) {
            return WaitStatus::Signaled;
        }
        match deadline {
            None => {
                guard = table.cv.wait(guard).unwrap();
            }
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return WaitStatus::TimedOut;
                }
                let (next, _) = table.cv.wait_timeout(guard, deadline - now).unwrap();
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
    fn reached_timeline_value_returns_without_blocking() {
        let table = SyncTable::default();
        let timeline = Arc::new(TimelineSemaphore::new(4));
        assert_eq!(
            wait_timelines(&table, &[(timeline, 4)], true, 0),
            WaitStatus::Signaled
        );
    }

    #[test]
    fn unreached_timeline_value_times_out() {
        let table = SyncTable::default();
        let timeline = Arc::new(TimelineSemaphore::new(0));
        assert_eq!(
            wait_timelines(&table, &[(timeline, 9)], true, 2_000_000),
            WaitStatus::TimedOut
        );
    }

    #[test]
    fn wait_any_completes_when_one_timeline_lands() {
        let table = Arc::new(SyncTable::default());
        let slow = Arc::new(TimelineSemaphore::new(0));
        let fast = Arc::new(TimelineSemaphore::new(0));

        let advancer = {
            let table = Arc::clone(&table);
            let fast = Arc::clone(&fast);
            thread::spawn(move || fast.advance(1, &table))
        };

        let targets = [(slow, 100), (fast, 1)];
        assert_eq!(
            wait_timelines(&table, &targets, false, WAIT_INDEFINITE),
            WaitStatus::Signaled
        );
        advancer.join().unwrap();
    }

    #[test]
    fn binary_semaphore_signal_then_consume() {
        let semaphore = BinarySemaphore::new();
        assert!(!semaphore.is_signaled());
        semaphore.signal();
        assert!(semaphore.is_signaled());
        semaphore.consume();
        assert!(!semaphore.is_signaled());
    }
}
