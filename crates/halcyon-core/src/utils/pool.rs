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

//! Arena storage for backend objects behind opaque handles.
//!
//! Every RHI handle is a [`RawHandle`]: a stable slot index plus a
//! generation counter. The generation is bumped when a slot is recycled, so
//! a stale handle to a destroyed object misses instead of aliasing whatever
//! object reused the slot.

/// An opaque, value-compared handle into a [`HandlePool`].
///
/// The default value is the null sentinel; it never denotes a live object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RawHandle {
    index: u32,
    generation: u32,
}

impl RawHandle {
    /// The null sentinel. Generation zero is never assigned to a live slot.
    pub const NULL: Self = Self {
        index: 0,
        generation: 0,
    };

    /// Returns `true` if this is the null sentinel.
    pub const fn is_null(&self) -> bool {
        self.generation == 0
    }

    /// The slot index. Only meaningful to the pool that issued the handle.
    pub const fn index(&self) -> u32 {
        self.index
    }
}

/// Declares a typed handle newtype over [`RawHandle`].
///
/// Typed handles keep a buffer handle from being passed where a texture
/// handle is expected while staying plain `Copy` tokens.
#[macro_export]
#[doc(hidden)]
macro_rules! halcyon_handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub $crate::utils::RawHandle);

        impl $name {
            /// The null sentinel.
            pub const NULL: Self = Self($crate::utils::RawHandle::NULL);

            /// Returns `true` if this is the null sentinel.
            pub const fn is_null(&self) -> bool {
                self.0.is_null()
            }

            /// The underlying raw handle.
            pub const fn raw(&self) -> $crate::utils::RawHandle {
                self.0
            }
        }

        impl From<$crate::utils::RawHandle> for $name {
            fn from(raw: $crate::utils::RawHandle) -> Self {
                Self(raw)
            }
        }
    };
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    payload: Option<T>,
}

/// A generational arena. Objects are owned by the pool; callers hold
/// [`RawHandle`]s and every access re-validates index and generation.
#[derive(Debug)]
pub struct HandlePool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for HandlePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandlePool<T> {
    /// Creates an empty pool.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Stores `payload` and returns its handle.
    pub fn insert(&mut self, payload: T) -> RawHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.payload.is_none());
            slot.payload = Some(payload);
            return RawHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        // Generations start at 1 so the all-zero handle stays null.
        self.slots.push(Slot {
            generation: 1,
            payload: Some(payload),
        });
        RawHandle {
            index,
            generation: 1,
        }
    }

    /// Returns the object behind `handle`, or `None` if the handle is null,
    /// stale, or foreign to this pool.
    pub fn get(&self, handle: RawHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.payload.as_ref()
    }

    /// Mutable variant of [`HandlePool::get`].
    pub fn get_mut(&mut self, handle: RawHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.payload.as_mut()
    }

    /// Removes the object behind `handle`, invalidating the handle and any
    /// copies of it. Returns `None` if the handle does not resolve.
    pub fn remove(&mut self, handle: RawHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let payload = slot.payload.take()?;
        // Recycled slots hand out a new generation, so the removed handle
        // can never resolve again.
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(payload)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the pool holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterates over the live objects.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| slot.payload.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handle_never_resolves() {
        let mut pool = HandlePool::<u32>::new();
        let _ = pool.insert(7);
        assert!(RawHandle::NULL.is_null());
        assert!(RawHandle::default().is_null());
        assert!(pool.get(RawHandle::NULL).is_none());
    }

    #[test]
    fn insert_then_get() {
        let mut pool = HandlePool::new();
        let a = pool.insert("alpha");
        let b = pool.insert("beta");
        assert_ne!(a, b);
        assert_eq!(pool.get(a), Some(&"alpha"));
        assert_eq!(pool.get(b), Some(&"beta"));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn stale_handle_misses_after_slot_reuse() {
        let mut pool = HandlePool::new();
        let first = pool.insert(1u64);
        assert_eq!(pool.remove(first), Some(1));

        let second = pool.insert(2u64);
        // The slot index is recycled but the generation moved on.
        assert_eq!(second.index(), first.index());
        assert!(pool.get(first).is_none());
        assert!(pool.remove(first).is_none());
        assert_eq!(pool.get(second), Some(&2));
    }

    #[test]
    fn double_remove_is_a_miss() {
        let mut pool = HandlePool::new();
        let handle = pool.insert(3u8);
        assert_eq!(pool.remove(handle), Some(3));
        assert_eq!(pool.remove(handle), None);
        assert!(pool.is_empty());
    }

    #[test]
    fn iter_skips_dead_slots() {
        let mut pool = HandlePool::new();
        let a = pool.insert(10);
        let _b = pool.insert(20);
        let c = pool.insert(30);
        pool.remove(a);
        pool.remove(c);
        let live: Vec<_> = pool.iter().copied().collect();
        assert_eq!(live, vec![20]);
    }
}
