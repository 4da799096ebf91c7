//! Arena storage for entries, addressed by [`EntryId`].
//!
//! The arena owns every entry. Lanes and the base chain only hold handles
//! into it, so there is exactly one owning path per entry and no aliasing of
//! live nodes.
//!
//! Every stored value is stamped with the arena's id and a per-insert
//! generation. A handle is honored only if its stamp matches the slot's, so
//! reused slots and handles from other arenas are both rejected.

use core::ops::{Index, IndexMut};
use core::sync::atomic::{AtomicU32, Ordering};

use slab::Slab;

use crate::handle::EntryId;

/// Source of arena ids. Wraps after `u32::MAX` arenas.
static NEXT_ARENA: AtomicU32 = AtomicU32::new(1);

#[derive(Debug)]
struct Slot<T> {
    stamp: u64,
    value: T,
}

/// Growable slot storage with stamped, stable handles.
///
/// - **Stable handles**: a handle stays valid until its entry is removed
/// - **O(1)** insert, remove, get
/// - **Slot reuse**: removed slots are handed out again by later inserts,
///   under a new generation
#[derive(Debug)]
pub(crate) struct Arena<T> {
    slots: Slab<Slot<T>>,
    id: u32,
    /// Generation of the most recent insert. Wraps after `u32::MAX` inserts.
    generation: u32,
}

impl<T> Arena<T> {
    /// Creates an arena with room for `capacity` entries before it grows.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Slab::with_capacity(capacity),
            id: NEXT_ARENA.fetch_add(1, Ordering::Relaxed),
            generation: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Stores `value` and returns its handle.
    #[inline]
    pub(crate) fn insert(&mut self, value: T) -> EntryId {
        self.generation = self.generation.wrapping_add(1);
        let stamp = (u64::from(self.id) << 32) | u64::from(self.generation);
        let slot = self.slots.insert(Slot { stamp, value });
        EntryId::new(slot, stamp)
    }

    /// Removes and returns the value for `id`, or `None` if `id` does not
    /// name a live value of this arena.
    #[inline]
    pub(crate) fn remove(&mut self, id: EntryId) -> Option<T> {
        if !self.contains(id) {
            return None;
        }
        Some(self.slots.remove(id.index()).value)
    }

    #[inline]
    pub(crate) fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    #[inline]
    pub(crate) fn get(&self, id: EntryId) -> Option<&T> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.stamp == id.stamp())
            .map(|slot| &slot.value)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.stamp == id.stamp())
            .map(|slot| &mut slot.value)
    }
}

/// Panics if `id` is vacant. Only used with handles read from live links.
impl<T> Index<EntryId> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: EntryId) -> &T {
        let slot = &self.slots[id.index()];
        debug_assert_eq!(slot.stamp, id.stamp(), "link names a reused slot");
        &slot.value
    }
}

impl<T> IndexMut<EntryId> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, id: EntryId) -> &mut T {
        let slot = &mut self.slots[id.index()];
        debug_assert_eq!(slot.stamp, id.stamp(), "link names a reused slot");
        &mut slot.value
    }
}
