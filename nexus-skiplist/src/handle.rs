//! Stable handles to entries in an [`OrderedIndex`](crate::OrderedIndex).
//!
//! An [`EntryId`] names one arena slot plus the stamp the arena gave the
//! entry stored there. The reserved value [`EntryId::SENTINEL`] never names a
//! slot: it stands for the sentinel that heads every lane and closes every
//! lane. A lane ends when its forward link equals `SENTINEL`, so there is no
//! separate "null" handle.

use core::fmt;

/// Copyable, non-owning handle to an entry.
///
/// Handles are returned by the query operations and stay valid until the
/// entry they name is removed. Each handle carries a stamp that is unique to
/// the issuing index and to the insert that produced it, so a handle to a
/// removed entry stays stale even after its slot is reused, and a handle from
/// another index is never mistaken for a local one. Passing either back is
/// reported as [`Error::UnknownEntry`](crate::Error::UnknownEntry).
///
/// Handles compare by identity only. They carry no ordering.
///
/// # Example
///
/// ```
/// use nexus_skiplist::EntryId;
///
/// assert!(EntryId::SENTINEL.is_sentinel());
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntryId {
    slot: usize,
    /// Issuing arena in the high 32 bits, insert generation in the low 32.
    stamp: u64,
}

impl EntryId {
    /// The sentinel: head of every lane, and the link held by the last entry
    /// of every lane.
    pub const SENTINEL: Self = EntryId {
        slot: usize::MAX,
        stamp: 0,
    };

    #[inline]
    pub(crate) const fn new(slot: usize, stamp: u64) -> Self {
        EntryId { slot, stamp }
    }

    /// Returns the arena slot this handle names.
    ///
    /// Returns `usize::MAX` for the sentinel. Slots are reused, so two
    /// handles may share a slot without naming the same entry.
    #[inline]
    pub const fn index(self) -> usize {
        self.slot
    }

    #[inline]
    pub(crate) const fn stamp(self) -> u64 {
        self.stamp
    }

    /// Returns `true` if this is the sentinel.
    #[inline]
    pub const fn is_sentinel(self) -> bool {
        self.slot == usize::MAX
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            f.write_str("EntryId(SENTINEL)")
        } else {
            write!(f, "EntryId({}, gen {})", self.slot, self.stamp as u32)
        }
    }
}
