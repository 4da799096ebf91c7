//! Entries and their forward links.

use crate::handle::EntryId;

/// Which forward link a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lane {
    /// Express lane `i`, `0` being the densest.
    Express(usize),
    /// The base chain, which holds every entry.
    Base,
}

/// Forward links of one position in the structure.
///
/// `lanes[i]` is the next entry in express lane `i`; `next` is the next entry
/// in the base chain. The sentinel owns one `Links` inline in the index, and
/// every entry owns one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Links<const LANES: usize> {
    pub(crate) lanes: [EntryId; LANES],
    pub(crate) next: EntryId,
}

impl<const LANES: usize> Links<LANES> {
    /// Links that point back at the sentinel everywhere.
    ///
    /// For the sentinel this is the empty circular list. For a fresh entry it
    /// means "joins no lane yet".
    #[inline]
    pub(crate) const fn detached() -> Self {
        Self {
            lanes: [EntryId::SENTINEL; LANES],
            next: EntryId::SENTINEL,
        }
    }

    #[inline]
    pub(crate) fn follow(&self, lane: Lane) -> EntryId {
        match lane {
            Lane::Express(i) => self.lanes[i],
            Lane::Base => self.next,
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, lane: Lane, id: EntryId) {
        match lane {
            Lane::Express(i) => self.lanes[i] = id,
            Lane::Base => self.next = id,
        }
    }
}

/// One stored key/value pair and its position in the lanes.
///
/// Entries are created by [`OrderedIndex::insert`](crate::OrderedIndex::insert)
/// and read through [`OrderedIndex::entry`](crate::OrderedIndex::entry).
/// An entry joins express lanes `0..=highest_lane` and is always on the base
/// chain.
#[derive(Debug, Clone)]
pub struct Entry<K, V, const LANES: usize> {
    key: K,
    value: V,
    pub(crate) links: Links<LANES>,
    /// Number of express lanes joined.
    height: usize,
}

impl<K, V, const LANES: usize> Entry<K, V, LANES> {
    /// Creates an entry that will join `height` express lanes.
    #[inline]
    pub(crate) fn new(key: K, value: V, height: usize) -> Self {
        debug_assert!(height <= LANES);
        Self {
            key,
            value,
            links: Links::detached(),
            height,
        }
    }

    /// Creates an entry with a defaulted value.
    #[inline]
    pub(crate) fn from_key(key: K, height: usize) -> Self
    where
        V: Default,
    {
        Self::new(key, V::default(), height)
    }

    /// The ordering key.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The stored value.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Topmost express lane this entry participates in, or `None` if it is
    /// only on the base chain.
    #[inline]
    pub fn highest_lane(&self) -> Option<usize> {
        self.height.checked_sub(1)
    }

    /// Returns `true` if the entry participates in express lane `lane`.
    #[inline]
    pub fn in_lane(&self, lane: usize) -> bool {
        lane < self.height
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub(crate) fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}
