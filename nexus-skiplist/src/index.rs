//! Ordered index - a skip list with a circular sentinel.
//!
//! Every entry sits on the base chain. Some entries are also indexed in one
//! or more express lanes, chosen at insert time by independent coin flips, so
//! searches skip most of the base chain in expected O(log n) steps with no
//! rebalancing.
//!
//! # Design
//!
//! There is no null terminator. The sentinel heads every lane, and the last
//! entry of every lane links back to it, so "empty", "head" and "end" are all
//! the same test: `next == EntryId::SENTINEL`.
//!
//! ```text
//! Lane 1:  S ──────────► 20 ──────────────────────► S
//! Lane 0:  S ──► 10 ───► 20 ───────────► 40 ──────► S
//! Base:    S ──► 10 ───► 20 ──► 30 ────► 40 ──► 50 ► S
//! ```
//!
//! Entries live in an arena and links are [`EntryId`] handles, so the arena is
//! the only owner and removal works by handle identity. That matters for
//! duplicate keys: equal keys are kept in insertion order, and removal unlinks
//! exactly the entry that follows the given position, never "some entry with
//! the same key".
//!
//! # Example
//!
//! ```
//! use nexus_skiplist::OrderedIndex;
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let mut index: OrderedIndex<u64, &str, _, 4> = OrderedIndex::new(SmallRng::seed_from_u64(1))?;
//! index.insert(10, "ten");
//! index.insert(20, "twenty");
//! index.insert(30, "thirty");
//!
//! let twenty = index.find_first(&20).unwrap();
//! assert_eq!(index.entry(twenty).unwrap().value(), &"twenty");
//!
//! // Remove whatever follows the last entry below 20.
//! let before = index.find_last_less_than(&20);
//! assert_eq!(index.remove_next(before)?, (20, "twenty"));
//! assert_eq!(index.find_first(&20), None);
//! # Ok::<(), nexus_skiplist::Error>(())
//! ```

use rand::distr::{Bernoulli, Distribution};
use rand_core::RngCore;

use crate::arena::Arena;
use crate::config::Builder;
use crate::entry::{Entry, Lane, Links};
use crate::error::Error;
use crate::handle::EntryId;

/// An ordered multimap from `K` to `V` backed by a skip list.
///
/// # Type Parameters
///
/// - `K`: Key type, must implement `Ord`. Duplicate keys are allowed.
/// - `V`: Value type
/// - `R`: Random number generator implementing [`RngCore`], owned for the
///   lifetime of the index
/// - `LANES`: Number of express lanes, defaults to 16
///
/// Not synchronized. Callers sharing an index across threads must serialize
/// access themselves.
#[derive(Debug)]
pub struct OrderedIndex<K, V, R, const LANES: usize = 16> {
    /// Sole owner of every entry.
    pub(crate) arena: Arena<Entry<K, V, LANES>>,
    /// Links of the sentinel. Self-referencing (all `SENTINEL`) when empty.
    pub(crate) sentinel: Links<LANES>,
    /// Promotion trial, built once from `probability`.
    pub(crate) promotion: Bernoulli,
    pub(crate) probability: f64,
    pub(crate) rng: R,
}

impl<K, V, R, const LANES: usize> OrderedIndex<K, V, R, LANES>
where
    K: Ord,
    R: RngCore,
{
    /// Creates an empty index with the default promotion probability (0.5).
    ///
    /// # Errors
    ///
    /// [`Error::NoLanes`] if `LANES == 0`.
    pub fn new(rng: R) -> Result<Self, Error> {
        Builder::default().build(rng)
    }

    /// Creates an empty index with the given promotion probability.
    ///
    /// # Errors
    ///
    /// - [`Error::NoLanes`] if `LANES == 0`
    /// - [`Error::InvalidProbability`] if `probability` is NaN or outside `[0, 1]`
    pub fn with_probability(rng: R, probability: f64) -> Result<Self, Error> {
        Builder::default()
            .promotion_probability(probability)
            .build(rng)
    }

    /// Returns `true` if some entry has exactly `key`.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_first(key).is_some()
    }

    /// Returns the earliest-inserted entry whose key equals `key`.
    pub fn find_first(&self, key: &K) -> Option<EntryId> {
        let before = self.find_last_less_than(key);
        let candidate = self.links(before).next;

        (!candidate.is_sentinel() && self.arena[candidate].key() == key).then_some(candidate)
    }

    /// Returns the last entry whose key is strictly less than `key`, or the
    /// sentinel if there is none.
    ///
    /// The result is the natural argument to [`remove_next`](Self::remove_next)
    /// for removing the first entry with key `>= key`.
    pub fn find_last_less_than(&self, key: &K) -> EntryId {
        let mut scratch = [EntryId::SENTINEL; LANES];
        self.seek(|k| k < key, &mut scratch)
    }

    /// Inserts an entry and returns its handle.
    ///
    /// Duplicate keys are kept: the new entry goes after every existing entry
    /// with an equal key.
    pub fn insert(&mut self, key: K, value: V) -> EntryId {
        let height = self.random_height();
        self.link(Entry::new(key, value, height))
    }

    /// Inserts an entry with a default value and returns its handle.
    pub fn insert_key(&mut self, key: K) -> EntryId
    where
        V: Default,
    {
        let height = self.random_height();
        self.link(Entry::from_key(key, height))
    }

    /// Removes the entry that follows `before` on the base chain and returns
    /// its key and value.
    ///
    /// `before` may be the sentinel, which removes the first entry.
    ///
    /// # Errors
    ///
    /// Both leave the index unchanged:
    /// - [`Error::UnknownEntry`] if `before` is neither the sentinel nor a live
    ///   entry of this index
    /// - [`Error::NoSuccessor`] if nothing follows `before`
    pub fn remove_next(&mut self, before: EntryId) -> Result<(K, V), Error> {
        if !before.is_sentinel() && !self.arena.contains(before) {
            return Err(Error::UnknownEntry);
        }
        let target = self.links(before).next;
        if target.is_sentinel() {
            return Err(Error::NoSuccessor);
        }

        // Collect lane predecessors first; nothing is relinked until every
        // lane has been searched.
        let mut lane_before: [Option<EntryId>; LANES] = [None; LANES];
        let key = self.arena[target].key();
        let mut at = EntryId::SENTINEL;
        for lane in (0..LANES).rev() {
            at = self.walk(at, Lane::Express(lane), &|k: &K| k < key);
            lane_before[lane] = self.find_in_run(at, lane, target);
        }

        for (lane, prev) in lane_before.into_iter().enumerate() {
            if let Some(prev) = prev {
                self.unlink_after(prev, Lane::Express(lane));
            }
        }
        self.unlink_after(before, Lane::Base);

        let entry = self.arena.remove(target).expect("linked entry is live");
        trace_log!(
            slot = target.index(),
            height = entry.height(),
            len = self.arena.len(),
            "removed entry"
        );
        Ok(entry.into_parts())
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Walks one lane from `at`, advancing while the next entry's key
    /// satisfies `advance`. Returns the last position reached.
    #[inline]
    fn walk<F>(&self, mut at: EntryId, lane: Lane, advance: &F) -> EntryId
    where
        F: Fn(&K) -> bool,
    {
        loop {
            let next = self.links(at).follow(lane);
            if next.is_sentinel() || !advance(self.arena[next].key()) {
                return at;
            }
            at = next;
        }
    }

    /// Descends from the sentinel through every express lane, top to bottom,
    /// then along the base chain.
    ///
    /// `at_lane[i]` receives the landing position in express lane `i`. Returns
    /// the landing position on the base chain.
    #[inline]
    fn seek<F>(&self, advance: F, at_lane: &mut [EntryId; LANES]) -> EntryId
    where
        F: Fn(&K) -> bool,
    {
        let mut at = EntryId::SENTINEL;
        for lane in (0..LANES).rev() {
            at = self.walk(at, Lane::Express(lane), &advance);
            at_lane[lane] = at;
        }
        self.walk(at, Lane::Base, &advance)
    }

    /// Scans the run of keys equal to `target`'s key that starts after `at`
    /// in express lane `lane`. Returns the entry linking to `target`, if
    /// `target` is in that lane.
    ///
    /// Matches by handle, not key: with duplicates, several entries in the
    /// run compare equal.
    fn find_in_run(&self, at: EntryId, lane: usize, target: EntryId) -> Option<EntryId> {
        let key = self.arena[target].key();
        let mut prev = at;
        loop {
            let next = self.links(prev).lanes[lane];
            if next == target {
                return Some(prev);
            }
            if next.is_sentinel() || self.arena[next].key() != key {
                return None;
            }
            prev = next;
        }
    }

    /// Places a new entry after every entry with a key `<=` its own.
    fn link(&mut self, entry: Entry<K, V, LANES>) -> EntryId {
        let mut lane_before = [EntryId::SENTINEL; LANES];
        let base_before = self.seek(|k| k <= entry.key(), &mut lane_before);

        let height = entry.height();
        let id = self.arena.insert(entry);

        for (lane, &prev) in lane_before.iter().enumerate().take(height) {
            self.splice_after(prev, Lane::Express(lane), id);
        }
        self.splice_after(base_before, Lane::Base, id);

        trace_log!(
            slot = id.index(),
            height,
            len = self.arena.len(),
            "inserted entry"
        );
        id
    }

    /// Runs up to `LANES` promotion trials, stopping at the first failure.
    /// Returns the number of express lanes to join.
    #[inline]
    fn random_height(&mut self) -> usize {
        let mut height = 0;
        while height < LANES && self.promotion.sample(&mut self.rng) {
            height += 1;
        }
        height
    }
}

impl<K, V, R, const LANES: usize> OrderedIndex<K, V, R, LANES> {
    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the index holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sentinel.next.is_sentinel()
    }

    /// Returns the configured promotion probability.
    #[inline]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Returns the sentinel handle.
    ///
    /// The sentinel precedes every entry: `remove_next(index.sentinel())`
    /// removes the first entry.
    #[inline]
    pub fn sentinel(&self) -> EntryId {
        EntryId::SENTINEL
    }

    /// Returns the entry for `id`, or `None` for the sentinel or a stale handle.
    #[inline]
    pub fn entry(&self, id: EntryId) -> Option<&Entry<K, V, LANES>> {
        self.arena.get(id)
    }

    /// Returns a mutable reference to the value for `id`.
    ///
    /// Keys are not exposed mutably; changing one would break the ordering.
    #[inline]
    pub fn value_mut(&mut self, id: EntryId) -> Option<&mut V> {
        self.arena.get_mut(id).map(Entry::value_mut)
    }

    /// Returns the first entry on the base chain, or `None` if empty.
    #[inline]
    pub fn first(&self) -> Option<EntryId> {
        let first = self.sentinel.next;
        (!first.is_sentinel()).then_some(first)
    }

    /// Returns the entry after `id` on the base chain.
    ///
    /// The successor of the sentinel is the first entry. Returns `None` at
    /// the end of the chain or for a stale handle.
    #[inline]
    pub fn successor(&self, id: EntryId) -> Option<EntryId> {
        if !id.is_sentinel() && !self.arena.contains(id) {
            return None;
        }
        let next = self.links(id).next;
        (!next.is_sentinel()).then_some(next)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.release_all();
    }

    /// Frees every entry exactly once by walking the base chain until it
    /// returns to the sentinel, then closes the sentinel's lanes on itself.
    ///
    /// Returns the number of entries released.
    fn release_all(&mut self) -> usize {
        let mut released = 0;
        let mut at = self.sentinel.next;
        // The arena holds no slot for the sentinel, so the walk ends there.
        while let Some(entry) = self.arena.remove(at) {
            at = entry.links.next;
            released += 1;
        }
        self.sentinel = Links::detached();

        debug_assert!(self.arena.is_empty());
        debug_log!(released, "released entries");
        released
    }

    #[inline]
    fn links(&self, id: EntryId) -> &Links<LANES> {
        if id.is_sentinel() {
            &self.sentinel
        } else {
            &self.arena[id].links
        }
    }

    #[inline]
    fn links_mut(&mut self, id: EntryId) -> &mut Links<LANES> {
        if id.is_sentinel() {
            &mut self.sentinel
        } else {
            &mut self.arena[id].links
        }
    }

    /// Links `id` into `lane` right after `prev`.
    #[inline]
    fn splice_after(&mut self, prev: EntryId, lane: Lane, id: EntryId) {
        let after = self.links(prev).follow(lane);
        self.arena[id].links.set(lane, after);
        self.links_mut(prev).set(lane, id);
    }

    /// Unlinks the entry that follows `prev` in `lane`.
    #[inline]
    fn unlink_after(&mut self, prev: EntryId, lane: Lane) {
        let target = self.links(prev).follow(lane);
        let after = self.arena[target].links.follow(lane);
        self.links_mut(prev).set(lane, after);
    }
}

impl<K, V, R, const LANES: usize> Drop for OrderedIndex<K, V, R, LANES> {
    fn drop(&mut self) {
        self.release_all();
    }
}
