//! Ordered skip list index with a circular sentinel.
//!
//! [`OrderedIndex`] maps keys to values in sorted order with expected
//! O(log n) search and insert, using randomized express lanes instead of
//! rebalancing. Duplicate keys are allowed and keep their insertion order.
//!
//! # Design
//!
//! ```text
//! Arena (Slab)   - owns every Entry, hands out stable EntryId handles
//! OrderedIndex   - sentinel links + express lanes + base chain, all handles
//! ```
//!
//! - **One owner**: entries live only in the arena; links are handles.
//! - **No null links**: the sentinel closes every lane, so end-of-lane is
//!   `next == EntryId::SENTINEL`.
//! - **Identity removal**: [`remove_next`](OrderedIndex::remove_next)
//!   unlinks exactly the entry after a given position, even among duplicates.
//! - **Injected randomness**: the RNG is passed in once and owned, so a
//!   seeded generator reproduces the exact lane layout.
//!
//! # Quick Start
//!
//! ```
//! use nexus_skiplist::{Builder, OrderedIndex};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let mut index: OrderedIndex<u32, &str, SmallRng, 8> = Builder::default()
//!     .promotion_probability(0.5)
//!     .build(SmallRng::seed_from_u64(42))?;
//!
//! index.insert(5, "a");
//! index.insert(3, "b");
//! index.insert(5, "c");
//!
//! // Earliest-inserted entry with key 5.
//! let id = index.find_first(&5).unwrap();
//! assert_eq!(index.entry(id).unwrap().value(), &"a");
//!
//! // Remove it through its predecessor.
//! let before = index.find_last_less_than(&5);
//! assert_eq!(index.remove_next(before)?, (5, "a"));
//! assert_eq!(index.len(), 2);
//! # Ok::<(), nexus_skiplist::Error>(())
//! ```
//!
//! # Feature Flags
//!
//! - `tracing` - emit `trace`/`debug` events through the `tracing` crate

#![warn(missing_docs)]

#[macro_use]
mod tracing_helpers;

mod arena;
pub mod config;
pub mod entry;
pub mod error;
pub mod handle;
pub mod index;

pub use config::{Builder, DEFAULT_PROMOTION_PROBABILITY};
pub use entry::Entry;
pub use error::Error;
pub use handle::EntryId;
pub use index::OrderedIndex;
