//! Error type for index construction and removal.

use thiserror::Error;

/// Errors returned by [`OrderedIndex`](crate::OrderedIndex) and
/// [`Builder`](crate::Builder).
///
/// Every check runs before any link is touched, so a failed call leaves the
/// index unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    /// The handle does not name a live entry of this index: it was removed
    /// (even if its slot has since been reused) or issued by another index.
    #[error("entry not found: handle does not name a live entry")]
    UnknownEntry,

    /// The given position is the last one on the base chain.
    #[error("entry not found: nothing follows the given position")]
    NoSuccessor,

    /// Promotion probability is NaN or outside `[0, 1]`.
    #[error("promotion probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    /// The index was instantiated with zero lanes.
    #[error("lane count must be at least 1")]
    NoLanes,
}

impl Error {
    /// Returns `true` for the "entry not found" family raised by
    /// [`remove_next`](crate::OrderedIndex::remove_next).
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::UnknownEntry | Error::NoSuccessor)
    }
}
