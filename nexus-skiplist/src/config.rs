//! Construction parameters for [`OrderedIndex`].

use rand::distr::Bernoulli;
use rand_core::RngCore;

use crate::arena::Arena;
use crate::entry::Links;
use crate::error::Error;
use crate::index::OrderedIndex;

/// Promotion probability used when none is configured.
pub const DEFAULT_PROMOTION_PROBABILITY: f64 = 0.5;

/// Builder for [`OrderedIndex`].
///
/// # Example
///
/// ```
/// use nexus_skiplist::{Builder, OrderedIndex};
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
///
/// let index: OrderedIndex<u64, String, SmallRng, 8> = Builder::default()
///     .promotion_probability(0.25)
///     .capacity(1024)
///     .build(SmallRng::seed_from_u64(7))?;
///
/// assert!(index.is_empty());
/// assert_eq!(index.probability(), 0.25);
/// # Ok::<(), nexus_skiplist::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Builder {
    probability: f64,
    capacity: usize,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            probability: DEFAULT_PROMOTION_PROBABILITY,
            capacity: 0,
        }
    }
}

impl Builder {
    /// Per-lane chance that an entry is also indexed in the next lane up.
    ///
    /// Must lie in `[0, 1]`; checked by [`build`](Self::build).
    pub fn promotion_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Number of entries to reserve up front.
    pub fn capacity(mut self, entries: usize) -> Self {
        self.capacity = entries;
        self
    }

    /// Builds an empty index that draws lane heights from `rng`.
    ///
    /// `rng` is owned for the lifetime of the index and never reseeded.
    ///
    /// # Errors
    ///
    /// - [`Error::NoLanes`] if `LANES == 0`
    /// - [`Error::InvalidProbability`] if the probability is NaN or outside `[0, 1]`
    pub fn build<K, V, R, const LANES: usize>(
        self,
        rng: R,
    ) -> Result<OrderedIndex<K, V, R, LANES>, Error>
    where
        K: Ord,
        R: RngCore,
    {
        if LANES == 0 {
            return Err(Error::NoLanes);
        }
        let promotion = Bernoulli::new(self.probability)
            .map_err(|_| Error::InvalidProbability(self.probability))?;

        debug_log!(
            probability = self.probability,
            lanes = LANES,
            capacity = self.capacity,
            "ordered index created"
        );

        Ok(OrderedIndex {
            arena: Arena::with_capacity(self.capacity),
            sentinel: Links::detached(),
            promotion,
            probability: self.probability,
            rng,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    type TestIndex<const LANES: usize> = OrderedIndex<u32, u32, SmallRng, LANES>;

    fn make_rng() -> SmallRng {
        SmallRng::seed_from_u64(12345)
    }

    #[test]
    fn defaults() {
        let builder = Builder::default();
        assert_eq!(builder.probability, DEFAULT_PROMOTION_PROBABILITY);
        assert_eq!(builder.capacity, 0);

        let index: TestIndex<4> = builder.build(make_rng()).unwrap();
        assert_eq!(index.probability(), 0.5);
        assert!(index.is_empty());
    }

    #[test]
    fn probability_bounds_are_inclusive() {
        for p in [0.0, 1.0, 0.3] {
            let index: TestIndex<4> = Builder::default()
                .promotion_probability(p)
                .build(make_rng())
                .unwrap();
            assert_eq!(index.probability(), p);
        }
    }

    #[test]
    fn rejects_out_of_range_probability() {
        for p in [-0.1, 1.01, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Builder::default()
                .promotion_probability(p)
                .build::<u32, u32, _, 4>(make_rng())
                .unwrap_err();
            assert_eq!(err, Error::InvalidProbability(p));
        }
    }

    #[test]
    fn rejects_nan_probability() {
        let err = Builder::default()
            .promotion_probability(f64::NAN)
            .build::<u32, u32, _, 4>(make_rng())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidProbability(p) if p.is_nan()));
    }

    #[test]
    fn rejects_zero_lanes() {
        let err = Builder::default()
            .build::<u32, u32, _, 0>(make_rng())
            .unwrap_err();
        assert_eq!(err, Error::NoLanes);
    }

    #[test]
    fn capacity_is_reserved() {
        let mut index: TestIndex<4> = Builder::default()
            .capacity(64)
            .build(make_rng())
            .unwrap();
        for i in 0..64 {
            index.insert(i, i);
        }
        assert_eq!(index.len(), 64);
    }
}
