//! Property-based tests for `OrderedIndex`.
//!
//! Differential testing against a stably sorted `Vec` as the oracle.

use nexus_skiplist::{EntryId, Error, OrderedIndex};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

type TestIndex = OrderedIndex<u8, u32, SmallRng, 6>;

fn make_index(seed: u64, probability: f64) -> TestIndex {
    OrderedIndex::with_probability(SmallRng::seed_from_u64(seed), probability).unwrap()
}

/// `(key, value)` pairs in base-chain order, via single-step traversal.
fn contents(index: &TestIndex) -> Vec<(u8, u32)> {
    let mut out = Vec::new();
    let mut at = index.sentinel();
    while let Some(next) = index.successor(at) {
        let entry = index.entry(next).unwrap();
        out.push((*entry.key(), *entry.value()));
        at = next;
    }
    out
}

/// Inserts into the oracle after every equal key.
fn oracle_insert(oracle: &mut Vec<(u8, u32)>, key: u8, value: u32) {
    let pos = oracle.partition_point(|(k, _)| *k <= key);
    oracle.insert(pos, (key, value));
}

// ============================================================================
//  Strategies
// ============================================================================

fn probability() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(0.25), Just(0.5), Just(1.0), 0.0..=1.0f64]
}

#[derive(Debug, Clone)]
enum Op {
    Insert(u8),
    /// Remove the first entry with key >= the given key.
    RemoveFrom(u8),
    /// Remove the n-th entry (mod len) by walking to its predecessor.
    RemoveAt(usize),
    Find(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u8>().prop_map(|k| Op::Insert(k % 32)),
        2 => any::<u8>().prop_map(|k| Op::RemoveFrom(k % 32)),
        2 => any::<usize>().prop_map(Op::RemoveAt),
        1 => any::<u8>().prop_map(|k| Op::Find(k % 32)),
    ]
}

// ============================================================================
//  Properties
// ============================================================================

proptest! {
    #[test]
    fn base_chain_is_stably_sorted(
        seed in any::<u64>(),
        p in probability(),
        keys in prop::collection::vec(any::<u8>(), 0..200),
    ) {
        let mut index = make_index(seed, p);
        let mut oracle = Vec::new();

        for (serial, key) in keys.into_iter().enumerate() {
            index.insert(key, serial as u32);
            oracle_insert(&mut oracle, key, serial as u32);
        }

        prop_assert_eq!(index.len(), oracle.len());
        prop_assert_eq!(contents(&index), oracle);
    }

    #[test]
    fn find_first_returns_earliest_inserted(
        seed in any::<u64>(),
        keys in prop::collection::vec(0u8..16, 1..100),
        probe in 0u8..20,
    ) {
        let mut index = make_index(seed, 0.5);
        for (serial, key) in keys.iter().enumerate() {
            index.insert(*key, serial as u32);
        }

        let expected = keys.iter().position(|k| *k == probe).map(|s| s as u32);
        let found = index.find_first(&probe).map(|id| *index.entry(id).unwrap().value());
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn find_last_less_than_is_predecessor(
        seed in any::<u64>(),
        keys in prop::collection::vec(any::<u8>(), 0..100),
        probe in any::<u8>(),
    ) {
        let mut index = make_index(seed, 0.5);
        let mut oracle = Vec::new();
        for (serial, key) in keys.into_iter().enumerate() {
            index.insert(key, serial as u32);
            oracle_insert(&mut oracle, key, serial as u32);
        }

        let landing = index.find_last_less_than(&probe);
        let pos = oracle.partition_point(|(k, _)| *k < probe);
        if pos == 0 {
            prop_assert_eq!(landing, EntryId::SENTINEL);
        } else {
            let entry = index.entry(landing).unwrap();
            prop_assert_eq!((*entry.key(), *entry.value()), oracle[pos - 1]);
        }
    }

    #[test]
    fn random_operations_match_oracle(
        seed in any::<u64>(),
        p in probability(),
        ops in prop::collection::vec(op(), 0..300),
    ) {
        let mut index = make_index(seed, p);
        let mut oracle: Vec<(u8, u32)> = Vec::new();

        for (serial, op) in ops.into_iter().enumerate() {
            let serial = serial as u32;
            match op {
                Op::Insert(key) => {
                    index.insert(key, serial);
                    oracle_insert(&mut oracle, key, serial);
                }
                Op::RemoveFrom(key) => {
                    let result = index.remove_next(index.find_last_less_than(&key));
                    let pos = oracle.partition_point(|(k, _)| *k < key);
                    if pos < oracle.len() {
                        prop_assert_eq!(result, Ok(oracle.remove(pos)));
                    } else {
                        prop_assert_eq!(result, Err(Error::NoSuccessor));
                    }
                }
                Op::RemoveAt(n) => {
                    if oracle.is_empty() {
                        let result = index.remove_next(index.sentinel());
                        prop_assert_eq!(result, Err(Error::NoSuccessor));
                        continue;
                    }
                    let n = n % oracle.len();
                    let mut before = index.sentinel();
                    for _ in 0..n {
                        before = index.successor(before).unwrap();
                    }
                    prop_assert_eq!(index.remove_next(before), Ok(oracle.remove(n)));
                }
                Op::Find(key) => {
                    let found = index.find_first(&key).map(|id| *index.entry(id).unwrap().value());
                    let expected = oracle.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
                    prop_assert_eq!(found, expected);
                }
            }
        }

        prop_assert_eq!(index.len(), oracle.len());
        prop_assert_eq!(contents(&index), oracle);
    }

    #[test]
    fn failed_remove_leaves_index_unchanged(
        seed in any::<u64>(),
        keys in prop::collection::vec(any::<u8>(), 1..50),
    ) {
        let mut index = make_index(seed, 0.5);
        for (serial, key) in keys.iter().enumerate() {
            index.insert(*key, serial as u32);
        }
        let before = contents(&index);

        // The last entry has no successor.
        let mut last = index.sentinel();
        while let Some(next) = index.successor(last) {
            last = next;
        }
        prop_assert_eq!(index.remove_next(last), Err(Error::NoSuccessor));

        // A removed entry's handle is stale.
        let first = index.first().unwrap();
        let removed = index.remove_next(index.sentinel()).unwrap();
        prop_assert_eq!(index.remove_next(first), Err(Error::UnknownEntry));
        prop_assert_eq!(contents(&index), before[1..].to_vec());
        prop_assert_eq!(removed, before[0]);
    }

    #[test]
    fn removed_handles_stay_stale_after_slot_reuse(
        seed in any::<u64>(),
        keys in prop::collection::vec(any::<u8>(), 1..50),
        refill in prop::collection::vec(any::<u8>(), 1..50),
    ) {
        let mut index = make_index(seed, 0.5);
        for (serial, key) in keys.iter().enumerate() {
            index.insert(*key, serial as u32);
        }

        let mut stale = Vec::new();
        while let Some(first) = index.first() {
            index.remove_next(index.sentinel()).unwrap();
            stale.push(first);
        }

        // Refilling reuses the freed slots under new generations.
        let mut oracle = Vec::new();
        for (serial, key) in refill.into_iter().enumerate() {
            index.insert(key, serial as u32);
            oracle_insert(&mut oracle, key, serial as u32);
        }

        for id in stale {
            prop_assert!(index.entry(id).is_none());
            prop_assert_eq!(index.successor(id), None);
            prop_assert_eq!(index.remove_next(id), Err(Error::UnknownEntry));
        }
        prop_assert_eq!(contents(&index), oracle);
    }
}
