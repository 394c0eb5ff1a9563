#![cfg(test)]

// Property tests for TsHashMap kept inside the crate so they can check the
// chain layer's reachability invariant directly.

use crate::chain_table::ChainTable;
use crate::ts_hash_map::TsHashMap;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug)]
enum Op {
    Insert(i32, u16),
    Remove(i32),
    Get(i32),
    Contains(i32),
    Snapshot,
    Clear,
}

fn arb_ops() -> impl Strategy<Value = (usize, Vec<Op>)> {
    // Small key range keeps chains long and hits updates and removals often.
    let key = -20i32..20;
    let op = prop_oneof![
        4 => (key.clone(), any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.clone().prop_map(Op::Get),
        1 => key.prop_map(Op::Contains),
        1 => Just(Op::Snapshot),
        1 => Just(Op::Clear),
    ];
    (0usize..12, proptest::collection::vec(op, 1..80))
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - insert returns the previous value exactly when the model had the key.
// - remove returns the model's value, and None for an absent key.
// - get/contains_key parity with the model.
// - snapshot holds each live entry once, in non-decreasing bucket order,
//   with every bucket index below capacity.
// - len parity with the model after each op.
fn run<H>(sut: TsHashMap<i32, u16, H>, ops: Vec<Op>) -> Result<(), TestCaseError>
where
    H: crate::bucket_hasher::BucketHasher<i32>,
{
    let mut model: HashMap<i32, u16> = HashMap::new();
    let capacity = sut.capacity();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let prev = sut.insert(k, v).expect("insert cannot exhaust slots here");
                prop_assert_eq!(prev, model.insert(k, v));
            }
            Op::Remove(k) => {
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
            }
            Op::Get(k) => {
                prop_assert_eq!(sut.get(&k), model.get(&k).copied());
            }
            Op::Contains(k) => {
                prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k));
            }
            Op::Snapshot => {
                let snap = sut.snapshot();
                prop_assert!(snap.windows(2).all(|w| w[0].0 <= w[1].0));
                prop_assert!(snap.iter().all(|(b, _, _)| *b < capacity));
                let s: BTreeMap<i32, u16> = snap.iter().map(|(_, k, v)| (*k, *v)).collect();
                prop_assert_eq!(s.len(), snap.len(), "duplicate key in snapshot");
                let m: BTreeMap<i32, u16> = model.iter().map(|(k, v)| (*k, *v)).collect();
                prop_assert_eq!(s, m);
            }
            Op::Clear => {
                prop_assert_eq!(sut.clear(), model.len());
                model.clear();
            }
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    prop_assert_eq!(sut.capacity(), capacity);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((capacity, ops) in arb_ops()) {
        run(TsHashMap::new(capacity), ops)?;
    }
}

// Same invariants with every key forced into one bucket, so each operation
// walks a single long chain and exercises head/middle/tail relinking.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_single_chain((capacity, ops) in arb_ops()) {
        let one_bucket = |_: &i32, _: usize| 0usize;
        run(TsHashMap::with_hasher(capacity, one_bucket), ops)?;
    }
}

// Property: ChainTable's len equals the nodes reachable from bucket heads
// after any insert/remove sequence.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_chain_len_matches_reachable(
        buckets in 1usize..6,
        ops in proptest::collection::vec((any::<bool>(), 0u8..30), 1..100),
    ) {
        let mut t: ChainTable<u8, ()> = ChainTable::with_buckets(buckets);
        for (insert, k) in ops {
            let b = k as usize % buckets;
            if insert {
                t.upsert(b, k, ()).unwrap();
            } else {
                t.remove(b, &k);
            }
            prop_assert_eq!(t.len(), t.reachable());
        }
    }
}
