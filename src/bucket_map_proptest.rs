// Property tests for BucketMap kept inside the crate so they can inspect
// chain layout alongside the public API.

use crate::bucket_map::{BucketMap, Position};
use crate::error::InsertError;
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

// Pool-indexed operations: indices shrink to earlier keys, the pool shrinks,
// and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    At(usize),
    Contains(String),
    BucketLen(usize),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<Op>)> {
    (0usize..40, proptest::collection::vec("[a-z]{0,5}", 1..=12)).prop_flat_map(
        |(buckets, pool)| {
            let idxs: Vec<usize> = (0..pool.len()).collect();
            let idx = proptest::sample::select(idxs);
            let contains_pool = proptest::sample::select(pool.clone());
            let op = prop_oneof![
                3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
                1 => idx.clone().prop_map(Op::At),
                1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(Op::Contains),
                1 => (0usize..48).prop_map(Op::BucketLen),
                1 => Just(Op::Iterate),
            ];
            proptest::collection::vec(op, 1..80)
                .prop_map(move |ops| (buckets, pool.clone(), ops))
        },
    )
}

fn walk<V, D: FnMut(V)>(m: &BucketMap<'_, V, D>) -> Vec<Position> {
    let mut out = Vec::new();
    let mut cur = m.front();
    while let Some(p) = cur {
        out.push(p);
        cur = m.next(p);
    }
    out
}

// Property: State-machine equivalence against std::collections::HashMap,
// without a deleter.
// - Empty keys are refused and change nothing.
// - New keys return `Ok(None)`; updates return the superseded model value.
// - `at`/`contains_key` agree with the model; `len` counts distinct keys.
// - Per-bucket occupancy sums to `len` and matches the keys' placement.
// - `front`/`next` and `iter` agree, are strictly increasing, cover every
//   key once, and `next(back())` is terminal.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((buckets, pool, ops) in arb_scenario()) {
        let mut sut: BucketMap<'_, i32> = BucketMap::new(buckets);
        let mut model: HashMap<&str, i32> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(i, v) => {
                    let k = pool[i].as_str();
                    match sut.insert(k, v) {
                        Ok(prev) => {
                            prop_assert!(!k.is_empty());
                            prop_assert_eq!(prev, model.insert(k, v));
                        }
                        Err(InsertError::InvalidKey(back)) => {
                            prop_assert!(k.is_empty());
                            prop_assert_eq!(back, v);
                        }
                    }
                }
                Op::At(i) => {
                    let k = pool[i].as_str();
                    prop_assert_eq!(sut.at(k), model.get(k));
                }
                Op::Contains(s) => {
                    prop_assert_eq!(sut.contains_key(&s), model.contains_key(s.as_str()));
                }
                Op::BucketLen(n) => {
                    let expected = model.keys().filter(|k| sut.bucket_of(k) == n).count();
                    prop_assert_eq!(sut.bucket_len(n), expected);
                }
                Op::Iterate => {
                    let positions = walk(&sut);
                    let from_iter: Vec<Position> = sut.iter().map(|(p, _, _)| p).collect();
                    prop_assert_eq!(&positions, &from_iter);
                    prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
                    prop_assert_eq!(sut.back(), positions.last().copied());
                    if let Some(back) = sut.back() {
                        prop_assert_eq!(sut.next(back), None);
                    }
                    let s_keys: BTreeSet<&str> = sut.iter().map(|(_, k, _)| k).collect();
                    let m_keys: BTreeSet<&str> = model.keys().copied().collect();
                    prop_assert_eq!(s_keys, m_keys);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            let total: usize = (0..sut.bucket_count()).map(|n| sut.bucket_len(n)).sum();
            prop_assert_eq!(total, sut.len());
        }
    }
}

// Property: With a deleter, every value the map ever accepted reaches the
// deleter exactly once: superseded values on overwrite (head or not), live
// values on drop. Nothing is handed back from a successful `insert`; a
// refused value comes back in the error and is never released.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_deleter_accounting((buckets, pool, ops) in arb_scenario()) {
        let released = Rc::new(RefCell::new(Vec::<i32>::new()));
        let mut accepted: Vec<i32> = Vec::new();
        {
            let sink = released.clone();
            let mut sut = BucketMap::with_deleter(buckets, move |v: i32| sink.borrow_mut().push(v));
            let mut model: HashMap<&str, i32> = HashMap::new();

            for op in ops {
                if let Op::Insert(i, v) = op {
                    let k = pool[i].as_str();
                    let before = released.borrow().len();
                    match sut.insert(k, v) {
                        Ok(prev) => {
                            prop_assert_eq!(prev, None);
                            accepted.push(v);
                            match model.insert(k, v) {
                                Some(old) => {
                                    prop_assert_eq!(released.borrow().len(), before + 1);
                                    prop_assert_eq!(released.borrow().last().copied(), Some(old));
                                }
                                None => prop_assert_eq!(released.borrow().len(), before),
                            }
                        }
                        Err(InsertError::InvalidKey(back)) => {
                            prop_assert!(k.is_empty());
                            prop_assert_eq!(back, v);
                            prop_assert_eq!(released.borrow().len(), before);
                        }
                    }
                }
            }
            prop_assert_eq!(sut.len(), model.len());
        }

        let mut got = released.borrow().clone();
        got.sort_unstable();
        accepted.sort_unstable();
        prop_assert_eq!(got, accepted);
    }
}
