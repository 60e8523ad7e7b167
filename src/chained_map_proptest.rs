#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can run
// the chain invariant checker after every step.

use crate::cursor::Cursor;
use crate::error::MapError;
use crate::map::ChainedHashMap;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations shrink toward earlier keys and shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    IndexAdd(usize, i32),
    Erase(usize),
    EraseAtCursor(usize),
    At(usize),
    Contains(String),
    Reserve(usize),
    SetMaxLoad(u8),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            3 => (idx.clone(), -100i32..100).prop_map(|(i, d)| Op::IndexAdd(i, d)),
            3 => idx.clone().prop_map(Op::Erase),
            2 => idx.clone().prop_map(Op::EraseAtCursor),
            3 => idx.clone().prop_map(Op::At),
            2 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(Op::Contains),
            1 => (0usize..64).prop_map(Op::Reserve),
            1 => (0u8..=8).prop_map(Op::SetMaxLoad),
            1 => Just(Op::Iterate),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Runs one scenario against std's HashMap as the model. After every step:
// - chain links, run contiguity and slot heads are consistent;
// - len/is_empty match the model;
// - load factor is within its ceiling whenever the step could insert;
// - every tracked cursor still resolves to its key's current value.
fn run_scenario<S>(
    sut: &mut ChainedHashMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut cursors: HashMap<Key, Cursor> = HashMap::new();
    let mut stale: Vec<Cursor> = Vec::new();

    for op in ops {
        let mut inserted = false;
        match op {
            Op::Insert(i, v) => {
                let k = key_from(pool, i);
                let c = sut.insert(k.clone(), v);
                if let Some(&prev) = cursors.get(&k) {
                    prop_assert_eq!(prev, c, "upsert must keep the node");
                }
                cursors.insert(k.clone(), c);
                model.insert(k, v);
                inserted = true;
            }
            Op::IndexAdd(i, d) => {
                let k = key_from(pool, i);
                let v = sut.get_or_insert_default(k.clone());
                *v = v.saturating_add(d);
                let m = model.entry(k.clone()).or_default();
                *m = m.saturating_add(d);
                let c = sut.find(&k);
                prop_assert!(!c.is_end());
                cursors.insert(k, c);
                inserted = true;
            }
            Op::Erase(i) => {
                let k = key_from(pool, i);
                let before = sut.len();
                match sut.erase(&k) {
                    Ok((kk, vv)) => {
                        prop_assert!(kk == k);
                        prop_assert_eq!(Some(vv), model.remove(&k));
                        stale.extend(cursors.remove(&k));
                    }
                    Err(e) => {
                        prop_assert_eq!(e, MapError::NotFound);
                        prop_assert!(!model.contains_key(&k));
                        prop_assert_eq!(sut.len(), before);
                    }
                }
                prop_assert_eq!(sut.at(&k), Err(MapError::NotFound));
            }
            Op::EraseAtCursor(i) => {
                let k = key_from(pool, i);
                if let Some(c) = cursors.remove(&k) {
                    let expected_next = c.successor(&*sut)?;
                    let next = sut.erase_at(c)?;
                    prop_assert_eq!(next, expected_next);
                    model.remove(&k);
                    stale.push(c);
                } else {
                    prop_assert!(sut.find(&k).is_end());
                }
            }
            Op::At(i) => {
                let k = key_from(pool, i);
                match model.get(&k) {
                    Some(v) => prop_assert_eq!(sut.at(&k), Ok(v)),
                    None => prop_assert_eq!(sut.at(&k), Err(MapError::NotFound)),
                }
            }
            Op::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            Op::Reserve(n) => {
                let res = sut.reserve(n);
                if n == 0 {
                    prop_assert!(matches!(res, Err(MapError::InvalidValue(_))));
                } else {
                    prop_assert!(res.is_ok());
                    prop_assert!(sut.load_factor() <= sut.max_load_factor());
                }
            }
            Op::SetMaxLoad(q) => {
                // q / 4 covers 0 (rejected) up to 2.0.
                let f = q as f64 / 4.0;
                let before = sut.max_load_factor();
                let res = sut.set_max_load_factor(f);
                if q == 0 {
                    prop_assert!(res.is_err());
                    prop_assert_eq!(sut.max_load_factor(), before);
                } else {
                    prop_assert!(res.is_ok());
                }
            }
            Op::Iterate => {
                let s_keys: Vec<Key> = sut.keys().cloned().collect();
                let unique: BTreeSet<Key> = s_keys.iter().cloned().collect();
                prop_assert_eq!(s_keys.len(), unique.len(), "iteration repeats a key");
                let m_keys: BTreeSet<Key> = model.keys().cloned().collect();
                prop_assert_eq!(unique, m_keys);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                stale.extend(cursors.drain().map(|(_, c)| c));
            }
        }

        sut.assert_consistent();
        if inserted {
            prop_assert!(sut.load_factor() <= sut.max_load_factor());
        }
        for (k, c) in &cursors {
            prop_assert_eq!(c.key(&*sut), Ok(k));
            prop_assert_eq!(c.value(&*sut), Ok(&model[k]));
        }
        for c in &stale {
            prop_assert_eq!(c.value(&*sut), Err(MapError::IteratorInvalid));
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ChainedHashMap<Key, i32> = ChainedHashMap::new();
        run_scenario(&mut sut, &pool, ops)?;
    }
}

// Constant hasher: every key shares bucket 0, so one run holds the map.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Low-entropy hasher: keys spread over a handful of hashes so runs of
// several buckets sit next to each other in the chain.
#[derive(Clone, Default)]
struct LengthBuildHasher;
#[derive(Default)]
struct LengthHasher(u64);
impl BuildHasher for LengthBuildHasher {
    type Hasher = LengthHasher;
    fn build_hasher(&self) -> Self::Hasher {
        LengthHasher::default()
    }
}
impl Hasher for LengthHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0 = self.0.wrapping_add(bytes.len() as u64);
    }
    fn finish(&self) -> u64 {
        self.0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: ChainedHashMap<Key, i32, ConstBuildHasher> =
            ChainedHashMap::with_hasher(ConstBuildHasher);
        run_scenario(&mut sut, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_with_adjacent_runs((pool, ops) in arb_scenario()) {
        let mut sut: ChainedHashMap<Key, i32, LengthBuildHasher> =
            ChainedHashMap::with_hasher(LengthBuildHasher);
        run_scenario(&mut sut, &pool, ops)?;
    }
}
