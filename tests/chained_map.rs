// ChainedHashMap integration suite.
//
// Each test names the behaviour under check. Invariants exercised:
// - Upsert: one entry per key, last write wins, size counts distinct keys.
// - Errors: NotFound / InvalidValue / IteratorInvalid leave state unchanged.
// - Growth: load factor stays under its ceiling; reserve keeps contents.
// - Cursors: walks cross bucket boundaries, erase_at yields successors,
//   cursors survive rehash and die with their entries.
// - Copy/move: clones are independent, take() leaves a reusable map.
use chained_hashmap::{ChainedHashMap, Cursor, MapConfig, MapError, MIN_BUCKETS};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq)]
struct Goods {
    id: u32,
    name: String,
    manufacturer: String,
    warehouse_address: String,
    weight: f64,
}

fn goods(id: u32, name: &str, manufacturer: &str, address: &str, weight: f64) -> (u32, Goods) {
    (
        id,
        Goods {
            id,
            name: name.to_string(),
            manufacturer: manufacturer.to_string(),
            warehouse_address: address.to_string(),
            weight,
        },
    )
}

fn catalogue() -> ChainedHashMap<u32, Goods> {
    ChainedHashMap::from([
        goods(320, "cupboard", "IKEA", "Moscow, Pushkin street, 7", 10.25),
        goods(117, "shelf", "MZ5 group", "Saratov, Prospekt mira, 23", 5.62),
        goods(54, "nightstand", "IKEA", "Moscow, Tverskaya street, 12", 7.11),
        goods(61, "chair", "RIVAL", "Rostov, Sokolov Avenue, 1", 6.32),
        goods(546, "armchair", "Sanflor", "Moscow, Tsvetnoy Boulevard, 3", 9.93),
        goods(4, "table", "IKEA", "Moscow, Pushkin street, 7", 4.95),
        goods(28, "chair", "MZ5 group", "Saratov, Prospekt mira, 23", 7.0),
        goods(9, "cupboard", "Aquanet", "Omsk, Lenin street, 31", 13.2),
        goods(1123, "cupboard", "IKEA", "Moscow, Pushkin street, 7", 20.3),
        goods(3, "chair", "RIVAL", "Rostov, Sokolov Avenue, 1", 5.20),
    ])
}

fn snapshot<K: Clone + Ord, V: Clone>(m: &ChainedHashMap<K, V>) -> BTreeMap<K, V> {
    m.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

// Test: upsert, erase and index-access scenario.
// Verifies: duplicate key overwrites, erase removes, index-access creates a
// default-valued entry.
#[test]
fn upsert_erase_index_scenario() {
    let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
    m.insert("a".to_string(), 1);
    m.insert("b".to_string(), 2);
    m.insert("a".to_string(), 3);
    assert_eq!(m.len(), 2);
    assert_eq!(m.at("a"), Ok(&3));

    m.erase("b").unwrap();
    assert_eq!(m.len(), 1);
    assert_eq!(m.at("b"), Err(MapError::NotFound));

    assert_eq!(*m.get_or_insert_default("c".to_string()), 0);
    assert_eq!(m.len(), 2);
    assert_eq!(m.at("c"), Ok(&0));
}

// Test: erasing an absent key.
// Verifies: NotFound and no size change, also on an empty map.
#[test]
fn erase_missing_key_reports_not_found() {
    let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
    assert_eq!(m.erase("nope"), Err(MapError::NotFound));
    m.insert("x".to_string(), 1);
    assert_eq!(m.erase("nope"), Err(MapError::NotFound));
    assert_eq!(m.len(), 1);
}

// Test: at() and index-access agree for every stored key.
#[test]
fn at_and_index_access_agree() {
    let mut m: ChainedHashMap<u32, u64> = (0..200).map(|i| (i, u64::from(i) * 7)).collect();
    for i in 0..200 {
        let via_at = *m.at(&i).unwrap();
        let via_index = *m.get_or_insert_default(i);
        assert_eq!(via_at, via_index);
    }
    assert_eq!(m.len(), 200);
}

// Test: reserve on a small map.
// Verifies: contents preserved, bucket count at least n * floor(2 / mlf).
#[test]
fn reserve_preserves_entries_and_grows() {
    let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
    for (i, k) in ["one", "two", "three", "four", "five"].iter().enumerate() {
        m.insert(k.to_string(), i as i32);
    }
    let before = snapshot(&m);
    m.reserve(1000).unwrap();
    assert!(m.bucket_count() >= 1000 * (2.0 / m.max_load_factor()).floor() as usize);
    assert_eq!(snapshot(&m), before);

    m.set_max_load_factor(0.5).unwrap();
    m.reserve(1000).unwrap();
    assert!(m.bucket_count() >= 4000);
    assert_eq!(snapshot(&m), before);
}

// Test: positive but vanishing load ceiling, and reserve targets too large
// to allocate.
// Verifies: no panic; inserts and index-access still succeed; an oversized
// reserve is InvalidValue and changes nothing.
#[test]
fn extreme_sizes_do_not_panic() {
    let mut m = catalogue();
    m.set_max_load_factor(1e-300).unwrap();
    let buckets = m.bucket_count();
    let (id, item) = goods(99, "Lamp", "Lumen", "Dock 4", 2.5);
    m.insert(id, item.clone());
    m.get_or_insert_default(100).name = "Placeholder".to_string();
    assert_eq!(m.len(), 12);
    assert_eq!(m.bucket_count(), buckets);
    assert_eq!(m.at(&99), Ok(&item));
    assert_eq!(m.at(&100).unwrap().name, "Placeholder");

    let mut m = catalogue();
    let before = snapshot(&m);
    let buckets = m.bucket_count();
    assert!(matches!(m.reserve(usize::MAX), Err(MapError::InvalidValue(_))));
    assert_eq!(m.bucket_count(), buckets);
    assert_eq!(snapshot(&m), before);
}

// Test: invalid configuration arguments.
// Verifies: InvalidValue and unchanged size/entries/ceiling.
#[test]
fn invalid_arguments_leave_map_untouched() {
    let mut m = catalogue();
    let before = snapshot(&m);
    let buckets = m.bucket_count();

    assert!(matches!(m.set_max_load_factor(0.0), Err(MapError::InvalidValue(_))));
    assert!(matches!(m.set_max_load_factor(-0.5), Err(MapError::InvalidValue(_))));
    assert!(matches!(m.set_max_load_factor(f64::NAN), Err(MapError::InvalidValue(_))));
    assert!(matches!(m.reserve(0), Err(MapError::InvalidValue(_))));

    assert_eq!(m.max_load_factor(), 1.0);
    assert_eq!(m.bucket_count(), buckets);
    assert_eq!(snapshot(&m), before);
}

// Test: construction forms.
#[test]
fn construction_forms() {
    let m: ChainedHashMap<u8, u8> = ChainedHashMap::default();
    assert_eq!(m.bucket_count(), MIN_BUCKETS);

    let m: ChainedHashMap<u8, u8> = ChainedHashMap::with_buckets(1);
    assert_eq!(m.bucket_count(), MIN_BUCKETS);

    let m: ChainedHashMap<u8, u8> = ChainedHashMap::with_buckets(33);
    assert_eq!(m.bucket_count(), 33);

    let m: ChainedHashMap<u8, u8> = ChainedHashMap::with_config(MapConfig {
        buckets: 20,
        max_load_factor: 0.75,
    })
    .unwrap();
    assert_eq!(m.bucket_count(), 20);
    assert_eq!(m.max_load_factor(), 0.75);

    let mut m: ChainedHashMap<u8, u8> = vec![(1, 1), (2, 2), (1, 10)].into_iter().collect();
    assert_eq!(m.len(), 2);
    assert_eq!(m.at(&1), Ok(&10));
    m.extend([(3, 3), (4, 4)]);
    assert_eq!(m.len(), 4);
}

// Test: initializer-list catalogue and a find-if style search.
// Verifies: a value reached through a cursor can be edited in place.
#[test]
fn catalogue_search_and_edit() {
    let mut m = catalogue();
    assert_eq!(m.len(), 10);

    let mut c = m.begin();
    while !c.is_end() {
        let w = c.value(&m).unwrap().weight;
        if 7.0 < w && w < 9.0 {
            break;
        }
        c.advance(&m).unwrap();
    }
    assert!(!c.is_end(), "an item between 7 and 9 exists");
    let id = *c.key(&m).unwrap();
    assert_eq!(id, 54);

    c.value_mut(&mut m).unwrap().warehouse_address = "Moscow, Pushkin street, 8".to_string();
    assert_eq!(m.at(&id).unwrap().warehouse_address, "Moscow, Pushkin street, 8");

    let mut second: ChainedHashMap<u32, Goods> = ChainedHashMap::new();
    let (k, v) = goods(108, "cup", "FixPrice", "Tomsk, Andropov avenue, 8", 0.35);
    second.insert(k, v);
    let (k, v) = goods(1, "pen", "FixPrice", "Tomsk, Lomonosov street, 53", 0.13);
    *second.get_or_insert_default(k) = v.clone();
    assert_eq!(second.len(), 2);
    assert_eq!(second.at(&1), Ok(&v));
}

// Test: cursor walk across bucket boundaries.
// Verifies: the walk visits len() distinct keys and the bucket number of
// each step matches bucket().
#[test]
fn cursor_walk_covers_all_buckets() {
    let m: ChainedHashMap<u32, u32> = (0..300).map(|i| (i, i)).collect();
    let mut seen = std::collections::HashSet::new();
    let mut buckets = std::collections::HashSet::new();
    let mut c = m.begin();
    while c != m.end() {
        let k = *c.key(&m).unwrap();
        assert!(seen.insert(k));
        let b = c.bucket_number(&m).unwrap();
        assert_eq!(b, m.bucket(&k));
        buckets.insert(b);
        c.advance(&m).unwrap();
    }
    assert_eq!(seen.len(), m.len());
    assert!(buckets.len() > 1);
    assert_eq!(c.advance(&m), Err(MapError::IteratorInvalid));
}

// Test: erase through cursors while walking.
// Verifies: erase_at returns the successor; the remaining set is exact.
#[test]
fn erase_at_filters_during_walk() {
    let mut m: ChainedHashMap<u32, u32> = (0..100).map(|i| (i, i)).collect();
    let mut c = m.begin();
    while !c.is_end() {
        if c.key(&m).unwrap() % 3 == 0 {
            c = m.erase_at(c).unwrap();
        } else {
            c.advance(&m).unwrap();
        }
    }
    let left: Vec<u32> = {
        let mut v: Vec<u32> = m.keys().copied().collect();
        v.sort();
        v
    };
    let expected: Vec<u32> = (0..100).filter(|k| k % 3 != 0).collect();
    assert_eq!(left, expected);
    assert_eq!(m.erase_at(Cursor::END), Err(MapError::IteratorInvalid));
}

// Test: cursor lifetime across structural changes.
// Verifies: growth keeps cursors valid; erase and clear invalidate them.
#[test]
fn cursors_survive_growth_but_not_removal() {
    let mut m: ChainedHashMap<String, usize> = ChainedHashMap::new();
    let first = m.insert("first".to_string(), 0);
    let before = m.bucket_count();
    for i in 1..500 {
        m.insert(format!("k{}", i), i);
    }
    assert!(m.bucket_count() > before);
    assert_eq!(first.key(&m).map(String::as_str), Ok("first"));
    assert_eq!(first.value(&m), Ok(&0));

    m.erase("first").unwrap();
    assert_eq!(first.value(&m), Err(MapError::IteratorInvalid));

    let other = m.find("k1");
    m.clear();
    assert_eq!(other.key(&m), Err(MapError::IteratorInvalid));
    assert_eq!(m.begin(), m.end());
}

// Test: deep copy.
// Verifies: mutation on either side is invisible to the other.
#[test]
fn clone_is_independent() {
    let mut original = catalogue();
    let snap = snapshot(&original);
    let mut copy = original.clone();
    assert_eq!(copy, original);
    assert_eq!(copy.bucket_count(), original.bucket_count());

    copy.get_mut(&320).unwrap().weight = 0.0;
    copy.erase(&117).unwrap();
    copy.insert(7, Goods::default());
    assert_eq!(snapshot(&original), snap);

    let copy_snap = snapshot(&copy);
    original.clear();
    assert_eq!(snapshot(&copy), copy_snap);
}

// Test: move-out.
// Verifies: take() transfers contents; the source is empty, default-shaped
// and accepts inserts.
#[test]
fn take_leaves_usable_source() {
    let mut src = catalogue();
    let snap = snapshot(&src);
    let moved = src.take();
    assert_eq!(snapshot(&moved), snap);
    assert!(src.is_empty());
    assert_eq!(src.bucket_count(), MIN_BUCKETS);
    assert_eq!(src.max_load_factor(), 1.0);

    src.insert(42, Goods::default());
    assert_eq!(src.len(), 1);

    let moved_again = moved;
    assert_eq!(moved_again.len(), 10);
}

// Test: bulk construction from a cursor range.
#[test]
fn from_range_copies_between_cursors() {
    let src = catalogue();
    let whole = ChainedHashMap::from_range(&src, src.begin(), src.end()).unwrap();
    assert_eq!(whole, src);

    let empty = ChainedHashMap::from_range(&src, src.begin(), src.begin()).unwrap();
    assert!(empty.is_empty());

    let mut c = src.begin();
    c.advance(&src).unwrap();
    let tail = ChainedHashMap::from_range(&src, c, src.end()).unwrap();
    assert_eq!(tail.len(), 9);
    assert!(!tail.contains_key(src.begin().key(&src).unwrap()));

    // `last` before `first` is never reached: the walk runs off the end.
    assert_eq!(
        ChainedHashMap::from_range(&src, c, src.begin()),
        Err(MapError::IteratorInvalid)
    );

    let mut shrunk = catalogue();
    let stale = shrunk.find(&54);
    shrunk.erase(&54).unwrap();
    assert_eq!(
        ChainedHashMap::from_range(&shrunk, stale, shrunk.end()),
        Err(MapError::IteratorInvalid)
    );
}

// Test: owning and borrowing iteration.
#[test]
fn iteration_forms() {
    let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
    for i in 0..25 {
        m.insert(format!("k{}", i), i);
    }
    assert_eq!(m.iter().count(), 25);
    assert_eq!(m.values().sum::<i32>(), (0..25).sum());

    for (_, v) in m.iter_mut() {
        *v *= 2;
    }
    for (k, v) in &m {
        let n: i32 = k[1..].parse().unwrap();
        assert_eq!(*v, n * 2);
    }

    let order: Vec<String> = m.keys().cloned().collect();
    let drained: Vec<String> = m.into_iter().map(|(k, _)| k).collect();
    assert_eq!(drained, order);
}
