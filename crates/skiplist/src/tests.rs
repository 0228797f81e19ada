use super::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

// -------------------- Construction --------------------

#[test]
#[should_panic(expected = "max_level")]
fn zero_max_level_panics() {
    let _ = SkipList::<i64, String>::new(0);
}

#[test]
#[should_panic(expected = "p must lie")]
fn probability_above_one_panics() {
    let _ = SkipList::<i64, String>::with_probability(16, 1.5);
}

#[test]
#[should_panic(expected = "p must lie")]
fn nan_probability_panics() {
    let _ = SkipList::<i64, String>::with_probability(16, f64::NAN);
}

// -------------------- Search --------------------

#[test]
fn empty_list_search_miss() {
    let list: SkipList<i64, String> = SkipList::new(16);
    assert_eq!(list.search(&123), None);
    assert!(list.is_empty());
    assert_eq!(list.current_level(), 1);
}

#[test]
fn insert_and_search_single() {
    // p = 0.0 pins every node at height 1, so this exercises the plain
    // sorted-linked-list path without randomness.
    let mut list = SkipList::with_probability(16, 0.0);

    assert!(list.insert(1, "one".to_string()));

    assert_eq!(list.search(&1), Some(&"one".to_string()));
    assert_eq!(list.search(&2), None);
    assert_eq!(list.len(), 1);
}

#[test]
fn insert_many_and_search_all_single_level() {
    let mut list = SkipList::with_probability(16, 0.0);

    let n = 2000i64;
    for i in 0..n {
        assert!(list.insert(i, i.to_string()));
    }

    for i in 0..n {
        assert_eq!(list.search(&i), Some(&i.to_string()));
    }
    assert_eq!(list.search(&-1), None);
    assert_eq!(list.search(&n), None);
    assert_eq!(list.len(), n as usize);
}

#[test]
fn shuffled_insert_order_still_searchable() {
    let mut list = SkipList::with_seed(16, 0.5, 42);

    let mut keys: Vec<i64> = (0..1000).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(12345));

    for &k in &keys {
        assert!(list.insert(k, format!("v{}", k)));
    }
    for &k in &keys {
        assert_eq!(list.search(&k), Some(&format!("v{}", k)));
    }
}

// -------------------- Update semantics --------------------

#[test]
fn reinsert_overwrites_in_place() {
    let mut list = SkipList::with_probability(16, 0.0);

    assert!(list.insert(7, "a".to_string()));
    assert!(list.insert(7, "b".to_string()));

    assert_eq!(list.search(&7), Some(&"b".to_string()));
    assert_eq!(list.len(), 1);
    assert_eq!(list.slots.len(), 1, "update must not allocate a new node");
}

// -------------------- Degenerate heights --------------------

#[test]
fn all_nodes_at_max_level() {
    // p = 1.0 promotes every node to max_level, forcing the level-raise
    // path on the first insert and multi-level link maintenance after.
    let mut list = SkipList::with_probability(8, 1.0);

    for i in 1..=200i64 {
        assert!(list.insert(i, i * 10));
    }
    assert_eq!(list.current_level(), 8);

    for i in 1..=200i64 {
        assert_eq!(list.search(&i), Some(&(i * 10)));
    }
    assert_eq!(list.search(&0), None);
    assert_eq!(list.search(&201), None);
}

#[test]
fn string_keys_order_lexicographically() {
    let mut list = SkipList::with_probability(8, 0.0);

    assert!(list.insert("b".to_string(), 2));
    assert!(list.insert("a".to_string(), 1));
    assert!(list.insert("c".to_string(), 3));

    assert_eq!(list.search(&"a".to_string()), Some(&1));
    assert_eq!(list.search(&"b".to_string()), Some(&2));
    assert_eq!(list.search(&"c".to_string()), Some(&3));
    assert_eq!(list.search(&"d".to_string()), None);
}

// -------------------- Remove --------------------

#[test]
fn remove_missing_key_returns_false() {
    let mut list: SkipList<i64, String> = SkipList::new(16);
    assert!(!list.remove(&1));

    list.insert(2, "two".to_string());
    assert!(!list.remove(&1));
    assert_eq!(list.len(), 1);
}

#[test]
fn remove_then_search_misses() {
    let mut list = SkipList::with_seed(16, 0.5, 7);

    for i in 0..100i64 {
        list.insert(i, i.to_string());
    }
    for i in (0..100i64).step_by(2) {
        assert!(list.remove(&i));
    }

    for i in 0..100i64 {
        if i % 2 == 0 {
            assert_eq!(list.search(&i), None);
        } else {
            assert_eq!(list.search(&i), Some(&i.to_string()));
        }
    }
    assert_eq!(list.len(), 50);
}

#[test]
fn remove_shrinks_current_level() {
    let mut list = SkipList::with_probability(4, 1.0);

    list.insert(1, ());
    list.insert(2, ());
    list.insert(3, ());
    assert_eq!(list.current_level(), 4);

    assert!(list.remove(&1));
    assert!(list.remove(&2));
    assert!(list.remove(&3));

    assert_eq!(list.current_level(), 1);
    assert!(list.is_empty());
}

#[test]
fn removed_slot_is_reused() {
    let mut list = SkipList::with_probability(16, 0.0);

    list.insert(1, "one".to_string());
    assert!(list.remove(&1));
    assert_eq!(list.free.len(), 1);

    list.insert(2, "two".to_string());
    assert_eq!(list.slots.len(), 1, "insert should reuse the vacated slot");
    assert!(list.free.is_empty());
}

// -------------------- Structural invariants --------------------

/// At every level the chain head -> ... -> nil must be strictly
/// increasing in key, and current_level must never drop below 1.
fn assert_chains_sorted(list: &SkipList<i64, String>) {
    assert!(list.current_level() >= 1);
    for level in 0..list.current_level() {
        let mut cur = list.head[level];
        let mut prev: Option<i64> = None;
        while let Some(idx) = cur {
            let node = list.node(idx);
            if let Some(p) = prev {
                assert!(p < node.key, "level {} chain out of order", level);
            }
            assert!(
                node.forward.len() > level,
                "node reachable above its height"
            );
            prev = Some(node.key);
            cur = node.forward[level];
        }
    }
}

#[test]
fn chains_stay_sorted_under_churn() {
    let mut list: SkipList<i64, String> = SkipList::with_seed(16, 0.5, 99);

    let mut keys: Vec<i64> = (0..500).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(99));

    for &k in &keys {
        list.insert(k, format!("v{}", k));
    }
    assert_chains_sorted(&list);

    for &k in keys.iter().take(200) {
        assert!(list.remove(&k));
        // still >= 1 even when the upper levels empty out
        assert!(list.current_level() >= 1);
    }
    assert_chains_sorted(&list);

    // Level-0 chain must contain exactly the surviving keys.
    let survivors: Vec<i64> = list.iter().map(|(k, _)| *k).collect();
    let mut expected: Vec<i64> = keys.iter().skip(200).copied().collect();
    expected.sort_unstable();
    assert_eq!(survivors, expected);
}

// -------------------- Iteration --------------------

#[test]
fn iter_yields_ascending_order() {
    let mut list = SkipList::with_seed(16, 0.5, 3);

    for &k in &[5i64, 1, 9, 3, 7] {
        list.insert(k, k * 100);
    }

    let pairs: Vec<(i64, i64)> = list.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(
        pairs,
        vec![(1, 100), (3, 300), (5, 500), (7, 700), (9, 900)]
    );
}

#[test]
fn iter_on_empty_list() {
    let list: SkipList<i64, String> = SkipList::new(16);
    assert_eq!(list.iter().count(), 0);
}
