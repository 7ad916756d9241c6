use super::tree::black_height;
use super::*;

#[test]
fn set_then_get_round_trips() {
    let mut mt = RbMemTable::new(10);
    mt.set(5, "five").unwrap();
    assert_eq!(mt.try_get(&5), Some(&"five"));
    assert_eq!(mt.len(), 1);
}

#[test]
fn missing_key_is_none() {
    let mt: RbMemTable<i32, &str> = RbMemTable::new(10);
    assert_eq!(mt.try_get(&1), None);
    assert!(!mt.contains(&1));
}

#[test]
fn set_overwrites_existing_key_without_growing() {
    let mut mt = RbMemTable::new(10);
    mt.set(1, "a").unwrap();
    mt.set(1, "b").unwrap();
    assert_eq!(mt.len(), 1);
    assert_eq!(mt.try_get(&1), Some(&"b"));
}

#[test]
fn new_key_rejected_once_full() {
    let mut mt = RbMemTable::new(2);
    mt.set(1, "a").unwrap();
    mt.set(2, "b").unwrap();
    let err = mt.set(3, "c").unwrap_err();
    assert!(matches!(err, StoreError::Capacity));
    assert_eq!(mt.len(), 2);
}

#[test]
fn update_allowed_even_when_full() {
    let mut mt = RbMemTable::new(2);
    mt.set(1, "a").unwrap();
    mt.set(2, "b").unwrap();
    mt.set(1, "a2").unwrap();
    assert_eq!(mt.try_get(&1), Some(&"a2"));
    assert_eq!(mt.len(), 2);
}

#[test]
fn remove_is_unsupported() {
    let mut mt = RbMemTable::new(10);
    mt.set(1, "a").unwrap();
    let err = mt.remove(&1).unwrap_err();
    assert!(matches!(err, StoreError::Unsupported(_)));
}

#[test]
fn clear_empties_the_table() {
    let mut mt = RbMemTable::new(10);
    mt.set(1, "a").unwrap();
    mt.set(2, "b").unwrap();
    mt.clear();
    assert!(mt.is_empty());
    assert_eq!(mt.try_get(&1), None);
}

#[test]
fn get_all_is_in_ascending_key_order() {
    let mut mt = RbMemTable::new(100);
    for k in [5, 1, 9, 3, 7, 2, 8, 4, 6, 0] {
        mt.set(k, k.to_string()).unwrap();
    }
    let all = mt.get_all();
    let keys: Vec<i32> = all.iter().map(|(k, _)| **k).collect();
    assert_eq!(keys, (0..10).collect::<Vec<_>>());
}

#[test]
fn root_is_black_after_a_single_insert() {
    let mut mt = RbMemTable::new(10);
    mt.set(1, "a").unwrap();
    assert!(mt_root_is_black(&mt), "root must be black after one insert");
}

#[test]
fn tree_invariants_hold_after_many_inserts() {
    let mut mt = RbMemTable::new(1000);
    for k in 0..500i32 {
        // Insert in a scrambled order to exercise both rotation directions.
        let key = (k * 7919) % 500;
        mt.set(key, key).unwrap();
    }
    assert!(
        matches!(mt.root, None) || mt_root_is_black(&mt),
        "root must be black"
    );
    black_height(&mt.root).expect("red-black invariants must hold");
}

fn mt_root_is_black<K, V>(mt: &RbMemTable<K, V>) -> bool {
    matches!(&mt.root, Some(n) if matches!(n.color, super::tree::Color::Black))
}

#[test]
fn is_full_reflects_capacity() {
    let mut mt = RbMemTable::new(2);
    assert!(!mt.is_full());
    mt.set(1, "a").unwrap();
    assert!(!mt.is_full());
    mt.set(2, "b").unwrap();
    assert!(mt.is_full());
}
