use super::*;
use tempfile::tempdir;

const LARGE_SEGMENT: u64 = 1 << 20;

fn engine(dir: &tempfile::TempDir) -> SegmentedEngine<String, String> {
    SegmentedEngine::open(dir.path(), LARGE_SEGMENT).unwrap()
}

#[test]
fn set_then_get_round_trips() {
    let dir = tempdir().unwrap();
    let mut e = engine(&dir);
    e.set("k".into(), "v".into()).unwrap();
    assert_eq!(e.try_get(&"k".to_string()).unwrap(), Some("v".to_string()));
}

#[test]
fn fresh_engine_starts_with_one_segment() {
    let dir = tempdir().unwrap();
    let e = engine(&dir);
    assert_eq!(e.segment_count(), 1);
}

#[test]
fn rollover_creates_a_new_segment_once_threshold_crossed() {
    let dir = tempdir().unwrap();
    let mut e = SegmentedEngine::open(dir.path(), 16).unwrap();
    for i in 0..20 {
        e.set(format!("key{i}"), "x".repeat(8)).unwrap();
    }
    assert!(e.segment_count() > 1);
}

#[test]
fn newer_segment_shadows_older_value_for_same_key() {
    let dir = tempdir().unwrap();
    let mut e = SegmentedEngine::open(dir.path(), 1).unwrap();
    e.set("k".into(), "old".into()).unwrap();
    // Forces at least one rollover before the next write.
    e.set("k".into(), "new".into()).unwrap();
    assert_eq!(e.try_get(&"k".to_string()).unwrap(), Some("new".to_string()));
}

#[test]
fn remove_is_unsupported() {
    let dir = tempdir().unwrap();
    let mut e = engine(&dir);
    e.set("k".into(), "v".into()).unwrap();
    let err = e.remove(&"k".to_string()).unwrap_err();
    assert!(matches!(err, StoreError::Unsupported(_)));
}

#[test]
fn clear_resets_to_a_single_empty_segment() {
    let dir = tempdir().unwrap();
    let mut e = engine(&dir);
    e.set("k".into(), "v".into()).unwrap();
    e.clear().unwrap();
    assert_eq!(e.segment_count(), 1);
    assert_eq!(e.try_get(&"k".to_string()).unwrap(), None);
}

#[test]
fn get_all_merges_segments_keeping_latest_value() {
    let dir = tempdir().unwrap();
    let mut e = SegmentedEngine::open(dir.path(), 1).unwrap();
    e.set("a".into(), "1".into()).unwrap();
    e.set("b".into(), "1".into()).unwrap();
    e.set("a".into(), "2".into()).unwrap();
    let all = e.get_all().unwrap();
    let a_value = all.iter().find(|(k, _)| k == "a").map(|(_, v)| v.clone());
    assert_eq!(a_value, Some("2".to_string()));
    assert_eq!(all.len(), 2);
}

#[test]
fn compact_collapses_to_a_single_segment() {
    let dir = tempdir().unwrap();
    let mut e = SegmentedEngine::open(dir.path(), 1).unwrap();
    for i in 0..10 {
        e.set("k".into(), i.to_string()).unwrap();
    }
    assert!(e.segment_count() > 1);
    e.compact().unwrap();
    assert_eq!(e.segment_count(), 1);
    assert_eq!(e.try_get(&"k".to_string()).unwrap(), Some("9".to_string()));
}

#[test]
fn reopen_discovers_existing_segments_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().to_path_buf();
    {
        let mut e = SegmentedEngine::open(&path, 1).unwrap();
        e.set("a".into(), "1".into()).unwrap();
        e.set("b".into(), "2".into()).unwrap();
    }
    let e2: SegmentedEngine<String, String> = SegmentedEngine::open(&path, 1).unwrap();
    assert_eq!(e2.try_get(&"a".to_string()).unwrap(), Some("1".to_string()));
    assert_eq!(e2.try_get(&"b".to_string()).unwrap(), Some("2".to_string()));
}

#[test]
fn set_bulk_dedups_then_replays_through_set() {
    let dir = tempdir().unwrap();
    let mut e = engine(&dir);
    e.set("stale".into(), "x".into()).unwrap();
    e.set_bulk(vec![
        ("a".into(), "1".into()),
        ("a".into(), "2".into()),
        ("b".into(), "3".into()),
    ])
    .unwrap();
    assert_eq!(e.try_get(&"stale".to_string()).unwrap(), None);
    assert_eq!(e.try_get(&"a".to_string()).unwrap(), Some("2".to_string()));
    assert_eq!(e.try_get(&"b".to_string()).unwrap(), Some("3".to_string()));
}
