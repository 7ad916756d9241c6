use super::*;
use tempfile::tempdir;

fn store(dir: &tempfile::TempDir, name: &str) -> SegmentStore<String, String> {
    SegmentStore::open(dir.path().join(name)).unwrap()
}

#[test]
fn set_then_get_round_trips() {
    let dir = tempdir().unwrap();
    let mut s = store(&dir, "seg.db");
    s.set("k1".into(), "v1".into()).unwrap();
    assert_eq!(s.try_get(&"k1".to_string()).unwrap(), Some("v1".to_string()));
}

#[test]
fn later_write_wins_on_read() {
    let dir = tempdir().unwrap();
    let mut s = store(&dir, "seg.db");
    s.set("k".into(), "old".into()).unwrap();
    s.set("k".into(), "new".into()).unwrap();
    assert_eq!(s.try_get(&"k".to_string()).unwrap(), Some("new".to_string()));
}

#[test]
fn missing_key_returns_none() {
    let dir = tempdir().unwrap();
    let s = store(&dir, "seg.db");
    assert_eq!(s.try_get(&"nope".to_string()).unwrap(), None);
}

#[test]
fn contains_reflects_presence() {
    let dir = tempdir().unwrap();
    let mut s = store(&dir, "seg.db");
    assert!(!s.contains(&"k".to_string()).unwrap());
    s.set("k".into(), "v".into()).unwrap();
    assert!(s.contains(&"k".to_string()).unwrap());
}

#[test]
fn remove_is_unsupported() {
    let dir = tempdir().unwrap();
    let mut s = store(&dir, "seg.db");
    let err = s.remove(&"k".to_string()).unwrap_err();
    assert!(matches!(err, StoreError::Unsupported(_)));
}

#[test]
fn clear_empties_the_segment() {
    let dir = tempdir().unwrap();
    let mut s = store(&dir, "seg.db");
    s.set("k".into(), "v".into()).unwrap();
    s.clear().unwrap();
    assert_eq!(s.try_get(&"k".to_string()).unwrap(), None);
    assert!(s.scan_all().unwrap().is_empty());
}

#[test]
fn set_bulk_replaces_contents_without_dedup() {
    let dir = tempdir().unwrap();
    let mut s = store(&dir, "seg.db");
    s.set("old".into(), "x".into()).unwrap();
    s.set_bulk(vec![("a".into(), "1".into()), ("a".into(), "2".into())])
        .unwrap();
    assert_eq!(s.try_get(&"old".to_string()).unwrap(), None);
    assert_eq!(s.scan_all().unwrap().len(), 2);
    assert_eq!(s.try_get(&"a".to_string()).unwrap(), Some("2".to_string()));
}

#[test]
fn get_all_returns_full_history_in_insertion_order() {
    let dir = tempdir().unwrap();
    let mut s = store(&dir, "seg.db");
    s.set("a".into(), "1".into()).unwrap();
    s.set("b".into(), "1".into()).unwrap();
    s.set("a".into(), "2".into()).unwrap();
    let all = s.get_all().unwrap();
    assert_eq!(
        all,
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "1".to_string()),
            ("a".to_string(), "2".to_string()),
        ]
    );
}

#[test]
fn get_all_reflects_dedup_only_after_compact() {
    let dir = tempdir().unwrap();
    let mut s = store(&dir, "seg.db");
    s.set("k".into(), "old".into()).unwrap();
    s.set("k".into(), "new".into()).unwrap();
    assert_eq!(s.get_all().unwrap().len(), 2);
    s.compact().unwrap();
    assert_eq!(s.get_all().unwrap(), vec![("k".to_string(), "new".to_string())]);
}

#[test]
fn compact_shrinks_duplicate_history_on_disk() {
    let dir = tempdir().unwrap();
    let mut s = store(&dir, "seg.db");
    for i in 0..5 {
        s.set("k".into(), i.to_string()).unwrap();
    }
    s.compact().unwrap();
    let all = s.scan_all().unwrap();
    assert_eq!(all, vec![("k".to_string(), "4".to_string())]);
}

#[test]
fn open_on_existing_file_preserves_its_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seg.db");
    {
        let mut s: SegmentStore<String, String> = SegmentStore::open(&path).unwrap();
        s.set("k".into(), "v".into()).unwrap();
    }
    let s2: SegmentStore<String, String> = SegmentStore::open(&path).unwrap();
    assert_eq!(s2.try_get(&"k".to_string()).unwrap(), Some("v".to_string()));
}
