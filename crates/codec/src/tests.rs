use std::io::{Cursor, Seek, SeekFrom};

use super::*;

fn codec() -> BinaryEntryCodec<i64, String> {
    BinaryEntryCodec::new()
}

#[test]
fn round_trip_single_entry() {
    let c = codec();
    let mut buf = Cursor::new(Vec::new());
    c.write_entry(&mut buf, &42i64, &"San Francisco".to_string())
        .unwrap();

    buf.seek(SeekFrom::Start(0)).unwrap();
    let (k, v) = c.read_entry(&mut buf).unwrap().unwrap();
    assert_eq!(k, 42);
    assert_eq!(v, "San Francisco");
    assert!(!c.can_read(&mut buf).unwrap());
}

#[test]
fn round_trip_sequence_preserves_order() {
    let c = codec();
    let mut buf = Cursor::new(Vec::new());
    c.write_entry(&mut buf, &1, &"a".to_string()).unwrap();
    c.write_entry(&mut buf, &2, &"b".to_string()).unwrap();
    c.write_entry(&mut buf, &1, &"a2".to_string()).unwrap();

    buf.seek(SeekFrom::Start(0)).unwrap();
    let mut seen = Vec::new();
    while c.can_read(&mut buf).unwrap() {
        seen.push(c.read_entry(&mut buf).unwrap().unwrap());
    }
    assert_eq!(
        seen,
        vec![
            (1, "a".to_string()),
            (2, "b".to_string()),
            (1, "a2".to_string()),
        ]
    );
}

#[test]
fn torn_tail_is_corrupt() {
    let c = codec();
    let mut buf = Cursor::new(Vec::new());
    c.write_entry(&mut buf, &7, &"hello".to_string()).unwrap();

    // Truncate to simulate a crash mid-write.
    let mut bytes = buf.into_inner();
    bytes.truncate(bytes.len() - 3);
    let mut truncated = Cursor::new(bytes);

    let err = c.read_entry(&mut truncated).unwrap_err();
    assert!(err.is_corrupt());
}

#[test]
fn crc_mismatch_is_corrupt() {
    let c = codec();
    let mut buf = Cursor::new(Vec::new());
    c.write_entry(&mut buf, &1, &"x".to_string()).unwrap();

    let mut bytes = buf.into_inner();
    // Flip a byte inside the body (after the 8-byte header) to break the CRC.
    let idx = bytes.len() - 1;
    bytes[idx] ^= 0xFF;
    let mut corrupted = Cursor::new(bytes);

    let err = c.read_entry(&mut corrupted).unwrap_err();
    assert!(err.is_corrupt());
}

#[test]
fn leb128_string_round_trips_long_value() {
    let c: BinaryEntryCodec<u32, String> = BinaryEntryCodec::new();
    let long = "x".repeat(500);
    let mut buf = Cursor::new(Vec::new());
    c.write_entry(&mut buf, &9, &long).unwrap();
    buf.seek(SeekFrom::Start(0)).unwrap();
    let (_, v) = c.read_entry(&mut buf).unwrap().unwrap();
    assert_eq!(v, long);
}
