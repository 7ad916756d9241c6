//! # Entry codec
//!
//! Serializes a single `(key, value)` record onto a byte stream in a
//! self-delimiting way, and the reverse.
//!
//! ## Wire format
//!
//! ```text
//! [record_len: u32 LE][crc32: u32 LE][key bytes][value bytes]
//! ```
//!
//! `record_len` counts everything after itself (the CRC plus the key/value
//! bytes), mirroring the frame the teacher's `wal` crate used for its own
//! put/delete records. Unlike the teacher's WAL, a record here is always a
//! single opaque `(K, V)` pair — there is no op byte, because the core has no
//! tombstone.
//!
//! A per-record length prefix plus CRC32 makes the format self-synchronizing:
//! a torn tail at end-of-file is detected as [`store_error::StoreError::Corrupt`]
//! rather than silently truncated or mis-parsed (spec's open question on
//! self-synchronizing records, resolved in favor of adding the prefix).

use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher as Crc32;
use store_error::{Result, StoreError};

/// Per-field binary codec for primitive and composite key/value types.
///
/// Implementors are mechanically derivable for composite records (fields in
/// declaration order, no framing) — the entry codec treats any `(K, V)` as
/// opaque as long as this contract is honored.
pub trait FieldCodec: Sized {
    /// Encodes `self` onto `w`.
    fn encode<W: Write>(&self, w: &mut W) -> Result<()>;

    /// Decodes a value from `r`. Any truncation or malformed prefix is
    /// reported as [`StoreError::Corrupt`] with offset `0` — the caller
    /// (the entry codec) already knows the true record offset and is
    /// expected to re-tag the error if it needs to.
    fn decode<R: Read>(r: &mut R) -> Result<Self>;
}

fn corrupt<T>(_: std::io::Error) -> Result<T> {
    Err(StoreError::Corrupt { offset: 0 })
}

impl FieldCodec for bool {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u8(u8::from(*self)).or_else(corrupt)
    }
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        match r.read_u8() {
            Ok(b) => Ok(b != 0),
            Err(e) => corrupt(e),
        }
    }
}

macro_rules! impl_int_codec {
    ($ty:ty, $write:ident, $read:ident) => {
        impl FieldCodec for $ty {
            fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
                w.$write::<LittleEndian>(*self).or_else(corrupt)
            }
            fn decode<R: Read>(r: &mut R) -> Result<Self> {
                match r.$read::<LittleEndian>() {
                    Ok(v) => Ok(v),
                    Err(e) => corrupt(e),
                }
            }
        }
    };
}

impl_int_codec!(i16, write_i16, read_i16);
impl_int_codec!(u16, write_u16, read_u16);
impl_int_codec!(i32, write_i32, read_i32);
impl_int_codec!(u32, write_u32, read_u32);
impl_int_codec!(i64, write_i64, read_i64);
impl_int_codec!(u64, write_u64, read_u64);
impl_int_codec!(f32, write_f32, read_f32);
impl_int_codec!(f64, write_f64, read_f64);

/// 7-bit LEB128-encoded length prefix followed by the raw UTF-8 bytes.
impl FieldCodec for String {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        write_leb128(w, self.len() as u64)?;
        w.write_all(self.as_bytes()).or_else(corrupt)
    }
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let len = read_leb128(r)? as usize;
        let mut buf = vec![0u8; len];
        r.read_exact(&mut buf).or_else(corrupt)?;
        String::from_utf8(buf).map_err(|_| StoreError::Corrupt { offset: 0 })
    }
}

/// `u32` length prefix followed by the raw bytes. Used for opaque blob
/// values where the caller does not want UTF-8 validation.
impl FieldCodec for Vec<u8> {
    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.len() as u32)
            .or_else(corrupt)?;
        w.write_all(self).or_else(corrupt)
    }
    fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let len = r.read_u32::<LittleEndian>().or_else(corrupt)? as usize;
        let mut buf = vec![0u8; len];
        r.read_exact(&mut buf).or_else(corrupt)?;
        Ok(buf)
    }
}

fn write_leb128<W: Write>(w: &mut W, mut value: u64) -> Result<()> {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            w.write_u8(byte).or_else(corrupt)?;
            return Ok(());
        }
        w.write_u8(byte | 0x80).or_else(corrupt)?;
    }
}

fn read_leb128<R: Read>(r: &mut R) -> Result<u64> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    loop {
        let byte = r.read_u8().or_else(corrupt)?;
        result |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 64 {
            return Err(StoreError::Corrupt { offset: 0 });
        }
    }
}

/// Encodes/decodes exactly one `(K, V)` record on a stream.
///
/// `encode` followed by repeated `read_entry` yields the original sequence
/// back; [`can_read`](KvCodec::can_read) gives a reliable end-of-stream
/// predicate so callers can loop without needing to track lengths
/// themselves.
pub trait KvCodec<K, V> {
    /// Encodes one `(key, value)` record onto `w`.
    fn write_entry<W: Write>(&self, w: &mut W, key: &K, value: &V) -> Result<()>;

    /// Decodes exactly one record, advancing the stream to the next record
    /// start. Returns `Ok(None)` at a clean end-of-stream.
    fn read_entry<R: Read + Seek>(&self, r: &mut R) -> Result<Option<(K, V)>>;

    /// `true` when the stream's current position is before its end.
    fn can_read<R: Read + Seek>(&self, r: &mut R) -> Result<bool>;
}

/// The default length-prefixed, CRC-checked entry codec.
///
/// Generic over any pair of [`FieldCodec`] types; composite keys/values are
/// built by composing `FieldCodec` impls field-by-field (declaration order,
/// no framing), matching spec's on-disk record format.
pub struct BinaryEntryCodec<K, V> {
    _marker: PhantomData<(K, V)>,
}

impl<K, V> Default for BinaryEntryCodec<K, V> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<K, V> Clone for BinaryEntryCodec<K, V> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<K, V> BinaryEntryCodec<K, V> {
    pub fn new() -> Self {
        Self::default()
    }
}

fn io_err_to_store(e: std::io::Error, offset: u64) -> StoreError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        StoreError::Corrupt { offset }
    } else {
        StoreError::io(std::path::PathBuf::new(), e)
    }
}

impl<K, V> KvCodec<K, V> for BinaryEntryCodec<K, V>
where
    K: FieldCodec,
    V: FieldCodec,
{
    fn write_entry<W: Write>(&self, w: &mut W, key: &K, value: &V) -> Result<()> {
        let mut body = Vec::with_capacity(32);
        key.encode(&mut body)?;
        value.encode(&mut body)?;

        let mut hasher = Crc32::new();
        hasher.update(&body);
        let crc = hasher.finalize();

        let record_len = (body.len() as u64) + 4;
        if record_len > u64::from(u32::MAX) {
            return Err(StoreError::InvalidArgument(
                "encoded record exceeds u32::MAX bytes".to_string(),
            ));
        }

        w.write_u32::<LittleEndian>(record_len as u32)
            .map_err(|e| io_err_to_store(e, 0))?;
        w.write_u32::<LittleEndian>(crc)
            .map_err(|e| io_err_to_store(e, 0))?;
        w.write_all(&body).map_err(|e| io_err_to_store(e, 0))?;
        Ok(())
    }

    fn read_entry<R: Read + Seek>(&self, r: &mut R) -> Result<Option<(K, V)>> {
        if !self.can_read(r)? {
            return Ok(None);
        }
        let offset = r.stream_position().map_err(|e| io_err_to_store(e, 0))?;

        let record_len = match r.read_u32::<LittleEndian>() {
            Ok(v) => v,
            Err(_) => return Err(StoreError::Corrupt { offset }),
        };
        if record_len < 4 {
            return Err(StoreError::Corrupt { offset });
        }

        let crc = match r.read_u32::<LittleEndian>() {
            Ok(v) => v,
            Err(_) => return Err(StoreError::Corrupt { offset }),
        };

        let body_len = (record_len - 4) as usize;
        let mut body = vec![0u8; body_len];
        if r.read_exact(&mut body).is_err() {
            return Err(StoreError::Corrupt { offset });
        }

        let mut hasher = Crc32::new();
        hasher.update(&body);
        if hasher.finalize() != crc {
            return Err(StoreError::Corrupt { offset });
        }

        let mut cursor = Cursor::new(body);
        let key = K::decode(&mut cursor).map_err(|_| StoreError::Corrupt { offset })?;
        let value = V::decode(&mut cursor).map_err(|_| StoreError::Corrupt { offset })?;
        Ok(Some((key, value)))
    }

    fn can_read<R: Read + Seek>(&self, r: &mut R) -> Result<bool> {
        let pos = r.stream_position().map_err(|e| io_err_to_store(e, 0))?;
        let end = r.seek(SeekFrom::End(0)).map_err(|e| io_err_to_store(e, 0))?;
        r.seek(SeekFrom::Start(pos)).map_err(|e| io_err_to_store(e, 0))?;
        Ok(pos < end)
    }
}

#[cfg(test)]
mod tests;
