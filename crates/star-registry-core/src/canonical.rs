//! Canonical CBOR encoding for record hashing, plus the storage codec.
//!
//! The hashed encoding of a record is a CBOR map with text keys written in a
//! fixed order:
//!
//! ```text
//! { "height", "owner", "star": { "ra", "dec", "mag", "cen", "story" }, "time", "previous_hash" }
//! ```
//!
//! - `hash` is never part of the encoding
//! - Integers use the smallest valid encoding
//! - Lengths are definite
//! - The story is the hex string, never the raw text
//!
//! **This encoding is FROZEN.** Changing it changes every record hash.

use ciborium::value::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::record::Record;

/// Map key names, in encoding order.
mod keys {
    pub const HEIGHT: &str = "height";
    pub const OWNER: &str = "owner";
    pub const STAR: &str = "star";
    pub const RA: &str = "ra";
    pub const DEC: &str = "dec";
    pub const MAG: &str = "mag";
    pub const CEN: &str = "cen";
    pub const STORY: &str = "story";
    pub const TIME: &str = "time";
    pub const PREVIOUS_HASH: &str = "previous_hash";
}

/// Encode a record to the canonical bytes its hash is computed over.
pub fn canonical_record_bytes(record: &Record) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &record_to_cbor_value(record));
    buf
}

/// Convert a record to a CBOR map in fixed key order, without `hash`.
fn record_to_cbor_value(record: &Record) -> Value {
    let text = |s: &str| Value::Text(s.to_string());

    let star = Value::Map(vec![
        (text(keys::RA), text(&record.star.ra)),
        (text(keys::DEC), text(&record.star.dec)),
        (text(keys::MAG), text(&record.star.mag)),
        (text(keys::CEN), text(&record.star.cen)),
        (text(keys::STORY), text(&record.star.story)),
    ]);

    Value::Map(vec![
        (text(keys::HEIGHT), Value::Integer(record.height.into())),
        (text(keys::OWNER), text(&record.owner)),
        (text(keys::STAR), star),
        (text(keys::TIME), Value::Integer(record.time.into())),
        (text(keys::PREVIOUS_HASH), text(&record.previous_hash)),
    ])
}

/// Recursively encode a CBOR value. Only the shapes a record uses are valid.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Text(s) => encode_text(buf, s),
        Value::Map(entries) => encode_map_ordered(buf, entries),
        _ => panic!("unsupported CBOR value in record encoding"),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode a map (major type 5) keeping the entries in the order given.
fn encode_map_ordered(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    encode_uint(buf, 5, entries.len() as u64);
    for (key, value) in entries {
        encode_value_to(buf, key);
        encode_value_to(buf, value);
    }
}

/// Encode a value for storage.
pub fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(buf)
}

/// Decode a stored value.
pub fn decode_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
}
