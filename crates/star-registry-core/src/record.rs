//! Record: one immutable, hash-linked entry in the star ledger.
//!
//! A record carries:
//! - `height`: dense position in the ledger, 0 for genesis
//! - `owner`: the identity that registered the star
//! - `star`: the registered star, story hex-encoded
//! - `hash`: SHA-256 over the canonical encoding (which omits `hash`)
//! - `previous_hash`: `hash` of the record at `height - 1`, empty for genesis
//! - `time`: seconds since the Unix epoch

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_record_bytes, decode_value, encode_value};
use crate::crypto::Sha256Hash;
use crate::error::Result;

/// A star as submitted by a client, with a plain-text story.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StarPayload {
    /// Right ascension.
    pub ra: String,
    /// Declination.
    pub dec: String,
    /// Magnitude.
    #[serde(default)]
    pub mag: String,
    /// Centroid.
    #[serde(default)]
    pub cen: String,
    /// Free-text story.
    pub story: String,
}

impl StarPayload {
    /// Payload with only the required coordinates and story.
    pub fn new(ra: impl Into<String>, dec: impl Into<String>, story: impl Into<String>) -> Self {
        Self {
            ra: ra.into(),
            dec: dec.into(),
            mag: String::new(),
            cen: String::new(),
            story: story.into(),
        }
    }

    /// Set the magnitude.
    pub fn mag(mut self, mag: impl Into<String>) -> Self {
        self.mag = mag.into();
        self
    }

    /// Set the centroid.
    pub fn cen(mut self, cen: impl Into<String>) -> Self {
        self.cen = cen.into();
        self
    }
}

/// A star as stored in the ledger. The story is hex-encoded so that it can
/// never collide with control characters of any outer encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Star {
    pub ra: String,
    pub dec: String,
    pub mag: String,
    pub cen: String,
    /// Hex encoding of the UTF-8 story.
    pub story: String,
}

impl Star {
    /// Decode the stored story back to text.
    ///
    /// Returns `None` if the stored value is not valid hex or not UTF-8.
    pub fn decoded_story(&self) -> Option<String> {
        let bytes = hex::decode(&self.story).ok()?;
        String::from_utf8(bytes).ok()
    }
}

impl From<&StarPayload> for Star {
    fn from(payload: &StarPayload) -> Self {
        Self {
            ra: payload.ra.clone(),
            dec: payload.dec.clone(),
            mag: payload.mag.clone(),
            cen: payload.cen.clone(),
            story: hex::encode(payload.story.as_bytes()),
        }
    }
}

impl From<StarPayload> for Star {
    fn from(payload: StarPayload) -> Self {
        Star::from(&payload)
    }
}

/// A ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub height: u64,
    pub owner: String,
    pub star: Star,
    pub hash: String,
    pub previous_hash: String,
    pub time: i64,
}

impl Record {
    /// Compute the content hash. The stored `hash` field does not take part.
    pub fn compute_hash(&self) -> Sha256Hash {
        Sha256Hash::hash(&canonical_record_bytes(self))
    }

    /// Whether the stored hash matches the record's content.
    pub fn verify_hash(&self) -> bool {
        self.hash == self.compute_hash().to_hex()
    }

    /// Whether this is the genesis record.
    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }

    /// Whether this record directly follows `prev` in the chain.
    pub fn links_to(&self, prev: &Record) -> bool {
        self.height == prev.height + 1 && self.previous_hash == prev.hash
    }

    /// Serialize for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_value(self)
    }

    /// Deserialize from storage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_value(bytes)
    }

    /// A response view carrying the decoded story next to the record.
    pub fn view(&self) -> RecordView {
        RecordView {
            decoded_story: self.star.decoded_story(),
            record: self.clone(),
        }
    }
}

/// A record together with its decoded story, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: Record,
    pub decoded_story: Option<String>,
}

/// Builder for sealed records.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    owner: String,
    star: Star,
    height: u64,
    previous_hash: String,
    time: i64,
}

impl RecordBuilder {
    /// Start a record for `owner` registering `star`. Defaults to genesis position.
    pub fn new(owner: impl Into<String>, star: impl Into<Star>) -> Self {
        Self {
            owner: owner.into(),
            star: star.into(),
            height: 0,
            previous_hash: String::new(),
            time: 0,
        }
    }

    /// Place the record directly after `prev`.
    pub fn after(mut self, prev: &Record) -> Self {
        self.height = prev.height + 1;
        self.previous_hash = prev.hash.clone();
        self
    }

    /// Set the timestamp (seconds since epoch).
    pub fn time(mut self, time: i64) -> Self {
        self.time = time;
        self
    }

    /// Compute the hash and produce the final record.
    pub fn seal(self) -> Record {
        let mut record = Record {
            height: self.height,
            owner: self.owner,
            star: self.star,
            hash: String::new(),
            previous_hash: self.previous_hash,
            time: self.time,
        };
        record.hash = record.compute_hash().to_hex();
        record
    }
}
