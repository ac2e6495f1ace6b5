//! # Star Registry Core
//!
//! Pure primitives for the star registry: validation requests, hash-linked
//! records, canonical encoding, and signature verification.
//!
//! This crate contains no I/O, no storage, no timers. It is pure computation
//! over the registry's data structures.
//!
//! ## Key Types
//!
//! - [`ValidationRequest`] - A time-bounded proof-of-identity attempt
//! - [`Record`] - One immutable, hash-linked ledger entry
//! - [`Star`] / [`StarPayload`] - The registered star, stored and submitted forms
//! - [`SignatureVerifier`] - Capability that checks a signature against an identity
//!
//! ## Canonicalization
//!
//! Record hashes are SHA-256 over deterministic CBOR. See [`canonical`] module.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod record;
pub mod request;
pub mod signature;

pub use canonical::{canonical_record_bytes, decode_value, encode_value};
pub use crypto::{Keypair, PublicKey, Sha256Hash, Signature};
pub use error::{CoreError, Result};
pub use record::{Record, RecordBuilder, RecordView, Star, StarPayload};
pub use request::{
    SignatureState, ValidationOutcome, ValidationRequest, ValidationSnapshot, ValidationStatus,
};
pub use signature::{Ed25519Verifier, SignatureVerifier};
