//! # Star Registry Testkit
//!
//! Testing utilities for the star registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Pinned record hashes and an Ed25519 challenge signature
//! - **Generators**: Proptest strategies for identities and star payloads
//! - **Fixtures**: Wallets, a scripted verifier, and a pre-wired in-memory service
//!
//! ## Golden Vectors
//!
//! ```rust
//! use star_registry_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, hash) in verify_all_vectors() {
//!     assert!(matches, "{}: {}", name, hash);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use star_registry_testkit::generators::{identity, star_payload};
//!
//! proptest! {
//!     #[test]
//!     fn story_round_trips(payload in star_payload()) {
//!         let star = star_registry_core::Star::from(&payload);
//!         prop_assert_eq!(star.decoded_story(), Some(payload.story));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use star_registry_testkit::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let record = fixture.register(&payload).await?;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{wallets, MemoryService, ScriptedVerifier, TestFixture, Wallet, FIXTURE_EPOCH};
