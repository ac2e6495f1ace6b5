//! # Star Registry
//!
//! A notary for stars: a wallet holder proves control of an identity within
//! a bounded window, then registers one star in a hash-chained ledger.
//!
//! ## Overview
//!
//! - **Validation registry**: one time-bounded request per identity. A fresh
//!   request must be signed within the short window; a verified request may
//!   register a record within the long window.
//! - **Ledger**: an append-only sequence of records, each linked to its
//!   predecessor by content hash, starting from a fixed genesis record.
//! - **Orchestrator**: a ledger append is allowed only for a verified
//!   identity, and succeeding retires the validation request.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use star_registry::core::{Ed25519Verifier, Keypair, StarPayload};
//! use star_registry::store::{MemoryEngine, SqliteEngine};
//! use star_registry::{Config, RegistrationOrchestrator, SystemClock};
//!
//! async fn example() {
//!     let service = RegistrationOrchestrator::from_config(
//!         Config::default(),
//!         MemoryEngine::new(),
//!         SqliteEngine::open("star-registry.db").unwrap(),
//!         Arc::new(Ed25519Verifier),
//!         Arc::new(SystemClock),
//!     )
//!     .unwrap();
//!     service.initialize().await.unwrap();
//!
//!     let wallet = Keypair::generate();
//!     let identity = wallet.identity();
//!     let challenge = service.request_validation(&identity).await.unwrap();
//!
//!     let signature = wallet.sign(challenge.message.as_bytes()).to_hex();
//!     service.submit_signature(&identity, &signature).await.unwrap();
//!
//!     let star = StarPayload::new("16h 29m 1.0s", "-26 deg 29m 24.9s", "Found it");
//!     let record = service.submit_record(&identity, &star).await.unwrap();
//!     assert_eq!(record.owner, identity);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `star_registry::core` - Requests, records, hashing, verification
//! - `star_registry::store` - Key-value engines

pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod registry;
mod timer;

// Re-export component crates
pub use star_registry_core as core;
pub use star_registry_store as store;

pub use clock::{Clock, SystemClock, TokioClock};
pub use config::{Config, GenesisConfig, RegistryConfig, MAX_WINDOW_SECS};
pub use error::{Error, ErrorKind, Result};
pub use ledger::{ChainReport, LedgerStore};
pub use orchestrator::RegistrationOrchestrator;
pub use registry::IdentityValidationRegistry;

// Re-export commonly used core types
pub use star_registry_core::{
    Record, RecordView, SignatureState, SignatureVerifier, StarPayload, ValidationOutcome,
    ValidationSnapshot,
};
