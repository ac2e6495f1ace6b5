//! # Star Registry Store
//!
//! Storage abstraction for the star registry. Provides a trait-based
//! key-value interface with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The registry and the ledger each own one [`KeyValueEngine`] instance,
//! so their keyspaces never overlap. The durable engine is [`SqliteEngine`];
//! [`MemoryEngine`] holds transient validation state and backs tests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use star_registry_store::{KeyValueEngine, MemoryEngine, SqliteEngine};
//!
//! async fn example() {
//!     // Durable ledger storage
//!     let ledger = SqliteEngine::open("star-registry.db").unwrap();
//!     ledger.put("0", b"...".to_vec()).await.unwrap();
//!
//!     // Transient request storage
//!     let requests = MemoryEngine::new();
//!     assert!(requests.get("addr").await.unwrap().is_none());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Opaque values**: engines store bytes; callers own serialization
//! - **Absence is `None`**: a missing key is never an error
//! - **Ordered scans**: `scan_all` returns entries by ascending key bytes

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryEngine;
pub use sqlite::SqliteEngine;
pub use traits::KeyValueEngine;
