//! KeyValueEngine trait: the abstract interface the registry and ledger
//! persist through.
//!
//! The engine knows nothing about requests or records. Values are opaque
//! bytes; callers own their own encoding and their own keyspace.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// A string-keyed, byte-valued store with ordered full scans.
///
/// # Design Notes
///
/// - **Absence is not an error**: `get` returns `Ok(None)` for a missing key.
/// - **Idempotent delete**: deleting a missing key succeeds.
/// - **Ordered scan**: `scan_all` yields entries in ascending byte order of
///   the key. Numeric keys therefore sort lexically ("10" before "2").
#[async_trait]
pub trait KeyValueEngine: Send + Sync {
    /// Get the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Every entry, ordered by key.
    async fn scan_all(&self) -> Result<Vec<(String, Vec<u8>)>>;

    /// Number of stored entries.
    async fn count(&self) -> Result<usize> {
        Ok(self.scan_all().await?.len())
    }
}

#[async_trait]
impl<E: KeyValueEngine + ?Sized> KeyValueEngine for Arc<E> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).put(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }

    async fn scan_all(&self) -> Result<Vec<(String, Vec<u8>)>> {
        (**self).scan_all().await
    }

    async fn count(&self) -> Result<usize> {
        (**self).count().await
    }
}
