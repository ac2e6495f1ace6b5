//! In-memory implementation of the KeyValueEngine trait.
//!
//! Holds transient state (pending validation requests) and backs tests.
//! It has the same semantics as SQLite but nothing survives a drop.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::traits::KeyValueEngine;

/// In-memory engine. Thread-safe via RwLock; a BTreeMap keeps scans ordered.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryEngine {
    /// Create a new empty engine.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Poisoned(e.to_string())
}

#[async_trait]
impl KeyValueEngine for MemoryEngine {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    async fn count(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_engine_basic() {
        let engine = MemoryEngine::new();

        engine.put("addr1", b"one".to_vec()).await.unwrap();
        assert_eq!(engine.get("addr1").await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(engine.get("missing").await.unwrap(), None);

        engine.put("addr1", b"two".to_vec()).await.unwrap();
        assert_eq!(engine.get("addr1").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(engine.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_engine_delete_idempotent() {
        let engine = MemoryEngine::new();
        engine.put("k", vec![1]).await.unwrap();

        engine.delete("k").await.unwrap();
        engine.delete("k").await.unwrap();
        assert_eq!(engine.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_engine_scan_ordered() {
        let engine = MemoryEngine::new();
        for key in ["2", "10", "0", "1"] {
            engine.put(key, key.as_bytes().to_vec()).await.unwrap();
        }

        let keys: Vec<String> = engine
            .scan_all()
            .await
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["0", "1", "10", "2"]);
    }
}
