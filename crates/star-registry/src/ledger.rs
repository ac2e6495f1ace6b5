//! The hash-chained ledger.
//!
//! Records are stored under the decimal string of their height. Height,
//! hash, and identity lookups scan the whole keyspace; this is a scaling
//! limit for large ledgers, where a hash→height and identity→heights index
//! would replace the scans.

use std::sync::Arc;

use star_registry_core::{Record, RecordBuilder, StarPayload};
use star_registry_store::KeyValueEngine;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::GenesisConfig;
use crate::error::{Error, Result};

/// Result of auditing the whole chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainReport {
    /// Height of the last record, `-1` for an empty ledger.
    pub height: i64,
    /// Heights whose stored hash does not match their content.
    pub invalid_hashes: Vec<u64>,
    /// Heights whose `previous_hash` does not match their predecessor, or
    /// whose predecessor is missing.
    pub broken_links: Vec<u64>,
}

impl ChainReport {
    pub fn is_valid(&self) -> bool {
        self.invalid_hashes.is_empty() && self.broken_links.is_empty()
    }
}

/// Append-only, hash-linked sequence of records.
pub struct LedgerStore<E> {
    engine: E,
    genesis: GenesisConfig,
    clock: Arc<dyn Clock>,
    /// Serializes genesis creation and appends.
    writer: Mutex<()>,
}

impl<E: KeyValueEngine> LedgerStore<E> {
    /// Create a ledger over `engine`, which it owns exclusively.
    pub fn new(engine: E, genesis: GenesisConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine,
            genesis,
            clock,
            writer: Mutex::new(()),
        }
    }

    /// The backing engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Height of the last record, or `-1` if the ledger is empty.
    pub async fn current_height(&self) -> Result<i64> {
        let count = self.engine.count().await?;
        Ok(count as i64 - 1)
    }

    /// Return the genesis record, creating it if the ledger is empty.
    pub async fn ensure_genesis(&self) -> Result<Record> {
        let _writer = self.writer.lock().await;
        self.ensure_genesis_locked().await
    }

    /// Append a record for `owner` after the current last record.
    pub async fn append(&self, owner: &str, payload: &StarPayload) -> Result<Record> {
        let _writer = self.writer.lock().await;
        self.ensure_genesis_locked().await?;

        let height = self.current_height().await?;
        let latest = self.get_by_height(height as u64).await?;
        let record = RecordBuilder::new(owner, payload)
            .after(&latest)
            .time(self.clock.now_secs())
            .seal();
        self.put(&record).await?;

        info!(height = record.height, owner = %owner, hash = %record.hash, "record appended");
        Ok(record)
    }

    /// The record at `height`.
    pub async fn get_by_height(&self, height: u64) -> Result<Record> {
        let bytes = self
            .engine
            .get(&height.to_string())
            .await?
            .ok_or(Error::RecordNotFound { height })?;
        Ok(Record::from_bytes(&bytes)?)
    }

    /// The record whose content hash is `hash`, if any.
    pub async fn get_by_hash(&self, hash: &str) -> Result<Option<Record>> {
        Ok(self
            .records()
            .await?
            .into_iter()
            .find(|record| record.hash == hash))
    }

    /// All records owned by `identity`, in ascending height order.
    pub async fn get_by_identity(&self, identity: &str) -> Result<Vec<Record>> {
        let mut records: Vec<Record> = self
            .records()
            .await?
            .into_iter()
            .filter(|record| record.owner == identity)
            .collect();
        // Keys sort lexically ("10" < "2").
        records.sort_by_key(|record| record.height);
        Ok(records)
    }

    /// Recompute every hash and check every link.
    pub async fn validate_chain(&self) -> Result<ChainReport> {
        let mut records = self.records().await?;
        records.sort_by_key(|record| record.height);

        let mut report = ChainReport {
            height: records.len() as i64 - 1,
            ..ChainReport::default()
        };
        let mut previous: Option<&Record> = None;
        for record in &records {
            if !record.verify_hash() {
                report.invalid_hashes.push(record.height);
            }
            let linked = match previous {
                None => record.is_genesis() && record.previous_hash.is_empty(),
                Some(prev) => record.links_to(prev),
            };
            if !linked {
                report.broken_links.push(record.height);
            }
            previous = Some(record);
        }

        if !report.is_valid() {
            warn!(
                invalid_hashes = ?report.invalid_hashes,
                broken_links = ?report.broken_links,
                "ledger failed validation"
            );
        }
        Ok(report)
    }

    async fn ensure_genesis_locked(&self) -> Result<Record> {
        if self.current_height().await? >= 0 {
            return self.get_by_height(0).await;
        }

        let genesis = RecordBuilder::new(self.genesis.owner.clone(), &self.genesis.star)
            .time(self.clock.now_secs())
            .seal();
        self.put(&genesis).await?;

        info!(hash = %genesis.hash, "genesis record created");
        Ok(genesis)
    }

    async fn put(&self, record: &Record) -> Result<()> {
        self.engine
            .put(&record.height.to_string(), record.to_bytes()?)
            .await?;
        Ok(())
    }

    async fn records(&self) -> Result<Vec<Record>> {
        self.engine
            .scan_all()
            .await?
            .into_iter()
            .map(|(_, bytes)| Record::from_bytes(&bytes).map_err(Error::from))
            .collect()
    }
}
