//! Registration orchestration: a ledger append requires a verified
//! validation request for the owner, and succeeding retires it.

use std::sync::Arc;

use star_registry_core::{
    Record, SignatureVerifier, StarPayload, ValidationOutcome, ValidationSnapshot,
};
use star_registry_store::KeyValueEngine;
use tracing::info;

use crate::clock::Clock;
use crate::config::Config;
use crate::error::Result;
use crate::ledger::LedgerStore;
use crate::registry::IdentityValidationRegistry;

/// The single facade a service boundary talks to.
///
/// `R` backs the validation registry, `L` backs the ledger.
pub struct RegistrationOrchestrator<R, L> {
    registry: IdentityValidationRegistry<R>,
    ledger: LedgerStore<L>,
}

impl<R, L> RegistrationOrchestrator<R, L>
where
    R: KeyValueEngine + 'static,
    L: KeyValueEngine,
{
    pub fn new(registry: IdentityValidationRegistry<R>, ledger: LedgerStore<L>) -> Self {
        Self { registry, ledger }
    }

    /// Validate `config` and wire a registry and ledger over the given engines.
    pub fn from_config(
        config: Config,
        registry_engine: R,
        ledger_engine: L,
        verifier: Arc<dyn SignatureVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let registry = IdentityValidationRegistry::new(
            registry_engine,
            verifier,
            Arc::clone(&clock),
            config.registry,
        );
        let ledger = LedgerStore::new(ledger_engine, config.genesis, clock);
        Ok(Self::new(registry, ledger))
    }

    /// Startup: create the genesis record if missing and restore expiry
    /// timers for requests that survived a restart.
    pub async fn initialize(&self) -> Result<Record> {
        let genesis = self.ledger.ensure_genesis().await?;
        let restored = self.registry.recover().await?;
        info!(restored, genesis = %genesis.hash, "registration service initialized");
        Ok(genesis)
    }

    pub fn registry(&self) -> &IdentityValidationRegistry<R> {
        &self.registry
    }

    pub fn ledger(&self) -> &LedgerStore<L> {
        &self.ledger
    }

    /// See [`IdentityValidationRegistry::request_validation`].
    pub async fn request_validation(&self, identity: &str) -> Result<ValidationSnapshot> {
        self.registry.request_validation(identity).await
    }

    /// See [`IdentityValidationRegistry::submit_signature`].
    pub async fn submit_signature(
        &self,
        identity: &str,
        signature: &str,
    ) -> Result<ValidationOutcome> {
        self.registry.submit_signature(identity, signature).await
    }

    /// Register `payload` for a validated `identity`.
    ///
    /// Fails with [`Error::NotValidated`](crate::Error::NotValidated) and
    /// leaves the ledger untouched unless the identity holds a verified
    /// request. The check, the append and the retirement run under the
    /// identity's lock, so one validation yields one record and only the
    /// consumed request is retired. Submissions for other identities are
    /// not held up. Once the append succeeds the record is returned even if
    /// retiring the request fails.
    pub async fn submit_record(&self, identity: &str, payload: &StarPayload) -> Result<Record> {
        self.registry
            .consume_with(identity, |_| self.ledger.append(identity, payload))
            .await
    }

    pub async fn record_by_height(&self, height: u64) -> Result<Record> {
        self.ledger.get_by_height(height).await
    }

    pub async fn record_by_hash(&self, hash: &str) -> Result<Option<Record>> {
        self.ledger.get_by_hash(hash).await
    }

    pub async fn records_by_identity(&self, identity: &str) -> Result<Vec<Record>> {
        self.ledger.get_by_identity(identity).await
    }

    /// Current ledger height, `-1` before genesis.
    pub async fn height(&self) -> Result<i64> {
        self.ledger.current_height().await
    }
}
