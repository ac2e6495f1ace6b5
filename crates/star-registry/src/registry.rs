//! The identity validation registry.
//!
//! Owns the lifecycle of validation requests, one per identity:
//!
//! ```text
//! ∅ ──request──▶ Pending ──good sig──▶ Valid ──retire/expiry──▶ ∅
//!                   │                    ▲
//!                bad sig              good sig
//!                   ▼                    │
//!                Invalid ────────────────┘     (Pending/Invalid ──expiry──▶ ∅)
//! ```
//!
//! Every operation on an identity, and every expiry timer firing for it,
//! runs under that identity's lock stripe. A request read after its window
//! has closed is deleted on the spot and treated as absent, so a request
//! whose timer was lost (for example across a restart) never outlives its
//! window.

use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};
use std::time::Duration;

use star_registry_core::{
    SignatureVerifier, ValidationOutcome, ValidationRequest, ValidationSnapshot,
};
use star_registry_store::KeyValueEngine;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::timer::ExpiryTimers;

/// Number of per-identity lock stripes.
const LOCK_STRIPES: usize = 64;

/// Time-bounded, signature-verified validation requests keyed by identity.
///
/// Cheap to clone; clones share state. Outstanding expiry timers are aborted
/// when the last clone is dropped.
pub struct IdentityValidationRegistry<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for IdentityValidationRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<E> {
    engine: E,
    verifier: Arc<dyn SignatureVerifier>,
    clock: Arc<dyn Clock>,
    config: RegistryConfig,
    stripes: Box<[Mutex<()>]>,
    timers: ExpiryTimers,
}

impl<E: KeyValueEngine + 'static> IdentityValidationRegistry<E> {
    /// Create a registry over `engine`, which it owns exclusively.
    pub fn new(
        engine: E,
        verifier: Arc<dyn SignatureVerifier>,
        clock: Arc<dyn Clock>,
        config: RegistryConfig,
    ) -> Self {
        let stripes = (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect();
        Self {
            inner: Arc::new(Inner {
                engine,
                verifier,
                clock,
                config,
                stripes,
                timers: ExpiryTimers::default(),
            }),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// The backing engine.
    pub fn engine(&self) -> &E {
        &self.inner.engine
    }

    /// Number of expiry timers currently outstanding.
    pub fn scheduled_timers(&self) -> usize {
        self.inner.timers.len()
    }

    /// Open a validation request for `identity`, or return the live one.
    ///
    /// A fresh request gets the short window and an expiry timer. An
    /// existing request is returned as-is, with its remaining window.
    pub async fn request_validation(&self, identity: &str) -> Result<ValidationSnapshot> {
        let _guard = self.inner.lock(identity).await;
        let now = self.inner.clock.now_secs();

        if let Some(existing) = self.inner.load_live(identity, now).await? {
            debug!(
                identity = %identity,
                state = %existing.signature_state,
                "validation request already open"
            );
            return Ok(existing.snapshot(now));
        }

        let config = &self.inner.config;
        let request = ValidationRequest::new(
            identity,
            now,
            config.short_window_secs,
            &config.challenge_suffix,
        );
        self.inner.store(&request).await?;
        self.schedule_expiry(identity, config.short_window());

        info!(identity = %identity, window = config.short_window_secs, "validation requested");
        Ok(request.snapshot(now))
    }

    /// Check `signature` against the identity's challenge message.
    ///
    /// On success the request becomes `Valid` and its window restarts with
    /// the long window. On failure it becomes `Invalid` and keeps its
    /// current window, so the requester can resubmit. A request that is
    /// already `Valid` is returned without verifying again.
    pub async fn submit_signature(
        &self,
        identity: &str,
        signature: &str,
    ) -> Result<ValidationOutcome> {
        let _guard = self.inner.lock(identity).await;
        let now = self.inner.clock.now_secs();

        let mut request = self
            .inner
            .load_live(identity, now)
            .await?
            .ok_or_else(|| Error::RequestNotFound {
                identity: identity.to_string(),
            })?;

        if request.is_registrable() {
            debug!(identity = %identity, "signature already verified");
            return Ok(request.outcome(now));
        }

        if self
            .inner
            .verifier
            .verify(&request.message, &request.identity, signature)
        {
            let config = &self.inner.config;
            self.inner.timers.cancel(identity);
            request.mark_valid(now, config.long_window_secs);
            self.inner.store(&request).await?;
            self.schedule_expiry(identity, config.long_window());
            info!(identity = %identity, window = config.long_window_secs, "identity verified");
        } else {
            request.mark_invalid();
            self.inner.store(&request).await?;
            warn!(
                identity = %identity,
                remaining = request.remaining_secs(now),
                "signature verification failed"
            );
        }

        Ok(request.outcome(now))
    }

    /// Return the identity's outcome if it may register a record.
    ///
    /// Fails with [`Error::NotValidated`] unless a live request with a
    /// verified signature exists. Does not modify the request.
    pub async fn consume_if_valid(&self, identity: &str) -> Result<ValidationOutcome> {
        let _guard = self.inner.lock(identity).await;
        self.inner.registrable(identity).await
    }

    /// Delete the identity's request and cancel its timer. Idempotent.
    pub async fn retire(&self, identity: &str) -> Result<()> {
        let _guard = self.inner.lock(identity).await;
        self.inner.retire_locked(identity).await
    }

    /// Consume a verified request: run `register`, then retire the request.
    ///
    /// The identity's stripe is held from the check until the request is
    /// retired, so while `register` runs the request cannot expire, be
    /// replaced by a new one, or be consumed a second time. `register` must
    /// not call back into this registry.
    ///
    /// Fails with [`Error::NotValidated`] without running `register` unless
    /// the identity holds a live, verified request. If `register` fails the
    /// request is left as it was. Once `register` succeeds its value is
    /// returned even if retiring fails.
    pub async fn consume_with<T, F, Fut>(&self, identity: &str, register: F) -> Result<T>
    where
        F: FnOnce(ValidationOutcome) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let _guard = self.inner.lock(identity).await;
        let outcome = self.inner.registrable(identity).await?;

        let value = register(outcome).await?;
        if let Err(e) = self.inner.retire_locked(identity).await {
            error!(
                identity = %identity,
                error = %e,
                "validation consumed but request not retired"
            );
        }
        Ok(value)
    }

    /// Restore expiry timers after a restart.
    ///
    /// Requests whose window has closed are deleted; every live request gets
    /// a timer for the rest of its window. Returns the number restored.
    pub async fn recover(&self) -> Result<usize> {
        let identities: Vec<String> = self
            .inner
            .engine
            .scan_all()
            .await?
            .into_iter()
            .map(|(key, _)| key)
            .collect();

        let mut restored = 0;
        for identity in identities {
            let _guard = self.inner.lock(&identity).await;
            let now = self.inner.clock.now_secs();
            if let Some(request) = self.inner.load_live(&identity, now).await? {
                let remaining = Duration::from_secs(request.remaining_secs(now));
                self.schedule_expiry(&identity, remaining);
                restored += 1;
            }
        }

        info!(restored, "validation registry recovered");
        Ok(restored)
    }

    /// Spawn the expiry timer for `identity`, replacing any existing one.
    ///
    /// Callers hold the identity's stripe, which the timer must also take
    /// before acting, so the timer is installed before it can fire.
    fn schedule_expiry(&self, identity: &str, delay: Duration) {
        let timers = &self.inner.timers;
        let generation = timers.next_generation();
        let inner: Weak<Inner<E>> = Arc::downgrade(&self.inner);
        let owned = identity.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = inner.upgrade() {
                inner.expire(&owned, generation).await;
            }
        });
        timers.install(identity, generation, handle);
    }
}

impl<E: KeyValueEngine> Inner<E> {
    async fn lock(&self, identity: &str) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        identity.hash(&mut hasher);
        let index = (hasher.finish() % self.stripes.len() as u64) as usize;
        self.stripes[index].lock().await
    }

    /// Load the identity's request, sweeping it if its window has closed.
    async fn load_live(&self, identity: &str, now: i64) -> Result<Option<ValidationRequest>> {
        let Some(bytes) = self.engine.get(identity).await? else {
            return Ok(None);
        };
        let request = ValidationRequest::from_bytes(&bytes)?;
        if request.is_expired(now) {
            self.timers.cancel(identity);
            self.engine.delete(identity).await?;
            info!(identity = %identity, "expired validation request swept");
            return Ok(None);
        }
        Ok(Some(request))
    }

    async fn registrable(&self, identity: &str) -> Result<ValidationOutcome> {
        let now = self.clock.now_secs();
        match self.load_live(identity, now).await? {
            Some(request) if request.is_registrable() => Ok(request.outcome(now)),
            _ => Err(Error::NotValidated {
                identity: identity.to_string(),
            }),
        }
    }

    async fn retire_locked(&self, identity: &str) -> Result<()> {
        self.timers.cancel(identity);

        if self.engine.get(identity).await?.is_none() {
            debug!(identity = %identity, "no validation request to retire");
            return Ok(());
        }
        self.engine.delete(identity).await?;
        info!(identity = %identity, "validation request retired");
        Ok(())
    }

    async fn store(&self, request: &ValidationRequest) -> Result<()> {
        self.engine
            .put(&request.identity, request.to_bytes()?)
            .await?;
        Ok(())
    }

    /// Timer body: delete the request if this timer is still the current one.
    async fn expire(&self, identity: &str, generation: u64) {
        let _guard = self.lock(identity).await;
        if !self.timers.finish(identity, generation) {
            debug!(identity = %identity, generation, "stale expiry timer ignored");
            return;
        }
        match self.engine.delete(identity).await {
            Ok(()) => info!(identity = %identity, "validation request expired"),
            Err(e) => error!(identity = %identity, error = %e, "failed to delete expired request"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TokioClock;
    use star_registry_core::SignatureState;
    use star_registry_store::MemoryEngine;

    const START: i64 = 1_532_296_090;

    fn registry() -> IdentityValidationRegistry<MemoryEngine> {
        let verifier = |_: &str, _: &str, signature: &str| signature == "good";
        IdentityValidationRegistry::new(
            MemoryEngine::new(),
            Arc::new(verifier),
            Arc::new(TokioClock::starting_at(START)),
            RegistryConfig::default(),
        )
    }

    /// Let spawned timer tasks run.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_creates_pending() {
        let registry = registry();
        let snapshot = registry.request_validation("addr1").await.unwrap();

        assert_eq!(snapshot.identity, "addr1");
        assert_eq!(snapshot.request_timestamp, START);
        assert_eq!(snapshot.message, format!("addr1:{}:starRegistry", START));
        assert_eq!(snapshot.validation_window, 300);
        assert_eq!(registry.scheduled_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_is_idempotent() {
        let registry = registry();
        let first = registry.request_validation("addr1").await.unwrap();

        tokio::time::advance(Duration::from_secs(40)).await;
        let second = registry.request_validation("addr1").await.unwrap();

        assert_eq!(first.message, second.message);
        assert_eq!(second.request_timestamp, first.request_timestamp);
        assert_eq!(second.validation_window, 260);
        assert_eq!(registry.scheduled_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_without_request() {
        let registry = registry();
        let err = registry.submit_signature("nobody", "good").await.unwrap_err();
        assert!(matches!(err, Error::RequestNotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_signature_extends_window() {
        let registry = registry();
        registry.request_validation("addr1").await.unwrap();

        tokio::time::advance(Duration::from_secs(290)).await;
        let outcome = registry.submit_signature("addr1", "good").await.unwrap();

        assert!(outcome.register_record);
        assert_eq!(outcome.status.signature_state, SignatureState::Valid);
        assert_eq!(outcome.status.request_timestamp, START + 290);
        assert_eq!(outcome.status.validation_window, 1800);
        assert_eq!(registry.scheduled_timers(), 1);

        // The short timer was cancelled; the request outlives it.
        tokio::time::advance(Duration::from_secs(20)).await;
        settle().await;
        assert!(registry.engine().get("addr1").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_signature_keeps_window() {
        let registry = registry();
        registry.request_validation("addr1").await.unwrap();

        tokio::time::advance(Duration::from_secs(100)).await;
        let outcome = registry.submit_signature("addr1", "bad").await.unwrap();

        assert!(!outcome.register_record);
        assert_eq!(outcome.status.signature_state, SignatureState::Invalid);
        assert_eq!(outcome.status.request_timestamp, START);
        assert_eq!(outcome.status.validation_window, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_is_not_reverified() {
        let registry = registry();
        registry.request_validation("addr1").await.unwrap();
        registry.submit_signature("addr1", "good").await.unwrap();

        tokio::time::advance(Duration::from_secs(60)).await;
        let outcome = registry.submit_signature("addr1", "bad").await.unwrap();
        assert_eq!(outcome.status.signature_state, SignatureState::Valid);
        assert_eq!(outcome.status.validation_window, 1740);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_timer_deletes_request() {
        let registry = registry();
        registry.request_validation("addr1").await.unwrap();

        tokio::time::advance(Duration::from_secs(300)).await;
        settle().await;

        assert!(registry.engine().get("addr1").await.unwrap().is_none());
        assert_eq!(registry.scheduled_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consume_requires_valid() {
        let registry = registry();
        let err = registry.consume_if_valid("addr1").await.unwrap_err();
        assert!(matches!(err, Error::NotValidated { .. }));

        registry.request_validation("addr1").await.unwrap();
        registry.submit_signature("addr1", "bad").await.unwrap();
        let err = registry.consume_if_valid("addr1").await.unwrap_err();
        assert!(matches!(err, Error::NotValidated { .. }));

        registry.submit_signature("addr1", "good").await.unwrap();
        let outcome = registry.consume_if_valid("addr1").await.unwrap();
        assert!(outcome.register_record);

        // Consuming does not retire.
        assert!(registry.consume_if_valid("addr1").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retire_is_idempotent() {
        let registry = registry();
        registry.request_validation("addr1").await.unwrap();

        registry.retire("addr1").await.unwrap();
        registry.retire("addr1").await.unwrap();

        assert_eq!(registry.scheduled_timers(), 0);
        assert!(matches!(
            registry.submit_signature("addr1", "good").await,
            Err(Error::RequestNotFound { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_consume_with_retires_after_register() {
        let registry = registry();
        registry.request_validation("addr1").await.unwrap();
        registry.submit_signature("addr1", "good").await.unwrap();

        let height = registry
            .consume_with("addr1", |outcome| async move {
                assert!(outcome.register_record);
                Ok(7)
            })
            .await
            .unwrap();

        assert_eq!(height, 7);
        assert_eq!(registry.scheduled_timers(), 0);
        assert!(registry.engine().get("addr1").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_consume_with_skips_unvalidated() {
        let registry = registry();
        registry.request_validation("addr1").await.unwrap();

        let mut ran = false;
        let err = registry
            .consume_with("addr1", |_| {
                ran = true;
                async { Ok(()) }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotValidated { .. }));
        assert!(!ran);
        assert_eq!(registry.scheduled_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consume_with_failure_keeps_request() {
        let registry = registry();
        registry.request_validation("addr1").await.unwrap();
        registry.submit_signature("addr1", "good").await.unwrap();

        let err = registry
            .consume_with("addr1", |_| async {
                Err::<(), _>(Error::RecordNotFound { height: 3 })
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RecordNotFound { height: 3 }));
        assert!(registry.consume_if_valid("addr1").await.is_ok());
        assert_eq!(registry.scheduled_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_waits_for_consume_with() {
        let registry = registry();
        registry.request_validation("addr1").await.unwrap();
        registry.submit_signature("addr1", "good").await.unwrap();

        // The long window closes while register is still running.
        registry
            .consume_with("addr1", |_| async {
                tokio::time::sleep(Duration::from_secs(1900)).await;
                Ok(())
            })
            .await
            .unwrap();
        settle().await;
        assert_eq!(registry.scheduled_timers(), 0);

        // The woken timer was aborted and cannot touch the next request.
        let fresh = registry.request_validation("addr1").await.unwrap();
        assert_eq!(fresh.validation_window, 300);
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(registry.scheduled_timers(), 1);
        assert!(registry.engine().get("addr1").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lazy_sweep_without_timer() {
        let registry = registry();
        let request = ValidationRequest::new("addr1", START - 400, 300, "starRegistry");
        registry
            .engine()
            .put("addr1", request.to_bytes().unwrap())
            .await
            .unwrap();

        assert!(matches!(
            registry.submit_signature("addr1", "good").await,
            Err(Error::RequestNotFound { .. })
        ));
        assert!(registry.engine().get("addr1").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_registry_aborts_timers() {
        let engine = Arc::new(MemoryEngine::new());
        let registry = IdentityValidationRegistry::new(
            Arc::clone(&engine),
            Arc::new(|_: &str, _: &str, _: &str| true),
            Arc::new(TokioClock::starting_at(START)),
            RegistryConfig::default(),
        );
        registry.request_validation("addr1").await.unwrap();
        drop(registry);

        tokio::time::advance(Duration::from_secs(600)).await;
        settle().await;

        // Nothing fired; the stale entry is left for recovery to sweep.
        assert!(engine.get("addr1").await.unwrap().is_some());
    }
}
