//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use star_registry::{Config, RegistrationOrchestrator, Result, TokioClock};
use star_registry_core::{
    Ed25519Verifier, Keypair, Record, SignatureVerifier, StarPayload, ValidationOutcome,
    ValidationSnapshot,
};
use star_registry_store::MemoryEngine;

/// Epoch second the fixture clocks start at (2018-07-22T21:48:10Z).
pub const FIXTURE_EPOCH: i64 = 1_532_296_090;

/// A service wired entirely to in-memory engines.
pub type MemoryService = RegistrationOrchestrator<MemoryEngine, MemoryEngine>;

/// A wallet that can sign registry challenges.
#[derive(Debug, Clone)]
pub struct Wallet {
    pub keypair: Keypair,
}

impl Wallet {
    /// A wallet with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// A wallet with a deterministic keypair.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
        }
    }

    /// The identity this wallet proves control of.
    pub fn identity(&self) -> String {
        self.keypair.identity()
    }

    /// Hex signature over `message`.
    pub fn sign(&self, message: &str) -> String {
        self.keypair.sign(message.as_bytes()).to_hex()
    }

    /// Hex signature over the challenge in `snapshot`.
    pub fn sign_challenge(&self, snapshot: &ValidationSnapshot) -> String {
        self.sign(&snapshot.message)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic wallets with distinct keys.
pub fn wallets(count: usize) -> Vec<Wallet> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            Wallet::with_seed(seed)
        })
        .collect()
}

/// A verifier that accepts only signatures it was told about, and counts calls.
#[derive(Debug, Default)]
pub struct ScriptedVerifier {
    accepted: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl ScriptedVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `signature` for any identity and message from now on.
    pub fn accept(&self, signature: &str) {
        self.accepted
            .lock()
            .unwrap()
            .insert(signature.to_string());
    }

    /// Number of verifications performed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SignatureVerifier for ScriptedVerifier {
    fn verify(&self, _message: &str, _identity: &str, signature: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.accepted.lock().unwrap().contains(signature)
    }
}

/// A wired service plus a wallet to drive it.
pub struct TestFixture {
    pub service: MemoryService,
    pub wallet: Wallet,
}

impl TestFixture {
    /// Default configuration, Ed25519 verification, a tokio-driven clock
    /// starting at [`FIXTURE_EPOCH`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_verifier(config, Arc::new(Ed25519Verifier))
    }

    pub fn with_verifier(config: Config, verifier: Arc<dyn SignatureVerifier>) -> Self {
        let service = RegistrationOrchestrator::from_config(
            config,
            MemoryEngine::new(),
            MemoryEngine::new(),
            verifier,
            Arc::new(TokioClock::starting_at(FIXTURE_EPOCH)),
        )
        .unwrap();
        Self {
            service,
            wallet: Wallet::new(),
        }
    }

    pub fn identity(&self) -> String {
        self.wallet.identity()
    }

    /// Request validation and submit a correct signature.
    pub async fn validate(&self) -> Result<ValidationOutcome> {
        let identity = self.identity();
        let snapshot = self.service.request_validation(&identity).await?;
        let signature = self.wallet.sign_challenge(&snapshot);
        self.service.submit_signature(&identity, &signature).await
    }

    /// Validate and register `payload`.
    pub async fn register(&self, payload: &StarPayload) -> Result<Record> {
        self.validate().await?;
        self.service.submit_record(&self.identity(), payload).await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
