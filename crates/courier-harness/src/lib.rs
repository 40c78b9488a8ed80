//! Test harness for the courier workspace.
//!
//! Provides a deterministic [`TestEnv`] (seeded ChaCha20 RNG plus a
//! virtual wall-clock), a fault-injecting [`FlakyEngine`], and relay
//! fixtures. Scenario tests live in this crate's `tests/` directory and
//! exercise the protocol across crates with real sealed-box cryptography.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU32, AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use courier_core::{CryptoEngine, EngineError, MemoryStore, Relay, env::Environment};
use courier_server::SealedBoxEngine;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Deterministic environment: seeded RNG and a manually advanced clock.
///
/// The same seed reproduces every minted token, sealing seed, and sweep
/// decision, so scenario failures replay exactly.
#[derive(Clone)]
pub struct TestEnv {
    rng: Arc<Mutex<ChaCha20Rng>>,
    clock: Arc<AtomicU64>,
}

impl TestEnv {
    /// Create an environment from an RNG seed, starting the clock at zero.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
            clock: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Advance the virtual wall-clock.
    pub fn advance(&self, millis: u64) {
        self.clock.fetch_add(millis, Ordering::SeqCst);
    }

    /// Draw a fixed-size seed from the deterministic RNG (identity seeds,
    /// sealing seeds).
    pub fn seed_bytes<const N: usize>(&self) -> [u8; N] {
        let mut bytes = [0u8; N];
        self.random_bytes(&mut bytes);
        bytes
    }
}

impl Environment for TestEnv {
    fn unix_millis(&self) -> u64 {
        self.clock.load(Ordering::SeqCst)
    }

    fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        // Virtual time: sleeping is a no-op, tests advance the clock
        // explicitly.
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(buffer);
    }
}

/// Engine wrapper that fails a requested number of upcoming calls.
///
/// Stands in for a cryptography engine hitting malformed keys or internal
/// faults, without any nondeterminism.
pub struct FlakyEngine<C> {
    inner: C,
    failures: Arc<AtomicU32>,
}

impl<C> FlakyEngine<C> {
    /// Wrap an engine; the shared counter arms failures.
    pub fn new(inner: C, failures: Arc<AtomicU32>) -> Self {
        Self { inner, failures }
    }
}

#[async_trait]
impl<C: CryptoEngine> CryptoEngine for FlakyEngine<C> {
    async fn encrypt(&self, public_key: &str, plaintext: &str) -> Result<String, EngineError> {
        let armed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            return Err(EngineError::SealFailed { reason: "injected fault".to_string() });
        }
        self.inner.encrypt(public_key, plaintext).await
    }
}

/// A relay over the deterministic environment with a real sealed-box
/// engine.
pub type TestRelay = Relay<TestEnv, MemoryStore, SealedBoxEngine<TestEnv>>;

/// A relay whose engine fails on demand.
pub type FlakyRelay = Relay<TestEnv, MemoryStore, FlakyEngine<SealedBoxEngine<TestEnv>>>;

/// Build a deterministic relay fixture.
pub fn test_relay(seed: u64) -> (TestEnv, TestRelay) {
    let env = TestEnv::new(seed);
    let engine = SealedBoxEngine::new(env.clone());
    let relay = Relay::new(env.clone(), MemoryStore::new(), engine);
    (env, relay)
}

/// Build a relay fixture whose engine fails as many upcoming calls as the
/// returned counter is set to.
pub fn flaky_relay(seed: u64) -> (TestEnv, Arc<AtomicU32>, FlakyRelay) {
    let env = TestEnv::new(seed);
    let failures = Arc::new(AtomicU32::new(0));
    let engine = FlakyEngine::new(SealedBoxEngine::new(env.clone()), Arc::clone(&failures));
    let relay = Relay::new(env.clone(), MemoryStore::new(), engine);
    (env, failures, relay)
}
