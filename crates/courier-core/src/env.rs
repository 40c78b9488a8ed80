//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples protocol logic from system resources
//! (wall-clock time, randomness, async sleeping). This enables:
//!
//! - Deterministic tests: a seeded RNG and a virtual clock reproduce token
//!   values and sweep behavior exactly.
//!
//! - Production runtime: the server's implementation uses OS entropy and
//!   real time without any code changes to the protocol logic.
//!
//! # Invariants
//!
//! - Monotonicity: `unix_millis()` must never go backwards
//! - Isolation: implementations must not share global state

use std::time::Duration;

/// Abstract environment providing time, randomness, and async sleeping.
///
/// Every component that mints tokens or stamps records receives an
/// `Environment` by constructor injection, never reaching for globals.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// 1. Time monotonicity: `unix_millis()` never decreases within a single
///    execution context
/// 2. RNG quality: `random_bytes()` uses cryptographically secure entropy
///    in production
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns milliseconds since the Unix epoch.
    ///
    /// Mixed into token digests as a high-resolution timestamp and used to
    /// stamp message records for the garbage-collection sweep.
    fn unix_millis(&self) -> u64;

    /// Sleeps for the specified duration.
    ///
    /// This is the ONLY async method in the trait, and it should only be
    /// used by shell code (the sweep scheduler), never by protocol logic.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Security
    ///
    /// Production implementations MUST use OS-level entropy
    /// (`getrandom`). Test implementations use a seeded RNG so minted
    /// tokens are reproducible.
    fn random_bytes(&self, buffer: &mut [u8]);
}
