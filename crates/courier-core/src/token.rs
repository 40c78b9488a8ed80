//! Collision-free token minting.
//!
//! Tokens double as one-time challenges and rotating message handles, so
//! two guarantees matter: unguessability (128-bit strength from OS
//! entropy) and global uniqueness across both record collections at any
//! instant. Uniqueness is checked against the store rather than assumed;
//! the retry loop is bounded so the theoretically-infinite control path of
//! an unbounded mint-and-check cannot exist.

use sha2::{Digest, Sha256};

use crate::{env::Environment, error::RelayError, store::Store};

/// Length of a minted token in hex characters (128 bits).
pub const TOKEN_LEN: usize = 32;

/// Default bound on mint-and-check attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

/// Mints opaque tokens that do not collide with any pending challenge or
/// message handle currently in the store.
#[derive(Debug, Clone)]
pub struct TokenMinter {
    max_attempts: u32,
}

impl Default for TokenMinter {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS }
    }
}

impl TokenMinter {
    /// Create a minter with a custom retry bound.
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts: max_attempts.max(1) }
    }

    /// Mint a fresh token.
    ///
    /// Each attempt digests 16 bytes of entropy together with the current
    /// wall-clock milliseconds and keeps the first 16 digest bytes as
    /// lowercase hex. Collisions retry internally and never surface to
    /// callers.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::EntropyExhausted`] if every attempt collided.
    /// Expected unreachable in practice.
    pub fn mint<E, S>(&self, env: &E, store: &S) -> Result<String, RelayError>
    where
        E: Environment,
        S: Store + ?Sized,
    {
        for attempt in 0..self.max_attempts {
            let mut salt = [0u8; 16];
            env.random_bytes(&mut salt);

            let mut hasher = Sha256::new();
            hasher.update(salt);
            hasher.update(env.unix_millis().to_be_bytes());
            let digest = hasher.finalize();

            let token = hex::encode(&digest[..TOKEN_LEN / 2]);

            if store.token_in_use(&token) {
                tracing::warn!(attempt, "minted token collided, retrying");
                continue;
            }
            return Ok(token);
        }

        Err(RelayError::EntropyExhausted { attempts: self.max_attempts })
    }
}
