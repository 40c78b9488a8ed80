//! Capability contract for the external asymmetric cryptography engine.
//!
//! The relay never performs public-key cryptography itself; it hands a
//! plaintext token and a principal's armored public key to an engine and
//! treats the returned ciphertext as opaque. Encryption is the only
//! operation the core ever suspends on.

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a cryptography engine.
///
/// Engine failures are 500-class and never retried automatically; the
/// caller resubmits the original request.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The supplied public-key material could not be parsed.
    #[error("malformed public key: {reason}")]
    MalformedKey {
        /// What was wrong with the material.
        reason: String,
    },

    /// Sealing the plaintext failed.
    #[error("sealing failed: {reason}")]
    SealFailed {
        /// Description of the failure.
        reason: String,
    },
}

/// Seals plaintext tokens so only the intended key-holder can recover them.
#[async_trait]
pub trait CryptoEngine: Send + Sync + 'static {
    /// Encrypt `plaintext` under the armored `public_key`, returning an
    /// armored ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the key is malformed or sealing fails.
    async fn encrypt(&self, public_key: &str, plaintext: &str) -> Result<String, EngineError>;
}
