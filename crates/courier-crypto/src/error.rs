//! Crypto error types.

use thiserror::Error;

/// Errors from sealing and opening operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Armored input was not valid base64.
    #[error("invalid armor: {0}")]
    InvalidArmor(#[from] base64::DecodeError),

    /// Key material had the wrong length or was otherwise unusable.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// AEAD encryption failed.
    #[error("sealing failed")]
    SealFailed,

    /// AEAD decryption failed: wrong key, truncated wire bytes, or a
    /// tampered ciphertext.
    #[error("opening failed")]
    OpenFailed,

    /// Opened plaintext was not valid UTF-8.
    #[error("opened plaintext is not valid UTF-8")]
    NotUtf8,
}
