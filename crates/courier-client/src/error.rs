//! Client error types.

use courier_crypto::CryptoError;
use thiserror::Error;

/// Errors from client-side protocol operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The sealed challenge could not be opened with this identity's
    /// secret.
    #[error("challenge cannot be opened: {0}")]
    Open(#[from] CryptoError),

    /// Identity seed material had the wrong length.
    #[error("invalid identity seed: expected {expected} bytes, got {actual}")]
    InvalidSeed {
        /// Required seed length.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
}

impl ClientError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// An undecryptable challenge usually means the ciphertext was sealed
    /// for a different key; retrying with the same identity cannot
    /// succeed.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Open(_) | Self::InvalidSeed { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_failure_is_fatal() {
        let err = ClientError::Open(CryptoError::OpenFailed);
        assert!(err.is_fatal());
    }

    #[test]
    fn error_display() {
        let err = ClientError::InvalidSeed { expected: 32, actual: 16 };
        assert_eq!(err.to_string(), "invalid identity seed: expected 32 bytes, got 16");
    }
}
