//! Local key-holder identity.

use courier_crypto::{KEY_LEN, PublicKey, StaticSecret, armor, derive_keypair, open_armored};

use crate::error::ClientError;

/// An X25519 identity held by a principal.
///
/// The secret half never leaves this struct; the relay only ever receives
/// the armored public half. Proving identity means opening a sealed
/// challenge and handing the plaintext token back.
pub struct Identity {
    secret: StaticSecret,
    public: PublicKey,
}

impl Identity {
    /// Derive an identity from 32 bytes of entropy.
    ///
    /// The caller owns randomness (OS entropy in production, a seeded RNG
    /// in tests), mirroring the pure-function discipline of the crypto
    /// crate.
    pub fn from_seed(seed: [u8; KEY_LEN]) -> Self {
        let (secret, public) = derive_keypair(&seed);
        Self { secret, public }
    }

    /// Derive an identity from a seed slice.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidSeed`] for any length other than 32.
    pub fn from_seed_slice(seed: &[u8]) -> Result<Self, ClientError> {
        let seed: [u8; KEY_LEN] = seed
            .try_into()
            .map_err(|_| ClientError::InvalidSeed { expected: KEY_LEN, actual: seed.len() })?;
        Ok(Self::from_seed(seed))
    }

    /// The armored public key to register with the relay.
    pub fn armored_public_key(&self) -> String {
        armor(self.public.as_bytes())
    }

    /// Open a sealed challenge and return the plaintext token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Open`] if the ciphertext was not sealed for
    /// this identity or has been tampered with.
    pub fn decrypt_challenge(&self, sealed: &str) -> Result<String, ClientError> {
        Ok(open_armored(&self.secret, sealed)?)
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("public_key", &self.armored_public_key())
            .finish_non_exhaustive()
    }
}
