//! Production cryptography engine.
//!
//! Bridges the core's [`CryptoEngine`] capability contract onto the pure
//! sealed-box primitives: the engine's only job is to feed them entropy
//! from the environment and translate their errors.

use async_trait::async_trait;
use courier_core::{CryptoEngine, EngineError, env::Environment};
use courier_crypto::{CryptoError, SEAL_SEED_LEN, seal_armored};

/// Sealed-box engine drawing randomness from the injected environment.
#[derive(Clone)]
pub struct SealedBoxEngine<E> {
    env: E,
}

impl<E: Environment> SealedBoxEngine<E> {
    /// Create an engine over the environment.
    pub fn new(env: E) -> Self {
        Self { env }
    }
}

#[async_trait]
impl<E: Environment> CryptoEngine for SealedBoxEngine<E> {
    async fn encrypt(&self, public_key: &str, plaintext: &str) -> Result<String, EngineError> {
        let mut seed = [0u8; SEAL_SEED_LEN];
        self.env.random_bytes(&mut seed);

        seal_armored(public_key, plaintext, &seed).map_err(|err| match err {
            CryptoError::InvalidArmor(_) | CryptoError::InvalidKey(_) => {
                EngineError::MalformedKey { reason: err.to_string() }
            },
            _ => EngineError::SealFailed { reason: err.to_string() },
        })
    }
}

impl<E> std::fmt::Debug for SealedBoxEngine<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedBoxEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use courier_crypto::{KEY_LEN, armor, derive_keypair, open_armored};

    use super::*;
    use crate::system_env::SystemEnv;

    #[tokio::test]
    async fn seals_to_the_given_key() {
        let engine = SealedBoxEngine::new(SystemEnv::new());
        let (secret, public) = derive_keypair(&[7u8; KEY_LEN]);

        let sealed = engine.encrypt(&armor(public.as_bytes()), "0011aabb").await.expect("seal");
        let opened = open_armored(&secret, &sealed).expect("open");
        assert_eq!(opened, "0011aabb");
    }

    #[tokio::test]
    async fn rejects_malformed_key() {
        let engine = SealedBoxEngine::new(SystemEnv::new());

        let result = engine.encrypt("not!base64!", "0011aabb").await;
        assert!(matches!(result, Err(EngineError::MalformedKey { .. })));
    }
}
