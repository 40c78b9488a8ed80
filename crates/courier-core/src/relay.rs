//! Challenge-response protocol orchestrator.
//!
//! `Relay` wires the registry, ledger, and token minter to the injected
//! store and cryptography engine, and exposes one method per façade call.
//! Protocol logic never performs I/O of its own; the only suspension
//! points are encryption calls out to the engine.

use std::{sync::Arc, time::Duration};

use futures::future::try_join_all;

use crate::{
    crypto::CryptoEngine,
    env::Environment,
    error::RelayError,
    ledger::MessageLedger,
    principal::Principal,
    registry::PrincipalRegistry,
    store::Store,
    token::TokenMinter,
};

/// One entry of a retrieval result.
///
/// Carries everything the receiver needs and nothing the relay keeps
/// internal: no message id, no state flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Name of the sending principal.
    pub sender: String,
    /// The opaque message payload.
    pub body: String,
    /// The rotated collection token, sealed under the receiver's key.
    pub encrypted_challenge: String,
}

/// The store-and-forward relay.
///
/// Dependencies are constructor-injected so tests can substitute a seeded
/// environment, an in-memory store, or a failing engine without touching
/// protocol code.
pub struct Relay<E, S, C> {
    env: E,
    engine: Arc<C>,
    minter: TokenMinter,
    registry: PrincipalRegistry<S>,
    ledger: MessageLedger<S>,
    store: Arc<S>,
}

impl<E, S, C> Relay<E, S, C>
where
    E: Environment,
    S: Store,
    C: CryptoEngine,
{
    /// Create a relay with the default mint retry bound.
    pub fn new(env: E, store: S, engine: C) -> Self {
        Self::with_minter(env, store, engine, TokenMinter::default())
    }

    /// Create a relay with a custom token minter.
    pub fn with_minter(env: E, store: S, engine: C, minter: TokenMinter) -> Self {
        let store = Arc::new(store);
        Self {
            env,
            engine: Arc::new(engine),
            minter,
            registry: PrincipalRegistry::new(Arc::clone(&store)),
            ledger: MessageLedger::new(Arc::clone(&store)),
            store,
        }
    }

    /// The shared store (read-only use: health reporting, tests).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register `name` and return its first challenge sealed under
    /// `public_key`.
    ///
    /// Serves as signup and login initiation in one: proving ability to
    /// decrypt the returned ciphertext proves control of the private key.
    /// For an already-registered name this is a conflict; the existing
    /// challenge is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NameTaken`] for an existing name and
    /// [`RelayError::Encryption`] if the engine rejects the key.
    pub async fn enter(&self, name: &str, public_key: &str) -> Result<String, RelayError> {
        let (principal, challenge) =
            self.registry.register(&self.env, &self.minter, name, public_key)?;
        let sealed = self.engine.encrypt(&principal.public_key, &challenge).await?;
        Ok(sealed)
    }

    /// Verify a decrypted challenge, consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnmatchedToken`] if no pending challenge
    /// matches.
    pub fn verify(&self, decrypted: &str) -> Result<(), RelayError> {
        let principal = self.registry.resolve_challenge(decrypted)?;
        tracing::info!(name = %principal.name, "challenge verified");
        Ok(())
    }

    /// Look up a principal's public key by name.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnknownPrincipal`] when absent.
    pub fn public_key(&self, name: &str) -> Result<Principal, RelayError> {
        self.registry.lookup(name)
    }

    /// Queue a message and return its send-confirmation token sealed under
    /// the **sender's** key.
    ///
    /// Only the sender's key-holder can decrypt the token and confirm the
    /// send, so knowing a username is not enough to inject messages
    /// attributed to it.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnknownPrincipals`] naming every missing
    /// principal, or [`RelayError::Encryption`] on engine failure (the
    /// queued record remains; its token was never revealed, so it can
    /// never be confirmed).
    pub async fn send(
        &self,
        sender: &str,
        receiver: &str,
        body: &str,
    ) -> Result<String, RelayError> {
        let sender_record = self.store.principal_by_name(sender);
        let receiver_record = self.store.principal_by_name(receiver);

        let mut missing = Vec::new();
        if sender_record.is_none() {
            missing.push(sender.to_string());
        }
        if receiver_record.is_none() {
            missing.push(receiver.to_string());
        }
        let (Some(sender_record), Some(_)) = (sender_record, receiver_record) else {
            return Err(RelayError::UnknownPrincipals { names: missing });
        };

        let message = self.ledger.queue(&self.env, &self.minter, sender, receiver, body)?;
        let sealed = self.engine.encrypt(&sender_record.public_key, &message.token).await?;
        Ok(sealed)
    }

    /// Confirm authorship of a queued message by its decrypted token.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnmatchedToken`] if no queued message holds
    /// the token.
    pub fn confirm_send(&self, decrypted: &str) -> Result<(), RelayError> {
        self.ledger.confirm_send(decrypted)?;
        Ok(())
    }

    /// Deliver every deliverable message addressed to `receiver`.
    ///
    /// Tokens rotate (and commit) first, one atomic store operation per
    /// message; then all fresh tokens are sealed under the receiver's key
    /// concurrently. If any encryption fails the whole retrieval fails and
    /// the committed rotations stand: a retry seals against the current
    /// tokens, so a lost ciphertext is always recoverable by calling
    /// again.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnknownPrincipal`] for an unregistered
    /// receiver, or [`RelayError::Encryption`] if any seal fails.
    pub async fn retrieve(&self, receiver: &str) -> Result<Vec<Delivery>, RelayError> {
        let receiver_record = self.registry.lookup(receiver)?;

        let rotated = self.ledger.rotate_deliverable(&self.env, &self.minter, receiver)?;

        let seals = rotated
            .iter()
            .map(|message| self.engine.encrypt(&receiver_record.public_key, &message.token));
        let ciphertexts = try_join_all(seals).await?;

        Ok(rotated
            .into_iter()
            .zip(ciphertexts)
            .map(|(message, encrypted_challenge)| Delivery {
                sender: message.sender,
                body: message.body,
                encrypted_challenge,
            })
            .collect())
    }

    /// Confirm collection of one message by its current decrypted token.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnmatchedToken`] for a stale or unknown
    /// token.
    pub fn confirm_collect(&self, decrypted: &str) -> Result<(), RelayError> {
        self.ledger.confirm_collect(&self.env, decrypted)?;
        Ok(())
    }

    /// Confirm collection for a batch of decrypted tokens.
    ///
    /// Tokens are confirmed independently: matched messages transition to
    /// `Collected` and stay there even when other entries fail.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnmatchedTokens`] counting the entries that
    /// matched nothing.
    pub fn confirm_collect_all(&self, decrypted: &[String]) -> Result<(), RelayError> {
        let mut unmatched = 0;
        for token in decrypted {
            if self.ledger.confirm_collect(&self.env, token).is_err() {
                unmatched += 1;
            }
        }
        if unmatched > 0 {
            return Err(RelayError::UnmatchedTokens { unmatched });
        }
        Ok(())
    }

    /// Remove collected messages older than `grace`.
    pub fn sweep(&self, grace: Duration) -> usize {
        self.ledger.sweep(&self.env, grace)
    }
}

impl<E, S, C> std::fmt::Debug for Relay<E, S, C>
where
    S: Store,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("principals", &self.store.principal_count())
            .field("messages", &self.store.message_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{crypto::EngineError, store::MemoryStore};

    #[derive(Clone, Default)]
    struct SeqEnv {
        counter: Arc<Mutex<u64>>,
    }

    impl Environment for SeqEnv {
        fn unix_millis(&self) -> u64 {
            *self.counter.lock().unwrap()
        }

        fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            std::future::ready(())
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            let mut counter = self.counter.lock().unwrap();
            *counter += 1;
            let bytes = counter.to_be_bytes();
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = bytes[i % bytes.len()];
            }
        }
    }

    // Transparent "engine": prefixes the plaintext so tests can recover
    // the token without real cryptography.
    struct EchoEngine;

    #[async_trait]
    impl CryptoEngine for EchoEngine {
        async fn encrypt(&self, public_key: &str, plaintext: &str) -> Result<String, EngineError> {
            Ok(format!("sealed[{public_key}]:{plaintext}"))
        }
    }

    fn unseal(ciphertext: &str) -> &str {
        ciphertext.rsplit(':').next().unwrap()
    }

    fn relay() -> Relay<SeqEnv, MemoryStore, EchoEngine> {
        Relay::new(SeqEnv::default(), MemoryStore::new(), EchoEngine)
    }

    #[tokio::test]
    async fn enter_seals_challenge_under_own_key() {
        let relay = relay();

        let sealed = relay.enter("alice", "PK_A").await.unwrap();
        assert!(sealed.starts_with("sealed[PK_A]:"));

        relay.verify(unseal(&sealed)).unwrap();
    }

    #[tokio::test]
    async fn enter_existing_name_conflicts_without_rotating() {
        let relay = relay();
        relay.enter("alice", "PK_A").await.unwrap();
        let before = relay.store().principal_by_name("alice").unwrap().pending_challenge;

        let result = relay.enter("alice", "PK_B").await;
        assert!(matches!(result, Err(RelayError::NameTaken { .. })));

        let after = relay.store().principal_by_name("alice").unwrap().pending_challenge;
        assert_eq!(before, after, "existing challenge must be left untouched");
    }

    #[tokio::test]
    async fn send_names_every_missing_principal() {
        let relay = relay();
        relay.enter("bob", "PK_B").await.unwrap();

        let err = relay.send("ghost", "bob", "x").await.unwrap_err();
        assert_eq!(err.to_string(), "principal does not exist: 'ghost'");

        let err = relay.send("ghost", "wraith", "x").await.unwrap_err();
        assert_eq!(err.to_string(), "principals do not exist: 'ghost' and 'wraith'");
    }

    #[tokio::test]
    async fn unconfirmed_send_is_not_retrievable() {
        let relay = relay();
        relay.enter("alice", "PK_A").await.unwrap();
        relay.enter("bob", "PK_B").await.unwrap();

        relay.send("alice", "bob", "hi").await.unwrap();

        let deliveries = relay.retrieve("bob").await.unwrap();
        assert!(deliveries.is_empty(), "send without confirm must stay invisible");
    }

    #[tokio::test]
    async fn full_round_trip() {
        let relay = relay();
        relay.enter("alice", "PK_A").await.unwrap();
        relay.enter("bob", "PK_B").await.unwrap();

        let sealed_send = relay.send("alice", "bob", "hi").await.unwrap();
        relay.confirm_send(unseal(&sealed_send)).unwrap();

        let deliveries = relay.retrieve("bob").await.unwrap();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].sender, "alice");
        assert_eq!(deliveries[0].body, "hi");
        assert!(deliveries[0].encrypted_challenge.starts_with("sealed[PK_B]:"));

        relay.confirm_collect(unseal(&deliveries[0].encrypted_challenge)).unwrap();

        let after = relay.retrieve("bob").await.unwrap();
        assert!(after.is_empty());
    }

    #[tokio::test]
    async fn batch_collect_reports_unmatched_but_keeps_matches() {
        let relay = relay();
        relay.enter("alice", "PK_A").await.unwrap();
        relay.enter("bob", "PK_B").await.unwrap();

        let sealed = relay.send("alice", "bob", "hi").await.unwrap();
        relay.confirm_send(unseal(&sealed)).unwrap();
        let deliveries = relay.retrieve("bob").await.unwrap();

        let good = unseal(&deliveries[0].encrypted_challenge).to_string();
        let result = relay.confirm_collect_all(&[good, "bogus".to_string()]);
        assert!(matches!(result, Err(RelayError::UnmatchedTokens { unmatched: 1 })));

        // The matched message was collected despite the batch error.
        let after = relay.retrieve("bob").await.unwrap();
        assert!(after.is_empty());
    }
}
