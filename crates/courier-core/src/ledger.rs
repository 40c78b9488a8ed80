//! Message ledger.
//!
//! Owns message records and drives the delivery state machine
//! (`Queued → Deliverable → Collected`). Like the registry, the ledger is
//! a view over the injected store; state transitions and token rotations
//! are single atomic store operations, so concurrent retrievals of the
//! same message cannot interleave a stale read with a write.

use std::{sync::Arc, time::Duration};

use crate::{
    env::Environment,
    error::RelayError,
    message::{Message, MessageDraft, MessageId},
    store::Store,
    token::TokenMinter,
};

/// Ledger of messages keyed by their rotating token.
pub struct MessageLedger<S> {
    store: Arc<S>,
}

impl<S: Store> MessageLedger<S> {
    /// Create a ledger over the shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Queue a new message with a freshly minted send-confirmation token.
    ///
    /// Caller is responsible for having validated that both principals
    /// exist.
    pub fn queue<E: Environment>(
        &self,
        env: &E,
        minter: &TokenMinter,
        sender: &str,
        receiver: &str,
        body: &str,
    ) -> Result<Message, RelayError> {
        let token = minter.mint(env, self.store.as_ref())?;
        let message = self.store.insert_message(MessageDraft {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            body: body.to_string(),
            token,
            created_at: env.unix_millis(),
        });
        tracing::debug!(id = message.id, sender, receiver, "queued message");
        Ok(message)
    }

    /// Confirm authorship of a queued message by its decrypted token,
    /// making it deliverable.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnmatchedToken`] if no queued message holds
    /// the token (unknown value, or the message already progressed).
    pub fn confirm_send(&self, decrypted: &str) -> Result<MessageId, RelayError> {
        let id = self.store.promote_queued(decrypted).ok_or(RelayError::UnmatchedToken)?;
        tracing::debug!(id, "message confirmed deliverable");
        Ok(id)
    }

    /// Rotate the token of every deliverable message addressed to
    /// `receiver`, returning the messages with their fresh tokens.
    ///
    /// Each rotation commits before this method returns; a previously
    /// issued retrieval ciphertext for any of these messages is invalid
    /// from that point on, whatever happens to the encryptions that
    /// follow.
    pub fn rotate_deliverable<E: Environment>(
        &self,
        env: &E,
        minter: &TokenMinter,
        receiver: &str,
    ) -> Result<Vec<Message>, RelayError> {
        let mut rotated = Vec::new();

        for mut message in self.store.deliverable_for(receiver) {
            let token = minter.mint(env, self.store.as_ref())?;
            self.store.rotate_token(message.id, &token)?;
            message.token = token;
            rotated.push(message);
        }

        tracing::debug!(receiver, count = rotated.len(), "rotated deliverable tokens");
        Ok(rotated)
    }

    /// Confirm collection of a deliverable message by its current
    /// decrypted token; the message becomes `Collected` and eligible for
    /// the sweep.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnmatchedToken`] for a stale (pre-rotation)
    /// or unknown token.
    pub fn confirm_collect<E: Environment>(
        &self,
        env: &E,
        decrypted: &str,
    ) -> Result<MessageId, RelayError> {
        let id = self
            .store
            .collect(decrypted, env.unix_millis())
            .ok_or(RelayError::UnmatchedToken)?;
        tracing::debug!(id, "message collected");
        Ok(id)
    }

    /// Remove collected messages older than `grace`. Returns how many
    /// were removed.
    pub fn sweep<E: Environment>(&self, env: &E, grace: Duration) -> usize {
        let removed = self.store.sweep_collected(env.unix_millis(), grace);
        if removed > 0 {
            tracing::info!(removed, "swept collected messages");
        }
        removed
    }
}

impl<S> std::fmt::Debug for MessageLedger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageLedger").finish_non_exhaustive()
    }
}
