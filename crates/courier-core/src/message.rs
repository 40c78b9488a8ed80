//! Message records and the delivery state machine.

use serde::{Deserialize, Serialize};

/// Internal stable identifier for a message. Never exposed externally.
pub type MessageId = u64;

/// Delivery state of a stored message.
///
/// ```text
/// Queued ──confirm_send──▶ Deliverable ──confirm_collect──▶ Collected
///                              │  ▲
///                              └──┘ retrieve (token rotates, state holds)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryState {
    /// Created by a send request; sender's authorship not yet confirmed.
    Queued,
    /// Authorship confirmed; awaiting receiver collection.
    Deliverable,
    /// Terminal; eligible for sweep removal after the grace period.
    Collected,
}

/// A stored message.
///
/// `token` is the current externally-visible handle: the sender's
/// send-confirmation challenge while `Queued`, the receiver's retrieval
/// handle once `Deliverable`. It rotates on every retrieval so a cached
/// ciphertext cannot be replayed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Internal identifier, assigned by the store.
    pub id: MessageId,
    /// Sending principal's name (by-name relation, not a live reference).
    pub sender: String,
    /// Receiving principal's name.
    pub receiver: String,
    /// Opaque payload, stored verbatim, never inspected.
    pub body: String,
    /// Current one-shot handle; globally unique across the store.
    pub token: String,
    /// Position in the delivery state machine.
    pub state: DeliveryState,
    /// Unix-epoch milliseconds at creation.
    pub created_at: u64,
    /// Unix-epoch milliseconds at collection, for the sweep.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub collected_at: Option<u64>,
}

/// A message as submitted to the store, before an id is assigned.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    /// Sending principal's name.
    pub sender: String,
    /// Receiving principal's name.
    pub receiver: String,
    /// Opaque payload.
    pub body: String,
    /// Freshly minted send-confirmation token.
    pub token: String,
    /// Unix-epoch milliseconds at creation.
    pub created_at: u64,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("sender", &self.sender)
            .field("receiver", &self.receiver)
            .field("body", &format!("<{} bytes>", self.body.len()))
            .field("token", &format!("<redacted {} chars>", self.token.len()))
            .field("state", &self.state)
            .finish()
    }
}
