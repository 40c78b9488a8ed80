//! Document store abstraction.
//!
//! The store is the relay's only mutable shared resource. This narrow
//! repository interface is the single place where per-record serialization
//! is enforced: every read-modify-write the protocol needs (challenge
//! resolution, state promotion, token rotation, collection) is one atomic
//! store operation, so callers cannot interleave a stale read with a
//! write.
//!
//! No transactions are assumed from the backing store; implementations
//! provide the critical sections themselves.

use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use thiserror::Error;

use crate::{
    message::{DeliveryState, Message, MessageDraft, MessageId},
    principal::Principal,
};

/// Errors from store operations.
///
/// In-process stores are infallible apart from logical conflicts, so the
/// surface is small; violations of the `Missing` kind indicate a relay
/// bug, not a caller mistake.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A principal with this name already exists.
    #[error("duplicate principal name: '{name}'")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// No message record with this id exists.
    #[error("no message record with id {id}")]
    Missing {
        /// The id that failed to resolve.
        id: MessageId,
    },
}

/// Record collections `principals` and `messages`, with the atomic
/// read-modify-write operations the protocol depends on.
pub trait Store: Send + Sync + 'static {
    /// Insert a new principal; check-and-insert is atomic.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateName`] if the name is taken.
    fn insert_principal(&self, principal: Principal) -> Result<(), StoreError>;

    /// Find a principal by name.
    fn principal_by_name(&self, name: &str) -> Option<Principal>;

    /// Find the principal whose pending challenge equals `token` and clear
    /// the challenge, atomically. Returns the principal as it was before
    /// clearing.
    fn resolve_challenge(&self, token: &str) -> Option<Principal>;

    /// Insert a new message in the `Queued` state, assigning its id.
    fn insert_message(&self, draft: MessageDraft) -> Message;

    /// Promote the `Queued` message holding `token` to `Deliverable`,
    /// atomically. Returns `None` when no queued message matches.
    fn promote_queued(&self, token: &str) -> Option<MessageId>;

    /// Every `Deliverable` message addressed to `receiver`.
    fn deliverable_for(&self, receiver: &str) -> Vec<Message>;

    /// Overwrite the token of message `id`, invalidating any previously
    /// issued handle for it. Atomic with respect to every other operation
    /// touching the same record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Missing`] if the record has been swept.
    fn rotate_token(&self, id: MessageId, token: &str) -> Result<(), StoreError>;

    /// Mark the `Deliverable` message holding `token` as `Collected`,
    /// stamping `collected_at`, atomically. Returns `None` when no
    /// deliverable message matches (stale or unknown token).
    fn collect(&self, token: &str, at_millis: u64) -> Option<MessageId>;

    /// True if `token` appears as any principal's pending challenge or any
    /// message's current token.
    fn token_in_use(&self, token: &str) -> bool;

    /// Remove every `Collected` message whose collection happened at least
    /// `grace` before `now_millis`. Returns how many were removed.
    fn sweep_collected(&self, now_millis: u64, grace: Duration) -> usize;

    /// Number of registered principals.
    fn principal_count(&self) -> usize;

    /// Number of stored messages, in any state.
    fn message_count(&self) -> usize;
}

/// In-process store backed by `HashMap`s.
///
/// Each collection sits behind its own mutex; every trait operation runs
/// as one critical section over the collections it touches, which
/// linearizes all rotations and promotions of a given record. Lock order
/// is always principals before messages.
#[derive(Default)]
pub struct MemoryStore {
    principals: Mutex<HashMap<String, Principal>>,
    messages: Mutex<HashMap<MessageId, Message>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

// A poisoned lock means a panic mid-operation elsewhere; the data itself
// is a plain map and remains usable.
fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Store for MemoryStore {
    fn insert_principal(&self, principal: Principal) -> Result<(), StoreError> {
        let mut principals = guard(&self.principals);
        if principals.contains_key(&principal.name) {
            return Err(StoreError::DuplicateName { name: principal.name });
        }
        principals.insert(principal.name.clone(), principal);
        Ok(())
    }

    fn principal_by_name(&self, name: &str) -> Option<Principal> {
        guard(&self.principals).get(name).cloned()
    }

    fn resolve_challenge(&self, token: &str) -> Option<Principal> {
        let mut principals = guard(&self.principals);
        let record = principals
            .values_mut()
            .find(|p| p.pending_challenge.as_deref() == Some(token))?;
        let resolved = record.clone();
        record.pending_challenge = None;
        Some(resolved)
    }

    fn insert_message(&self, draft: MessageDraft) -> Message {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let message = Message {
            id,
            sender: draft.sender,
            receiver: draft.receiver,
            body: draft.body,
            token: draft.token,
            state: DeliveryState::Queued,
            created_at: draft.created_at,
            collected_at: None,
        };
        guard(&self.messages).insert(id, message.clone());
        message
    }

    fn promote_queued(&self, token: &str) -> Option<MessageId> {
        let mut messages = guard(&self.messages);
        let record = messages
            .values_mut()
            .find(|m| m.state == DeliveryState::Queued && m.token == token)?;
        record.state = DeliveryState::Deliverable;
        Some(record.id)
    }

    fn deliverable_for(&self, receiver: &str) -> Vec<Message> {
        let messages = guard(&self.messages);
        let mut found: Vec<Message> = messages
            .values()
            .filter(|m| m.state == DeliveryState::Deliverable && m.receiver == receiver)
            .cloned()
            .collect();
        // Stable order for callers; the map itself has none.
        found.sort_by_key(|m| m.id);
        found
    }

    fn rotate_token(&self, id: MessageId, token: &str) -> Result<(), StoreError> {
        let mut messages = guard(&self.messages);
        let record = messages.get_mut(&id).ok_or(StoreError::Missing { id })?;
        record.token = token.to_string();
        Ok(())
    }

    fn collect(&self, token: &str, at_millis: u64) -> Option<MessageId> {
        let mut messages = guard(&self.messages);
        let record = messages
            .values_mut()
            .find(|m| m.state == DeliveryState::Deliverable && m.token == token)?;
        record.state = DeliveryState::Collected;
        record.collected_at = Some(at_millis);
        Some(record.id)
    }

    fn token_in_use(&self, token: &str) -> bool {
        if guard(&self.principals)
            .values()
            .any(|p| p.pending_challenge.as_deref() == Some(token))
        {
            return true;
        }
        guard(&self.messages).values().any(|m| m.token == token)
    }

    fn sweep_collected(&self, now_millis: u64, grace: Duration) -> usize {
        let grace_millis = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX);
        let mut messages = guard(&self.messages);
        let before = messages.len();
        messages.retain(|_, m| match (m.state, m.collected_at) {
            (DeliveryState::Collected, Some(at)) => now_millis.saturating_sub(at) < grace_millis,
            _ => true,
        });
        before - messages.len()
    }

    fn principal_count(&self) -> usize {
        guard(&self.principals).len()
    }

    fn message_count(&self) -> usize {
        guard(&self.messages).len()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("principals", &self.principal_count())
            .field("messages", &self.message_count())
            .finish()
    }
}
