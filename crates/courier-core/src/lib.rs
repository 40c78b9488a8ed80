//! Courier protocol core.
//!
//! Store-and-forward message relay that authenticates principals and
//! authorizes message handoff with a challenge-response protocol built on
//! asymmetric-key encryption. The relay never sees a private key and
//! never inspects a message body: it mints unguessable one-time tokens,
//! has them sealed to a principal's public key by an injected
//! cryptography engine, and accepts the decrypted token back as proof of
//! key possession.
//!
//! ## Architecture
//!
//! ```text
//! courier-core
//!   ├─ Environment        (time + entropy injection)
//!   ├─ TokenMinter        (collision-free one-time tokens)
//!   ├─ Store              (principals + messages repository)
//!   ├─ PrincipalRegistry  (register / lookup / resolve challenge)
//!   ├─ MessageLedger      (Queued → Deliverable → Collected)
//!   └─ Relay              (protocol orchestrator, CryptoEngine fan-out)
//! ```
//!
//! All protocol logic is synchronous and deterministic; the only
//! suspension points are encryption calls out to the [`CryptoEngine`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod env;
pub mod store;

mod crypto;
mod error;
mod ledger;
mod message;
mod principal;
mod registry;
mod relay;
mod token;

pub use crypto::{CryptoEngine, EngineError};
pub use error::RelayError;
pub use ledger::MessageLedger;
pub use message::{DeliveryState, Message, MessageDraft, MessageId};
pub use principal::Principal;
pub use registry::PrincipalRegistry;
pub use relay::{Delivery, Relay};
pub use store::{MemoryStore, Store, StoreError};
pub use token::{DEFAULT_MAX_ATTEMPTS, TOKEN_LEN, TokenMinter};
