//! Courier client.
//!
//! The key-holder side of the challenge-response protocol: an [`Identity`]
//! owns the X25519 static secret, registers only the armored public half
//! with the relay, and proves key possession by opening sealed challenges
//! and submitting the plaintext tokens back.
//!
//! This crate is sans-IO: it performs no network calls, so the same code
//! serves HTTP callers and in-process test harnesses.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod identity;

pub use error::ClientError;
pub use identity::Identity;
