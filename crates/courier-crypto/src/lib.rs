//! Courier cryptographic primitives.
//!
//! Sealed boxes carry challenge tokens from the relay to a key-holder:
//! ephemeral-static X25519 agreement, HKDF-SHA256 key derivation, and
//! XChaCha20-Poly1305 AEAD.
//!
//! # Design
//!
//! All functions in this crate are pure - they have no side effects and
//! produce deterministic outputs given the same inputs. Random bytes
//! required for sealing must be provided by the caller, enabling:
//!
//! - Deterministic testing with seeded RNG
//! - No coupling to application-level abstractions
//!
//! # Security Properties
//!
//! - A sealed box can be opened only with the recipient's static secret
//! - Every seal uses a fresh ephemeral key, so ciphertexts for the same
//!   plaintext are unlinkable
//! - Poly1305 tags authenticate the ciphertext; tampering is detected on
//!   open

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
pub mod sealed_box;

pub use error::CryptoError;
pub use sealed_box::{
    KEY_LEN, NONCE_LEN, SEAL_SEED_LEN, armor, derive_keypair, open, open_armored,
    parse_public_key, seal, seal_armored, unarmor,
};
// Key types are part of this crate's public API.
pub use x25519_dalek::{PublicKey, StaticSecret};
