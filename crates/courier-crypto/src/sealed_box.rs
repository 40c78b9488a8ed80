//! Sealed-box construction.
//!
//! Anyone can seal a plaintext to an X25519 public key; only the static
//! secret holder can open it. Per seal, one ephemeral X25519 keypair and
//! one random nonce are consumed from the caller-provided seed.
//!
//! Key derivation:
//!   `key = HKDF-SHA256(ikm = DH(eph, recipient) || eph_pub || recipient_pub,
//!                      info = "courier-seal-v1")`
//!
//! Ciphertext wire format:
//!   `[ eph_pub (32) | nonce (24) | ciphertext + tag ]`

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// X25519 key length in bytes.
pub const KEY_LEN: usize = 32;

/// XChaCha20-Poly1305 nonce length in bytes.
pub const NONCE_LEN: usize = 24;

/// Random bytes consumed by one seal: ephemeral secret plus nonce.
pub const SEAL_SEED_LEN: usize = KEY_LEN + NONCE_LEN;

const KDF_INFO: &[u8] = b"courier-seal-v1";

/// Encode bytes as URL-safe unpadded base64.
pub fn armor(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode URL-safe unpadded base64.
pub fn unarmor(armored: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(URL_SAFE_NO_PAD.decode(armored)?)
}

/// Derive an X25519 keypair from 32 bytes of caller-provided entropy.
pub fn derive_keypair(seed: &[u8; KEY_LEN]) -> (StaticSecret, PublicKey) {
    let secret = StaticSecret::from(*seed);
    let public = PublicKey::from(&secret);
    (secret, public)
}

/// Parse an armored 32-byte X25519 public key.
pub fn parse_public_key(armored: &str) -> Result<PublicKey, CryptoError> {
    let bytes = unarmor(armored)?;
    let bytes: [u8; KEY_LEN] = bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidKey(format!("expected {KEY_LEN}-byte public key")))?;
    Ok(PublicKey::from(bytes))
}

fn derive_seal_key(
    shared: &x25519_dalek::SharedSecret,
    eph_public: &PublicKey,
    recipient: &PublicKey,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    if !shared.was_contributory() {
        return Err(CryptoError::InvalidKey("non-contributory public key".to_string()));
    }

    let mut ikm = Zeroizing::new([0u8; KEY_LEN * 3]);
    ikm[..KEY_LEN].copy_from_slice(shared.as_bytes());
    ikm[KEY_LEN..KEY_LEN * 2].copy_from_slice(eph_public.as_bytes());
    ikm[KEY_LEN * 2..].copy_from_slice(recipient.as_bytes());

    let hkdf = Hkdf::<Sha256>::new(None, ikm.as_ref());
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    hkdf.expand(KDF_INFO, key.as_mut())
        .map_err(|_| CryptoError::InvalidKey("HKDF expand failed".to_string()))?;
    Ok(key)
}

/// Seal `plaintext` to `recipient`, consuming `seed` for the ephemeral
/// secret (first 32 bytes) and nonce (last 24 bytes).
pub fn seal(
    recipient: &PublicKey,
    plaintext: &[u8],
    seed: &[u8; SEAL_SEED_LEN],
) -> Result<Vec<u8>, CryptoError> {
    let mut eph_seed = Zeroizing::new([0u8; KEY_LEN]);
    eph_seed.copy_from_slice(&seed[..KEY_LEN]);
    let (eph_secret, eph_public) = derive_keypair(&eph_seed);

    let shared = eph_secret.diffie_hellman(recipient);
    let key = derive_seal_key(&shared, &eph_public, recipient)?;

    let cipher = XChaCha20Poly1305::new_from_slice(key.as_ref())
        .map_err(|_| CryptoError::SealFailed)?;
    let nonce = XNonce::from_slice(&seed[KEY_LEN..]);
    let ciphertext = cipher.encrypt(nonce, plaintext).map_err(|_| CryptoError::SealFailed)?;

    let mut wire = Vec::with_capacity(KEY_LEN + NONCE_LEN + ciphertext.len());
    wire.extend_from_slice(eph_public.as_bytes());
    wire.extend_from_slice(nonce.as_slice());
    wire.extend_from_slice(&ciphertext);
    Ok(wire)
}

/// Open wire-format bytes with the recipient's static secret.
pub fn open(secret: &StaticSecret, wire: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if wire.len() < KEY_LEN + NONCE_LEN {
        return Err(CryptoError::OpenFailed);
    }
    let (eph_bytes, rest) = wire.split_at(KEY_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let eph_bytes: [u8; KEY_LEN] = eph_bytes.try_into().map_err(|_| CryptoError::OpenFailed)?;
    let eph_public = PublicKey::from(eph_bytes);
    let recipient = PublicKey::from(secret);

    let shared = secret.diffie_hellman(&eph_public);
    let key = derive_seal_key(&shared, &eph_public, &recipient)?;

    let cipher = XChaCha20Poly1305::new_from_slice(key.as_ref())
        .map_err(|_| CryptoError::OpenFailed)?;
    let nonce = XNonce::from_slice(nonce_bytes);
    let plaintext = cipher.decrypt(nonce, ciphertext).map_err(|_| CryptoError::OpenFailed)?;
    Ok(Zeroizing::new(plaintext))
}

/// Seal a UTF-8 plaintext to an armored public key, returning armored
/// wire bytes.
pub fn seal_armored(
    armored_public: &str,
    plaintext: &str,
    seed: &[u8; SEAL_SEED_LEN],
) -> Result<String, CryptoError> {
    let recipient = parse_public_key(armored_public)?;
    let wire = seal(&recipient, plaintext.as_bytes(), seed)?;
    Ok(armor(&wire))
}

/// Open an armored ciphertext into a UTF-8 plaintext.
pub fn open_armored(secret: &StaticSecret, armored_wire: &str) -> Result<String, CryptoError> {
    let wire = unarmor(armored_wire)?;
    let plaintext = open(secret, &wire)?;
    String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::NotUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(fill: u8) -> [u8; SEAL_SEED_LEN] {
        let mut seed = [0u8; SEAL_SEED_LEN];
        for (i, slot) in seed.iter_mut().enumerate() {
            *slot = fill.wrapping_add(i as u8);
        }
        seed
    }

    #[test]
    fn seal_open_round_trip() {
        let (secret, public) = derive_keypair(&[7u8; KEY_LEN]);

        let wire = seal(&public, b"0123abcd", &seed(1)).expect("seal");
        let plaintext = open(&secret, &wire).expect("open");
        assert_eq!(plaintext.as_slice(), b"0123abcd");
    }

    #[test]
    fn armored_round_trip() {
        let (secret, public) = derive_keypair(&[9u8; KEY_LEN]);
        let armored_public = armor(public.as_bytes());

        let ciphertext = seal_armored(&armored_public, "deadbeef", &seed(3)).expect("seal");
        let plaintext = open_armored(&secret, &ciphertext).expect("open");
        assert_eq!(plaintext, "deadbeef");
    }

    #[test]
    fn wrong_recipient_cannot_open() {
        let (_, public) = derive_keypair(&[1u8; KEY_LEN]);
        let (other_secret, _) = derive_keypair(&[2u8; KEY_LEN]);

        let wire = seal(&public, b"secret", &seed(5)).expect("seal");
        assert!(matches!(open(&other_secret, &wire), Err(CryptoError::OpenFailed)));
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let (secret, public) = derive_keypair(&[4u8; KEY_LEN]);

        let mut wire = seal(&public, b"secret", &seed(8)).expect("seal");
        let last = wire.len() - 1;
        wire[last] ^= 0x01;
        assert!(matches!(open(&secret, &wire), Err(CryptoError::OpenFailed)));
    }

    #[test]
    fn truncated_wire_is_rejected() {
        let (secret, _) = derive_keypair(&[4u8; KEY_LEN]);
        assert!(matches!(open(&secret, &[0u8; 10]), Err(CryptoError::OpenFailed)));
    }

    #[test]
    fn distinct_seeds_give_distinct_ciphertexts() {
        let (_, public) = derive_keypair(&[6u8; KEY_LEN]);

        let first = seal(&public, b"same plaintext", &seed(10)).expect("seal");
        let second = seal(&public, b"same plaintext", &seed(20)).expect("seal");
        assert_ne!(first, second);
    }

    #[test]
    fn parse_public_key_rejects_wrong_length() {
        let armored = armor(&[0u8; 16]);
        assert!(matches!(parse_public_key(&armored), Err(CryptoError::InvalidKey(_))));
    }
}
