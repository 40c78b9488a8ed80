//! Authentication payload types: enter, verify, and key lookup.

use serde::{Deserialize, Serialize};

/// Request body for `POST /enter`.
///
/// Registers a principal and initiates the challenge-response handshake.
/// Fields are optional at the wire level so the façade can name exactly
/// which ones were missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterRequest {
    /// Chosen unique principal name.
    pub username: Option<String>,
    /// Armored public-key material.
    pub public_key: Option<String>,
}

/// Success data for `POST /enter` and `POST /send`: a sealed challenge
/// only the addressed key-holder can open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeReply {
    /// Armored ciphertext of the minted token.
    pub encrypted_challenge: String,
}

/// Request body for `POST /verify` and `POST /send/confirm`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// The decrypted challenge token, exactly as minted.
    pub decrypted_hash: Option<String>,
}

/// Request body for `POST /key`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRequest {
    /// Principal whose public key is wanted.
    pub username: Option<String>,
}

/// Success data for `POST /key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyReply {
    /// The principal's name, echoed back.
    pub username: String,
    /// The principal's armored public key.
    pub public_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_request_tolerates_missing_fields() {
        let request: EnterRequest = serde_json::from_str(r#"{"username":"alice"}"#).expect("parse");
        assert_eq!(request.username.as_deref(), Some("alice"));
        assert_eq!(request.public_key, None);
    }

    #[test]
    fn key_reply_uses_camel_case() {
        let reply = KeyReply { username: "alice".to_string(), public_key: "PK".to_string() };
        let json = serde_json::to_string(&reply).expect("serialize");
        assert_eq!(json, r#"{"username":"alice","publicKey":"PK"}"#);
    }
}
