//! Message-handoff payload types: send, retrieve, and delete.

use serde::{Deserialize, Serialize};

/// Request body for `POST /send`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    /// Sending principal's name.
    pub sender: Option<String>,
    /// Receiving principal's name.
    pub receiver: Option<String>,
    /// Opaque payload; the relay stores it verbatim.
    pub body: Option<String>,
}

/// Request body for `POST /retrieve`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveRequest {
    /// Principal collecting their deliverable messages.
    pub username: Option<String>,
}

/// One delivered message inside a retrieval reply.
///
/// Carries the sender, the payload, and the sealed collection token —
/// never the relay's internal id or state flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredMessage {
    /// Name of the sending principal.
    pub sender: String,
    /// The opaque message payload.
    pub body: String,
    /// Armored ciphertext of the rotated collection token.
    pub encrypted_challenge: String,
}

/// Success data for `POST /retrieve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveReply {
    /// Every deliverable message for the requested principal.
    pub messages: Vec<DeliveredMessage>,
}

/// Request body for `POST /delete`.
///
/// Each entry is a decrypted collection token; matched messages are
/// marked collected independently of the others.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    /// Decrypted collection tokens to confirm.
    pub decrypted_hashes: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_reports_absent_fields_as_none() {
        let request: SendRequest =
            serde_json::from_str(r#"{"sender":"alice","body":"hi"}"#).expect("parse");
        assert_eq!(request.sender.as_deref(), Some("alice"));
        assert_eq!(request.receiver, None);
        assert_eq!(request.body.as_deref(), Some("hi"));
    }

    #[test]
    fn retrieve_reply_serializes_message_list() {
        let reply = RetrieveReply {
            messages: vec![DeliveredMessage {
                sender: "alice".to_string(),
                body: "hi".to_string(),
                encrypted_challenge: "CIPHER".to_string(),
            }],
        };
        let json = serde_json::to_string(&reply).expect("serialize");
        assert_eq!(
            json,
            r#"{"messages":[{"sender":"alice","body":"hi","encryptedChallenge":"CIPHER"}]}"#
        );
    }

    #[test]
    fn delete_request_round_trips() {
        let request: DeleteRequest =
            serde_json::from_str(r#"{"decryptedHashes":["aa","bb"]}"#).expect("parse");
        assert_eq!(request.decrypted_hashes.as_deref().map(<[String]>::len), Some(2));
    }
}
