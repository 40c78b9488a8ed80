//! Principal records.

use serde::{Deserialize, Serialize};

/// A named entity holding an asymmetric key pair.
///
/// The relay only ever sees the public half. `pending_challenge` holds the
/// most recently issued, not-yet-resolved challenge token; a new challenge
/// supersedes the old one, so at most one is outstanding at a time.
///
/// Principal records are never deleted by the core.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique human-chosen identifier (primary key).
    pub name: String,
    /// Armored public-key material supplied at registration, opaque to the
    /// relay.
    pub public_key: String,
    /// Outstanding challenge token, cleared when resolved.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pending_challenge: Option<String>,
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("name", &self.name)
            .field("public_key", &format!("<{} bytes>", self.public_key.len()))
            .field(
                "pending_challenge",
                &self.pending_challenge.as_ref().map(|c| format!("<redacted {} chars>", c.len())),
            )
            .finish()
    }
}
