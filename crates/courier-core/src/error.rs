//! Relay error taxonomy.
//!
//! Every protocol operation returns `Result<_, RelayError>`. The façade
//! maps each variant to an envelope code and error type; nothing is
//! swallowed along the way.

use thiserror::Error;

use crate::{crypto::EngineError, store::StoreError};

/// Errors surfaced by relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// One or more required request fields were absent.
    #[error("{}", format_missing_fields(.fields))]
    MissingFields {
        /// Names of the absent fields, in declaration order.
        fields: Vec<&'static str>,
    },

    /// The named principal is not registered.
    #[error("principal does not exist: '{name}'")]
    UnknownPrincipal {
        /// The name that failed to resolve.
        name: String,
    },

    /// One or more principals referenced by a send are not registered.
    #[error("{}", format_unknown_principals(.names))]
    UnknownPrincipals {
        /// Every name that failed to resolve.
        names: Vec<String>,
    },

    /// No pending challenge or message token matches the supplied value.
    #[error("no pending token matches the supplied value")]
    UnmatchedToken,

    /// Some of the supplied values did not match any deliverable message.
    #[error("{unmatched} supplied value(s) did not match any deliverable message")]
    UnmatchedTokens {
        /// How many values failed to match.
        unmatched: usize,
    },

    /// The principal name is already registered.
    #[error("name already registered: '{name}'")]
    NameTaken {
        /// The conflicting name.
        name: String,
    },

    /// The external cryptography engine failed to seal a token.
    #[error("encryption engine failure: {0}")]
    Encryption(#[from] EngineError),

    /// Token minting hit its retry bound without finding a unique value.
    ///
    /// Expected unreachable in practice; surfacing it beats an unbounded
    /// retry loop.
    #[error("token minting exhausted {attempts} attempts without a unique value")]
    EntropyExhausted {
        /// How many mint attempts were made.
        attempts: u32,
    },

    /// A store invariant was violated.
    #[error("store invariant violated: {0}")]
    Store(#[from] StoreError),
}

impl RelayError {
    /// Envelope status code for this error.
    pub fn code(&self) -> u16 {
        match self {
            Self::MissingFields { .. } => 400,
            Self::UnknownPrincipal { .. }
            | Self::UnknownPrincipals { .. }
            | Self::UnmatchedToken
            | Self::UnmatchedTokens { .. } => 404,
            Self::NameTaken { .. } => 409,
            Self::Encryption(_) | Self::EntropyExhausted { .. } | Self::Store(_) => 500,
        }
    }

    /// Envelope error type for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFields { .. } => "Validation",
            Self::UnknownPrincipal { .. }
            | Self::UnknownPrincipals { .. }
            | Self::UnmatchedToken
            | Self::UnmatchedTokens { .. } => "NotFound",
            Self::NameTaken { .. } => "Conflict",
            Self::Encryption(_) => "Encryption",
            Self::EntropyExhausted { .. } | Self::Store(_) => "Internal",
        }
    }

    /// Returns true if this error indicates a server-side fault (5xx).
    ///
    /// Recoverable caller mistakes (validation, not-found, conflict) are
    /// not server faults and are logged at debug level only.
    pub fn is_server_fault(&self) -> bool {
        self.code() >= 500
    }
}

fn format_missing_fields(fields: &[&'static str]) -> String {
    let quoted: Vec<String> = fields.iter().map(|f| format!("'{f}'")).collect();
    if quoted.len() == 1 {
        format!("missing field {}", quoted[0])
    } else {
        format!("missing fields {}", quoted.join(" and "))
    }
}

fn format_unknown_principals(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    if quoted.len() == 1 {
        format!("principal does not exist: {}", quoted[0])
    } else {
        format!("principals do not exist: {}", quoted.join(" and "))
    }
}
