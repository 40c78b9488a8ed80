//! The uniform response envelope.
//!
//! Every façade response, success or failure, is one JSON object:
//!
//! ```json
//! {"meta": {"code": 200}, "data": {...}}
//! {"meta": {"code": 404, "error": {"type": "NotFound", "message": "..."}}, "data": {}}
//! ```

use serde::{Deserialize, Serialize};

/// Response metadata: status code plus an optional typed error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Status code, mirroring the HTTP status of the response.
    pub code: u16,
    /// Present exactly when the call failed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ErrorBody>,
}

/// Typed error payload inside a failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error class: `Validation`, `NotFound`, `Conflict`, `Encryption`,
    /// or `Internal`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable description, safe to show to callers.
    pub message: String,
}

/// The `{meta, data}` envelope wrapping every response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Status code and optional error.
    pub meta: Meta,
    /// Call-specific payload; an empty object on failure.
    pub data: T,
}

/// Empty `data` object for responses that carry none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyData {}

impl<T> Envelope<T> {
    /// Wrap a successful payload.
    pub fn success(data: T) -> Self {
        Self { meta: Meta { code: 200, error: None }, data }
    }
}

impl Envelope<EmptyData> {
    /// Build a failure envelope with an empty data object.
    pub fn failure(code: u16, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            meta: Meta {
                code,
                error: Some(ErrorBody { kind: kind.into(), message: message.into() }),
            },
            data: EmptyData {},
        }
    }
}
