//! Courier wire types.
//!
//! JSON request payloads for each façade call and the uniform
//! `{meta, data}` response envelope. Request fields are `Option`s on
//! purpose: the façade, not serde, decides how missing fields are
//! reported, so error messages can name exactly the fields that were
//! absent.
//!
//! Wire field names are camelCase; Rust field names are snake_case.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod envelope;
mod payloads;

pub use envelope::{EmptyData, Envelope, ErrorBody, Meta};
pub use payloads::{
    ChallengeReply, DeleteRequest, DeliveredMessage, EnterRequest, KeyReply, KeyRequest,
    RetrieveReply, RetrieveRequest, SendRequest, VerifyRequest,
};
