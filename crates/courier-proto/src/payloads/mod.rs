//! Request and response payload types, one module per concern.

mod auth;
mod message;

pub use auth::{ChallengeReply, EnterRequest, KeyReply, KeyRequest, VerifyRequest};
pub use message::{
    DeleteRequest, DeliveredMessage, RetrieveReply, RetrieveRequest, SendRequest,
};
