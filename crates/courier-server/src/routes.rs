//! Façade handlers, one per relay call.
//!
//! Each handler parses its JSON body, names any missing fields, delegates
//! to the relay, and renders the outcome as a `{meta, data}` envelope.
//! Handlers never panic and never leak internals: every path ends in a
//! typed envelope.

use bytes::Bytes;
use courier_core::{RelayError, Store};
use courier_proto::{
    ChallengeReply, DeleteRequest, DeliveredMessage, EmptyData, EnterRequest, Envelope, KeyReply,
    KeyRequest, RetrieveReply, RetrieveRequest, SendRequest, VerifyRequest,
};
use http_body_util::Full;
use hyper::{Response, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};

use crate::http::AppState;

/// Success data for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthData {
    /// Service name.
    pub service: &'static str,
    /// Cargo package version.
    pub version: &'static str,
    /// Registered principal count.
    pub principals: usize,
    /// Stored message count, in any state.
    pub messages: usize,
}

/// Render an envelope as an HTTP response; the HTTP status mirrors
/// `meta.code`.
fn respond<T: Serialize>(envelope: &Envelope<T>) -> Response<Full<Bytes>> {
    let status = StatusCode::from_u16(envelope.meta.code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = serde_json::to_string(envelope).unwrap_or_else(|_| {
        r#"{"meta":{"code":500,"error":{"type":"Internal","message":"envelope serialization failed"}},"data":{}}"#.to_string()
    });

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
    response
}

/// Render a relay error. Server faults are logged at error level,
/// caller mistakes at debug.
fn fail(err: &RelayError) -> Response<Full<Bytes>> {
    if err.is_server_fault() {
        tracing::error!(%err, "request failed");
    } else {
        tracing::debug!(%err, "request rejected");
    }
    respond(&Envelope::failure(err.code(), err.kind(), err.to_string()))
}

/// Parse a JSON request body. An empty body parses as the default (all
/// fields absent) so the caller gets a missing-field error, not a parse
/// error.
fn parse<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, Response<Full<Bytes>>> {
    if body.is_empty() {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(%err, "malformed request body");
        respond(&Envelope::failure(400, "Validation", "malformed request body"))
    })
}

/// Build a missing-fields error from `(name, absent)` pairs.
fn missing(fields: &[(&'static str, bool)]) -> RelayError {
    RelayError::MissingFields {
        fields: fields.iter().filter(|(_, absent)| *absent).map(|(name, _)| *name).collect(),
    }
}

/// `POST /enter` — register a principal and return its sealed challenge.
pub async fn enter(state: &AppState, body: &Bytes) -> Response<Full<Bytes>> {
    let request: EnterRequest = match parse(body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (Some(username), Some(public_key)) =
        (request.username.as_deref(), request.public_key.as_deref())
    else {
        return fail(&missing(&[
            ("username", request.username.is_none()),
            ("publicKey", request.public_key.is_none()),
        ]));
    };

    match state.relay.enter(username, public_key).await {
        Ok(encrypted_challenge) => {
            respond(&Envelope::success(ChallengeReply { encrypted_challenge }))
        },
        Err(err) => fail(&err),
    }
}

/// `POST /verify` — prove key possession with a decrypted challenge.
pub fn verify(state: &AppState, body: &Bytes) -> Response<Full<Bytes>> {
    let request: VerifyRequest = match parse(body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let Some(decrypted) = request.decrypted_hash.as_deref() else {
        return fail(&missing(&[("decryptedHash", true)]));
    };

    match state.relay.verify(decrypted) {
        Ok(()) => respond(&Envelope::success(EmptyData {})),
        Err(err) => fail(&err),
    }
}

/// `POST /key` — look up a principal's public key.
///
/// A missing `username` here is 422, not 400; the façade has always
/// reported this call's validation failures that way.
pub fn key(state: &AppState, body: &Bytes) -> Response<Full<Bytes>> {
    let request: KeyRequest = match parse(body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let Some(username) = request.username.as_deref() else {
        let err = missing(&[("username", true)]);
        return respond(&Envelope::failure(422, err.kind(), err.to_string()));
    };

    match state.relay.public_key(username) {
        Ok(principal) => respond(&Envelope::success(KeyReply {
            username: principal.name,
            public_key: principal.public_key,
        })),
        Err(err) => fail(&err),
    }
}

/// `POST /send` — queue a message; returns the send-confirmation token
/// sealed under the sender's key.
pub async fn send(state: &AppState, body: &Bytes) -> Response<Full<Bytes>> {
    let request: SendRequest = match parse(body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (Some(sender), Some(receiver), Some(message_body)) =
        (request.sender.as_deref(), request.receiver.as_deref(), request.body.as_deref())
    else {
        return fail(&missing(&[
            ("sender", request.sender.is_none()),
            ("receiver", request.receiver.is_none()),
            ("body", request.body.is_none()),
        ]));
    };

    match state.relay.send(sender, receiver, message_body).await {
        Ok(encrypted_challenge) => {
            respond(&Envelope::success(ChallengeReply { encrypted_challenge }))
        },
        Err(err) => fail(&err),
    }
}

/// `POST /send/confirm` — confirm authorship; the message becomes
/// deliverable.
pub fn confirm_send(state: &AppState, body: &Bytes) -> Response<Full<Bytes>> {
    let request: VerifyRequest = match parse(body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let Some(decrypted) = request.decrypted_hash.as_deref() else {
        return fail(&missing(&[("decryptedHash", true)]));
    };

    match state.relay.confirm_send(decrypted) {
        Ok(()) => respond(&Envelope::success(EmptyData {})),
        Err(err) => fail(&err),
    }
}

/// `POST /retrieve` — deliver every deliverable message for a principal,
/// rotating each message's token.
pub async fn retrieve(state: &AppState, body: &Bytes) -> Response<Full<Bytes>> {
    let request: RetrieveRequest = match parse(body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let Some(username) = request.username.as_deref() else {
        return fail(&missing(&[("username", true)]));
    };

    match state.relay.retrieve(username).await {
        Ok(deliveries) => respond(&Envelope::success(RetrieveReply {
            messages: deliveries
                .into_iter()
                .map(|delivery| DeliveredMessage {
                    sender: delivery.sender,
                    body: delivery.body,
                    encrypted_challenge: delivery.encrypted_challenge,
                })
                .collect(),
        })),
        Err(err) => fail(&err),
    }
}

/// `POST /delete` — confirm collection for a batch of decrypted tokens.
pub fn delete(state: &AppState, body: &Bytes) -> Response<Full<Bytes>> {
    let request: DeleteRequest = match parse(body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let hashes = match request.decrypted_hashes {
        Some(hashes) if !hashes.is_empty() => hashes,
        _ => return fail(&missing(&[("decryptedHashes", true)])),
    };

    match state.relay.confirm_collect_all(&hashes) {
        Ok(()) => respond(&Envelope::success(EmptyData {})),
        Err(err) => fail(&err),
    }
}

/// `GET /health` — liveness envelope with store counts.
pub fn health(state: &AppState) -> Response<Full<Bytes>> {
    respond(&Envelope::success(HealthData {
        service: "courier-server",
        version: env!("CARGO_PKG_VERSION"),
        principals: state.relay.store().principal_count(),
        messages: state.relay.store().message_count(),
    }))
}

/// Any route the façade does not serve.
pub fn unknown_route(path: &str) -> Response<Full<Bytes>> {
    respond(&Envelope::failure(404, "NotFound", format!("no such route: {path}")))
}
