//! HTTP façade plumbing.
//!
//! Thin shell between hyper and the relay: collects the request body,
//! dispatches on `(method, path)`, and hands bytes to the handlers in
//! [`crate::routes`]. Routing is split from connection handling so tests
//! can drive the façade without a socket.

use std::sync::Arc;

use bytes::Bytes;
use courier_core::{MemoryStore, Relay, TokenMinter};
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Response, body::Incoming};

use crate::{engine::SealedBoxEngine, routes, system_env::SystemEnv};

/// The production relay: system environment, in-memory store, sealed-box
/// engine.
pub type SystemRelay = Relay<SystemEnv, MemoryStore, SealedBoxEngine<SystemEnv>>;

/// Shared application state.
pub struct AppState {
    /// The protocol orchestrator behind every route.
    pub relay: SystemRelay,
}

impl AppState {
    /// Create state with a fresh store and the given mint retry bound.
    pub fn new(minter: TokenMinter) -> Self {
        let env = SystemEnv::new();
        let engine = SealedBoxEngine::new(env.clone());
        Self { relay: Relay::with_minter(env, MemoryStore::new(), engine, minter) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(TokenMinter::default())
    }
}

/// Hyper service entry point: collect the body, then route.
pub async fn handle(
    state: Arc<AppState>,
    request: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = request.into_parts();
    let bytes = body.collect().await?.to_bytes();
    Ok(route(&state, &parts.method, parts.uri.path(), &bytes).await)
}

/// Dispatch one request to its handler.
pub async fn route(
    state: &AppState,
    method: &Method,
    path: &str,
    body: &Bytes,
) -> Response<Full<Bytes>> {
    tracing::debug!(%method, path, "request");

    match (method, path) {
        (&Method::POST, "/enter") => routes::enter(state, body).await,
        (&Method::POST, "/verify") => routes::verify(state, body),
        (&Method::POST, "/key") => routes::key(state, body),
        (&Method::POST, "/send") => routes::send(state, body).await,
        (&Method::POST, "/send/confirm") => routes::confirm_send(state, body),
        (&Method::POST, "/retrieve") => routes::retrieve(state, body).await,
        (&Method::POST, "/delete") => routes::delete(state, body),
        (&Method::GET, "/health") => routes::health(state),
        _ => routes::unknown_route(path),
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").field("relay", &self.relay).finish()
    }
}
