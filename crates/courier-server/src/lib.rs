//! Courier production server.
//!
//! This crate provides the production relay shell using:
//! - Hyper for the HTTP/1.1 JSON façade
//! - Tokio for async runtime
//! - System time and cryptographic RNG
//! - A sealed-box engine over `courier-crypto`
//!
//! ## Architecture
//!
//! ```text
//! courier-server
//!   ├─ SystemEnv          (production Environment impl)
//!   ├─ SealedBoxEngine    (production CryptoEngine impl)
//!   ├─ AppState           (Relay over MemoryStore)
//!   ├─ routes             (per-call façade handlers)
//!   └─ Server             (bind/accept loop + sweep task)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
pub mod http;
pub mod routes;
mod system_env;

use std::{sync::Arc, time::Duration};

use courier_core::{TokenMinter, env::Environment};
pub use engine::SealedBoxEngine;
pub use error::ServerError;
pub use http::{AppState, SystemRelay};
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
pub use system_env::SystemEnv;
use tokio::net::TcpListener;

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080")
    pub bind_address: String,
    /// How often the garbage-collection sweep runs
    pub sweep_interval: Duration,
    /// How long collected messages linger before the sweep removes them
    pub sweep_grace: Duration,
    /// Bound on token mint-and-check attempts
    pub max_mint_attempts: u32,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            sweep_interval: Duration::from_secs(60),
            sweep_grace: Duration::ZERO,
            max_mint_attempts: courier_core::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Production courier server.
///
/// Wraps the relay state with a hyper HTTP façade and a background sweep
/// task.
pub struct Server {
    state: Arc<AppState>,
    listener: TcpListener,
    config: ServerRuntimeConfig,
}

impl Server {
    /// Create and bind a new server.
    ///
    /// # Errors
    ///
    /// Returns error if binding to the address fails.
    pub async fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_address).await?;
        let state = Arc::new(AppState::new(TokenMinter::new(config.max_mint_attempts)));
        Ok(Self { state, listener, config })
    }

    /// Get the local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the server, accepting connections and serving requests.
    ///
    /// This method runs until the server is shut down or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Server starting on {}", self.local_addr()?);

        spawn_sweep_task(
            Arc::clone(&self.state),
            self.config.sweep_interval,
            self.config.sweep_grace,
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::debug!(%peer, "connection accepted");
                    let state = Arc::clone(&self.state);

                    tokio::spawn(async move {
                        let service =
                            service_fn(move |request| http::handle(Arc::clone(&state), request));
                        let connection = hyper::server::conn::http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service);

                        if let Err(e) = connection.await {
                            tracing::debug!("Connection error: {}", e);
                        }
                    });
                },
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                },
            }
        }
    }
}

/// Periodically remove collected messages past their grace period.
fn spawn_sweep_task(state: Arc<AppState>, interval: Duration, grace: Duration) {
    let env = SystemEnv::new();
    tokio::spawn(async move {
        loop {
            env.sleep(interval).await;
            state.relay.sweep(grace);
        }
    });
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server").field("config", &self.config).finish_non_exhaustive()
    }
}
