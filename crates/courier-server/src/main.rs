//! Courier server binary.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (port 8080, immediate sweep of collected messages)
//! courier-server
//!
//! # Custom bind address and a 10-minute grace period before removal
//! courier-server --bind 0.0.0.0:9000 --sweep-grace-secs 600
//! ```

use clap::Parser;
use courier_server::{Server, ServerRuntimeConfig};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Courier relay server
#[derive(Parser, Debug)]
#[command(name = "courier-server")]
#[command(about = "Store-and-forward message relay with challenge-response authentication")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Seconds between garbage-collection sweeps
    #[arg(long, default_value = "60")]
    sweep_interval_secs: u64,

    /// Seconds collected messages linger before removal
    #[arg(long, default_value = "0")]
    sweep_grace_secs: u64,

    /// Bound on token mint-and-check attempts
    #[arg(long, default_value = "64")]
    max_mint_attempts: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Courier server starting");
    tracing::info!("Binding to {}", args.bind);

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        sweep_interval: Duration::from_secs(args.sweep_interval_secs.max(1)),
        sweep_grace: Duration::from_secs(args.sweep_grace_secs),
        max_mint_attempts: args.max_mint_attempts,
    };

    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
