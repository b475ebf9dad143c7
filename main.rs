//! Movement x402 payment server
//!
//! Serves a demo premium route behind the x402 paywall gate.
//!
//! # Usage
//!
//! ```bash
//! MOVEMENT_PAY_TO=0x... cargo run --release
//!
//! # Configure logging level
//! RUST_LOG=debug MOVEMENT_PAY_TO=0x... cargo run
//! ```
//!
//! See [`movement_x402::config`] for the full list of environment variables.

use movement_x402::{server, ServerSettings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Payment server failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> movement_x402::Result<()> {
    let settings = ServerSettings::from_env()?;
    tracing::info!(
        version = movement_x402::VERSION,
        bind = %settings.bind_addr(),
        "Starting Movement x402 payment server"
    );
    server::serve(settings).await
}
