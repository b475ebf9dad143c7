//! # Movement x402 payment gate
//!
//! HTTP-native micropayments for routes settled on the Movement network.
//! Protected routes answer `402 Payment Required` with the payment terms in
//! the `X-PAYMENT-RESPONSE` header until the client retries with an
//! `X-PAYMENT` proof that a facilitator accepts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use movement_x402::{
//!     middleware::{paywall_middleware, PaywallConfig, PaywallGate},
//!     policy::RoutePolicy,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gate = PaywallGate::new(
//!         RoutePolicy::premium_content()?,
//!         PaywallConfig::new("0x209693bc6afc0c5328ba36faf03c514ef312287c"),
//!     )?;
//!
//!     let app = Router::new()
//!         .route("/api/premium-content", get(|| async { "Premium content" }))
//!         .layer(axum::middleware::from_fn_with_state(gate, paywall_middleware));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:4402").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`types`**: Route keys, payment requirements and terms, facilitator wire types
//! - **`policy`**: Which routes cost what
//! - **`verifier`**: Delegated (facilitator) and pass-through verification
//! - **`facilitator`**: HTTP client for the facilitator's `/verify` endpoint
//! - **`middleware`**: The paywall gate, as axum middleware or a tower layer
//! - **`config`**, **`server`**, **`handlers`**: The demo payment server
//! - **`error`**: Error taxonomy and its HTTP mapping

pub mod config;
pub mod error;
pub mod facilitator;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod server;
pub mod types;
pub mod verifier;

// Re-exports for convenience
pub use config::ServerSettings;
pub use error::{Result, X402Error};
pub use middleware::{PaywallConfig, PaywallGate, PaywallLayer};
pub use policy::RoutePolicy;
pub use types::*;
pub use verifier::{PaymentVerifier, VerificationOutcome, VerifierMode};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
