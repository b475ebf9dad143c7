//! Paywall gate middleware
//!
//! The gate sits in front of arbitrary handlers. For each request it looks
//! the route up in the [`RoutePolicy`](crate::policy::RoutePolicy), answers
//! `402 Payment Required` when no payment is presented, verifies the payment
//! when one is, and only then lets the request through.
//!
//! # Architecture
//!
//! - [`config`] - Paywall configuration (payee, facilitator, verifier mode)
//! - [`payment`] - The gate itself and the axum middleware function
//! - [`service`] - Tower service layer for framework integration
//!
//! # Examples
//!
//! ## Axum Integration
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use movement_x402::middleware::{paywall_middleware, PaywallConfig, PaywallGate};
//! use movement_x402::policy::RoutePolicy;
//!
//! # fn example() -> movement_x402::Result<()> {
//! let gate = PaywallGate::new(
//!     RoutePolicy::premium_content()?,
//!     PaywallConfig::new("0x209693bc6afc0c5328ba36faf03c514ef312287c"),
//! )?;
//!
//! let app: Router = Router::new()
//!     .route("/api/premium-content", get(|| async { "Premium content" }))
//!     .layer(axum::middleware::from_fn_with_state(gate, paywall_middleware));
//! # Ok(())
//! # }
//! ```
//!
//! ## Tower Layer
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use movement_x402::middleware::{PaywallConfig, PaywallGate, PaywallLayer};
//! use movement_x402::policy::RoutePolicy;
//!
//! # fn example() -> movement_x402::Result<()> {
//! let gate = PaywallGate::new(
//!     RoutePolicy::premium_content()?,
//!     PaywallConfig::new("0x209693bc6afc0c5328ba36faf03c514ef312287c"),
//! )?;
//!
//! let app: Router = Router::new()
//!     .route("/api/premium-content", get(|| async { "Premium content" }))
//!     .layer(PaywallLayer::new(gate));
//! # Ok(())
//! # }
//! ```
//!
//! # Payment Flow
//!
//! 1. Route not in the policy → request forwarded unchanged
//! 2. No X-PAYMENT header → 402 with the terms in `X-PAYMENT-RESPONSE`
//! 3. X-PAYMENT not valid JSON → 402, handler not run
//! 4. Verifier rejects (declined or facilitator unreachable) → 402, handler not run
//! 5. Verifier approves → handler runs once, its response is returned as is

pub mod config;
pub mod payment;
pub mod service;


// Re-export commonly used types
pub use config::PaywallConfig;
pub use payment::{paywall_middleware, PaymentResult, PaywallGate};
pub use service::{PaywallLayer, PaywallService};
