//! Core types for the x402 payment gate
//!
//! # Architecture
//!
//! - [`route`] - Typed route keys (`http::Method` × exact path)
//! - [`payment`] - Payment requirements, quoted terms and client artifacts
//! - [`facilitator`] - Facilitator configuration and wire types
//! - [`constants`] - Header names, network/asset identifiers and defaults
//!
//! # Examples
//!
//! ```
//! use movement_x402::types::{PaymentRequirement, RouteKey};
//!
//! # fn example() -> movement_x402::Result<()> {
//! let key: RouteKey = "GET /api/premium-content".parse()?;
//! let requirement = PaymentRequirement::new(
//!     "movement",
//!     "0x1::aptos_coin::AptosCoin",
//!     "100000000".parse()?,
//!     "pay less than 1 $MOVE to get Coupon.",
//! )
//! .with_max_timeout_seconds(600);
//!
//! let terms = requirement.quote("0xpayee", "https://facilitator.stableyard.fi");
//! assert_eq!(terms.pay_to, "0xpayee");
//! # let _ = key;
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod facilitator;
pub mod payment;
pub mod route;

pub use constants::{assets, headers, networks};
pub use facilitator::{FacilitatorConfig, VerifyRequest, VerifyResponse};
pub use payment::{PaymentArtifact, PaymentRequirement, PaymentTerms, TokenAmount};
pub use route::RouteKey;
