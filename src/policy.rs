//! Route payment policy
//!
//! A read-only map from [`RouteKey`] to [`PaymentRequirement`], built once at
//! startup. A lookup miss means the route is free.
//!
//! # Examples
//!
//! ```
//! use http::Method;
//! use movement_x402::policy::RoutePolicy;
//! use movement_x402::types::PaymentRequirement;
//!
//! # fn example() -> movement_x402::Result<()> {
//! let policy = RoutePolicy::builder()
//!     .route(
//!         Method::GET,
//!         "/api/premium-content",
//!         PaymentRequirement::new("movement", "0x1::aptos_coin::AptosCoin", "100000000".parse()?, "coupon"),
//!     )?
//!     .build();
//!
//! assert!(policy.lookup(&Method::GET, "/api/premium-content").is_some());
//! assert!(policy.lookup(&Method::POST, "/api/premium-content").is_none());
//! # Ok(())
//! # }
//! ```

use crate::types::constants::{assets, networks};
use crate::types::{PaymentRequirement, RouteKey};
use crate::{Result, X402Error};
use http::Method;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Path of the demo protected route
pub const PREMIUM_CONTENT_PATH: &str = "/api/premium-content";

/// Immutable route → requirement mapping
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    routes: HashMap<RouteKey, PaymentRequirement>,
}

impl RoutePolicy {
    pub fn builder() -> RoutePolicyBuilder {
        RoutePolicyBuilder::default()
    }

    /// Find the requirement for a route, if it is protected
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&PaymentRequirement> {
        self.routes.get(&RouteKey::new(method.clone(), path))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate over the protected routes in a stable order
    pub fn routes(&self) -> impl Iterator<Item = (&RouteKey, &PaymentRequirement)> {
        let mut entries: Vec<_> = self.routes.iter().collect();
        entries.sort_by_key(|(key, _)| key.to_string());
        entries.into_iter()
    }

    /// Parse a policy from the JSON object notation:
    ///
    /// ```json
    /// { "GET /api/premium-content": { "network": "movement", ... } }
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        // serde_json keeps the last value for a repeated key, so duplicates in
        // the raw text are invisible here; distinct spellings of the same key
        // (e.g. "GET  /a" vs "GET /a") are still caught by the builder.
        let raw: BTreeMap<String, PaymentRequirement> = serde_json::from_str(json)
            .map_err(|e| X402Error::config(format!("Invalid route policy: {}", e)))?;

        let mut builder = Self::builder();
        for (key, requirement) in raw {
            builder = builder.insert(key.parse()?, requirement)?;
        }
        Ok(builder.build())
    }

    /// Load a policy file in the format accepted by [`RoutePolicy::from_json`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            X402Error::config(format!(
                "Failed to read route policy {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    /// The built-in policy: one paid premium-content route
    pub fn premium_content() -> Result<Self> {
        let requirement = PaymentRequirement::new(
            networks::MOVEMENT,
            assets::APTOS_COIN,
            "100000000".parse()?,
            "pay less than 1 $MOVE to get Coupon.",
        )
        .with_max_timeout_seconds(600);

        Ok(Self::builder()
            .insert(RouteKey::get(PREMIUM_CONTENT_PATH), requirement)?
            .build())
    }
}

/// Builder for [`RoutePolicy`]; each route key may be registered once
#[derive(Debug, Default)]
pub struct RoutePolicyBuilder {
    routes: HashMap<RouteKey, PaymentRequirement>,
}

impl RoutePolicyBuilder {
    /// Protect a route
    pub fn route(
        self,
        method: Method,
        path: impl Into<String>,
        requirement: PaymentRequirement,
    ) -> Result<Self> {
        self.insert(RouteKey::new(method, path), requirement)
    }

    /// Protect a route by key
    pub fn insert(mut self, key: RouteKey, requirement: PaymentRequirement) -> Result<Self> {
        requirement
            .validate()
            .map_err(|e| X402Error::config(format!("Route {}: {}", key, e)))?;

        if self.routes.contains_key(&key) {
            return Err(X402Error::config(format!(
                "Route {} is configured more than once",
                key
            )));
        }

        if !networks::is_supported(&requirement.network) {
            tracing::warn!(
                route = %key,
                network = %requirement.network,
                "Route uses a network this server does not know; the facilitator decides"
            );
        }

        self.routes.insert(key, requirement);
        Ok(self)
    }

    pub fn build(self) -> RoutePolicy {
        RoutePolicy {
            routes: self.routes,
        }
    }
}
