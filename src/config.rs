//! Server settings.
//!
//! Read once from the environment at startup. Request handling never looks at
//! the environment again.
//!
//! # Environment Variables
//!
//! - `MOVEMENT_PAY_TO` - Receiving address (required)
//! - `FACILITATOR_URL` - Facilitator base URL (default: `https://facilitator.stableyard.fi`)
//! - `FACILITATOR_API_KEY` - Bearer token sent to the facilitator (optional)
//! - `FACILITATOR_TIMEOUT_SECS` - Cap on a facilitator call (default: `30`)
//! - `X402_VERIFIER_MODE` - `delegated` or `pass-through` (default: `delegated`)
//! - `X402_ROUTES_FILE` - JSON route policy (default: the built-in premium route)
//! - `CORS_ALLOWED_ORIGIN` - Allowed browser origin, `*` for any (default: `http://localhost:3000`)
//! - `PREMIUM_REDIRECT_URL` - Where the premium handler redirects
//! - `HOST` / `PORT` - Bind address (default: `0.0.0.0:4402`)

use crate::handlers::DEFAULT_PREMIUM_REDIRECT_URL;
use crate::middleware::PaywallConfig;
use crate::policy::RoutePolicy;
use crate::types::constants::{DEFAULT_FACILITATOR_TIMEOUT_SECS, DEFAULT_PORT};
use crate::types::FacilitatorConfig;
use crate::verifier::VerifierMode;
use crate::{Result, X402Error};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Default allowed CORS origin
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Everything the binary needs to start
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
    pub cors_allowed_origin: String,
    pub premium_redirect_url: String,
    /// `None` selects the built-in premium content policy
    pub routes_file: Option<PathBuf>,
    pub paywall: PaywallConfig,
}

impl ServerSettings {
    /// Read the settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the settings through an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let pay_to = var("MOVEMENT_PAY_TO")
            .ok_or_else(|| X402Error::config("MOVEMENT_PAY_TO must be set"))?;

        let mut facilitator = match var("FACILITATOR_URL") {
            Some(url) => FacilitatorConfig::new(url),
            None => FacilitatorConfig::default(),
        };
        let timeout_secs = match var("FACILITATOR_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                X402Error::config(format!("Invalid FACILITATOR_TIMEOUT_SECS: {}", raw))
            })?,
            None => DEFAULT_FACILITATOR_TIMEOUT_SECS,
        };
        facilitator = facilitator.with_timeout(Duration::from_secs(timeout_secs));
        if let Some(api_key) = var("FACILITATOR_API_KEY") {
            facilitator = facilitator.with_api_key(api_key);
        }

        let verifier_mode = match var("X402_VERIFIER_MODE") {
            Some(raw) => raw.parse::<VerifierMode>()?,
            None => VerifierMode::default(),
        };

        let paywall = PaywallConfig::new(pay_to)
            .with_facilitator_config(facilitator)
            .with_verifier_mode(verifier_mode);
        paywall.validate()?;

        let host = match var("HOST") {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|_| X402Error::config(format!("Invalid HOST: {}", raw)))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| X402Error::config(format!("Invalid PORT: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        let premium_redirect_url =
            var("PREMIUM_REDIRECT_URL").unwrap_or_else(|| DEFAULT_PREMIUM_REDIRECT_URL.into());
        url::Url::parse(&premium_redirect_url).map_err(|e| {
            X402Error::config(format!("Invalid PREMIUM_REDIRECT_URL: {}", e))
        })?;

        Ok(Self {
            host,
            port,
            cors_allowed_origin: var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGIN.into()),
            premium_redirect_url,
            routes_file: var("X402_ROUTES_FILE").map(PathBuf::from),
            paywall,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Load the route policy this server enforces
    pub fn load_policy(&self) -> Result<RoutePolicy> {
        match &self.routes_file {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading route policy from file");
                RoutePolicy::from_file(path)
            }
            None => RoutePolicy::premium_content(),
        }
    }
}
