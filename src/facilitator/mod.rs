//! Facilitator client for payment verification
//!
//! A facilitator is the external service that authoritatively decides whether
//! a payment artifact is valid. This client only speaks its `/verify`
//! endpoint; the verdict logic lives on the other side.
//!
//! # Examples
//!
//! ```no_run
//! use movement_x402::facilitator::FacilitatorClient;
//! use movement_x402::types::{FacilitatorConfig, PaymentArtifact, VerifyRequest};
//! use movement_x402::policy::RoutePolicy;
//! use std::time::Duration;
//!
//! # async fn example() -> movement_x402::Result<()> {
//! let config = FacilitatorConfig::new("https://facilitator.stableyard.fi");
//! let client = FacilitatorClient::new(&config)?;
//!
//! let policy = RoutePolicy::premium_content()?;
//! let (_, requirement) = policy.routes().next().unwrap();
//! let terms = requirement.quote("0xpayee", &config.url);
//! let artifact: PaymentArtifact = r#"{"sig":"0x01"}"#.parse()?;
//!
//! let response = client
//!     .verify(&terms.facilitator_url, &VerifyRequest::new(&artifact, &terms), Duration::from_secs(10))
//!     .await?;
//! println!("approved: {}", response.is_approved());
//! # Ok(())
//! # }
//! ```

use crate::types::{FacilitatorConfig, VerifyRequest, VerifyResponse};
use crate::{Result, X402Error};
use reqwest::Client;
use std::time::Duration;

#[cfg(test)]
mod tests;

/// Facilitator client for verifying payments
#[derive(Clone)]
pub struct FacilitatorClient {
    /// HTTP client
    client: Client,
    /// Upper bound for any single call
    timeout_cap: Duration,
    /// Bearer token for the facilitator, if configured
    api_key: Option<String>,
}

impl std::fmt::Debug for FacilitatorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilitatorClient")
            .field("timeout_cap", &self.timeout_cap)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl FacilitatorClient {
    /// Create a new facilitator client
    pub fn new(config: &FacilitatorConfig) -> Result<Self> {
        // Validate configuration first
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| X402Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_cap: config.timeout,
            api_key: config.api_key.clone(),
        })
    }

    /// The longest any single call may take
    pub fn timeout_cap(&self) -> Duration {
        self.timeout_cap
    }

    /// Bound a call by the quoted validity window, never past the configured cap
    pub fn effective_timeout(&self, max_timeout_seconds: u32) -> Duration {
        if max_timeout_seconds == 0 {
            return self.timeout_cap;
        }
        Duration::from_secs(u64::from(max_timeout_seconds)).min(self.timeout_cap)
    }

    /// Submit a payment to `<facilitator_url>/verify`.
    ///
    /// A non-success status, or a 2xx body without a usable verdict, is
    /// reported as [`X402Error::PaymentVerificationFailed`]; transport failures surface as
    /// [`X402Error::Http`] or [`X402Error::Timeout`] so callers can tell a
    /// declined payment from an unreachable facilitator.
    pub async fn verify(
        &self,
        facilitator_url: &str,
        request: &VerifyRequest<'_>,
        timeout: Duration,
    ) -> Result<VerifyResponse> {
        let endpoint = format!("{}/verify", facilitator_url.trim_end_matches('/'));
        let timeout = timeout.min(self.timeout_cap);

        tracing::debug!(
            endpoint = %endpoint,
            network = request.network,
            asset = request.asset,
            max_amount_required = %request.max_amount_required,
            "Sending payment to facilitator"
        );

        let mut builder = self.client.post(&endpoint).json(request).timeout(timeout);

        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| timeout_or_http(e, timeout))?;
        let status = response.status();

        if !status.is_success() {
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            tracing::debug!(
                status = %status,
                body = %response_body,
                "Facilitator rejected verification request"
            );
            return Err(X402Error::payment_verification_failed(format!(
                "Verification failed with status: {}",
                status
            )));
        }

        let body = response.bytes().await.map_err(|e| timeout_or_http(e, timeout))?;

        VerifyResponse::from_body(&body).map_err(|e| {
            tracing::debug!(error = %e, "Facilitator answered 2xx with an unusable body");
            e
        })
    }
}

fn timeout_or_http(error: reqwest::Error, timeout: Duration) -> X402Error {
    if error.is_timeout() {
        X402Error::Timeout {
            seconds: timeout.as_secs(),
        }
    } else {
        X402Error::Http(error)
    }
}
