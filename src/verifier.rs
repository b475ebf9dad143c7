//! Payment verification
//!
//! A [`PaymentVerifier`] turns a parsed [`PaymentArtifact`] and the quoted
//! [`PaymentTerms`] into a [`VerificationOutcome`]. Two modes exist and only
//! one is active per process:
//!
//! - [`VerifierMode::Delegated`] asks the facilitator named in the terms.
//! - [`VerifierMode::PassThrough`] approves every well-formed artifact without
//!   any network call. It exists for controlled test environments and must be
//!   switched on explicitly.

use crate::facilitator::FacilitatorClient;
use crate::types::{FacilitatorConfig, PaymentArtifact, PaymentTerms, VerifyRequest};
use crate::{Result, X402Error};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which verifier a deployment runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerifierMode {
    /// Verify every artifact with the facilitator
    #[default]
    Delegated,
    /// Approve any well-formed artifact; real verification is bypassed
    PassThrough,
}

impl VerifierMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delegated => "delegated",
            Self::PassThrough => "pass-through",
        }
    }
}

impl fmt::Display for VerifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerifierMode {
    type Err = X402Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delegated" => Ok(Self::Delegated),
            "pass-through" | "passthrough" => Ok(Self::PassThrough),
            other => Err(X402Error::config(format!(
                "Unknown verifier mode '{}': expected 'delegated' or 'pass-through'",
                other
            ))),
        }
    }
}

/// Why a payment was not accepted. Internal only; clients see a generic 402.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The X-PAYMENT header was not well-formed JSON
    Malformed(String),
    /// The facilitator declined the payment
    Declined(String),
    /// The facilitator could not be reached or timed out
    Unavailable(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(detail) => write!(f, "malformed artifact: {}", detail),
            Self::Declined(detail) => write!(f, "declined: {}", detail),
            Self::Unavailable(detail) => write!(f, "facilitator unavailable: {}", detail),
        }
    }
}

/// Result of verifying one payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Approved,
    Rejected { reason: RejectReason },
}

impl VerificationOutcome {
    pub fn rejected(reason: RejectReason) -> Self {
        Self::Rejected { reason }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Decides whether an artifact pays for the quoted terms
#[async_trait]
pub trait PaymentVerifier: Send + Sync + fmt::Debug {
    /// Verify a payment. Failures of any kind come back as `Rejected`.
    async fn verify(&self, artifact: &PaymentArtifact, terms: &PaymentTerms)
        -> VerificationOutcome;

    fn mode(&self) -> VerifierMode;
}

/// Delegates every decision to the facilitator in the quoted terms
#[derive(Debug, Clone)]
pub struct FacilitatorVerifier {
    client: FacilitatorClient,
}

impl FacilitatorVerifier {
    pub fn new(client: FacilitatorClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentVerifier for FacilitatorVerifier {
    async fn verify(
        &self,
        artifact: &PaymentArtifact,
        terms: &PaymentTerms,
    ) -> VerificationOutcome {
        let request = VerifyRequest::new(artifact, terms);
        let timeout = self.client.effective_timeout(terms.max_timeout_seconds);

        match self
            .client
            .verify(&terms.facilitator_url, &request, timeout)
            .await
        {
            Ok(response) if response.is_approved() => VerificationOutcome::Approved,
            Ok(response) => VerificationOutcome::rejected(RejectReason::Declined(
                response
                    .invalid_reason
                    .unwrap_or_else(|| "isValid=false".to_string()),
            )),
            Err(X402Error::PaymentVerificationFailed { reason }) => {
                VerificationOutcome::rejected(RejectReason::Declined(reason))
            }
            Err(e) => VerificationOutcome::rejected(RejectReason::Unavailable(e.to_string())),
        }
    }

    fn mode(&self) -> VerifierMode {
        VerifierMode::Delegated
    }
}

/// Approves every well-formed artifact. Never use outside test environments.
#[derive(Debug, Clone)]
pub struct PassThroughVerifier {
    _private: (),
}

impl PassThroughVerifier {
    pub fn new() -> Self {
        tracing::warn!(
            "Pass-through verifier enabled: payments are NOT verified with the facilitator"
        );
        Self { _private: () }
    }
}

#[async_trait]
impl PaymentVerifier for PassThroughVerifier {
    async fn verify(
        &self,
        _artifact: &PaymentArtifact,
        terms: &PaymentTerms,
    ) -> VerificationOutcome {
        tracing::debug!(
            network = %terms.network,
            "Pass-through verifier approving artifact without facilitator call"
        );
        VerificationOutcome::Approved
    }

    fn mode(&self) -> VerifierMode {
        VerifierMode::PassThrough
    }
}

/// Build the verifier for a mode
pub fn create_verifier(
    mode: VerifierMode,
    facilitator: &FacilitatorConfig,
) -> Result<Arc<dyn PaymentVerifier>> {
    match mode {
        VerifierMode::Delegated => Ok(Arc::new(FacilitatorVerifier::new(
            FacilitatorClient::new(facilitator)?,
        ))),
        VerifierMode::PassThrough => Ok(Arc::new(PassThroughVerifier::new())),
    }
}
