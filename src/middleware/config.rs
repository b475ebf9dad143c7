//! Paywall configuration

use crate::types::FacilitatorConfig;
use crate::verifier::VerifierMode;
use crate::{Result, X402Error};
use std::time::Duration;

/// Process-wide settings the gate and verifier are built from.
///
/// Constructed once at startup and shared by reference; request handling
/// never reads the environment.
#[derive(Debug, Clone)]
pub struct PaywallConfig {
    /// Receiving address advertised as `payTo`
    pub pay_to: String,
    /// Facilitator endpoint and client settings
    pub facilitator: FacilitatorConfig,
    /// Delegated or pass-through verification
    pub verifier_mode: VerifierMode,
}

impl PaywallConfig {
    /// Create a new paywall config in delegated mode
    pub fn new(pay_to: impl Into<String>) -> Self {
        Self {
            pay_to: pay_to.into().trim().to_string(),
            facilitator: FacilitatorConfig::default(),
            verifier_mode: VerifierMode::Delegated,
        }
    }

    /// Set the facilitator configuration
    pub fn with_facilitator_config(mut self, facilitator: FacilitatorConfig) -> Self {
        self.facilitator = facilitator;
        self
    }

    /// Set the facilitator URL
    pub fn with_facilitator_url(mut self, url: impl Into<String>) -> Self {
        self.facilitator.url = url.into();
        self
    }

    /// Set the cap on facilitator calls
    pub fn with_facilitator_timeout(mut self, timeout: Duration) -> Self {
        self.facilitator.timeout = timeout;
        self
    }

    /// Select the verifier mode
    pub fn with_verifier_mode(mut self, mode: VerifierMode) -> Self {
        self.verifier_mode = mode;
        self
    }

    /// Validate the paywall configuration
    pub fn validate(&self) -> Result<()> {
        if self.pay_to.is_empty() {
            return Err(X402Error::config("Pay-to address cannot be empty"));
        }

        if !crate::types::payment::is_header_safe(&self.pay_to) {
            return Err(X402Error::config("Pay-to address must be printable ASCII"));
        }

        self.facilitator.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paywall_config_defaults() {
        let config = PaywallConfig::new("  0xabc  ");
        assert_eq!(config.pay_to, "0xabc");
        assert_eq!(config.verifier_mode, VerifierMode::Delegated);
        assert_eq!(config.facilitator.url, "https://facilitator.stableyard.fi");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_paywall_config_builder() {
        let config = PaywallConfig::new("0xabc")
            .with_facilitator_url("http://localhost:9000")
            .with_facilitator_timeout(Duration::from_secs(3))
            .with_verifier_mode(VerifierMode::PassThrough);

        assert_eq!(config.facilitator.url, "http://localhost:9000");
        assert_eq!(config.facilitator.timeout, Duration::from_secs(3));
        assert_eq!(config.verifier_mode, VerifierMode::PassThrough);
    }

    #[test]
    fn test_paywall_config_validation() {
        assert!(PaywallConfig::new("").validate().is_err());
        assert!(PaywallConfig::new("0xabc")
            .with_facilitator_url("facilitator.stableyard.fi")
            .validate()
            .is_err());
    }
}
