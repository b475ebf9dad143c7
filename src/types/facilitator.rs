//! Facilitator configuration and wire types

use super::constants::{DEFAULT_FACILITATOR_TIMEOUT_SECS, DEFAULT_FACILITATOR_URL};
use super::payment::{PaymentArtifact, PaymentTerms, TokenAmount};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Facilitator configuration
#[derive(Clone)]
pub struct FacilitatorConfig {
    /// Base URL of the facilitator service
    pub url: String,
    /// Upper bound for a single facilitator call
    pub timeout: Duration,
    /// Bearer token sent with verification requests
    pub api_key: Option<String>,
}

impl std::fmt::Debug for FacilitatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilitatorConfig")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl FacilitatorConfig {
    /// Create a new facilitator config
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(DEFAULT_FACILITATOR_TIMEOUT_SECS),
            api_key: None,
        }
    }

    /// Validate the facilitator configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.url.is_empty() {
            return Err(crate::X402Error::config("Facilitator URL cannot be empty"));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(crate::X402Error::config(
                "Facilitator URL must start with http:// or https://",
            ));
        }

        url::Url::parse(&self.url)?;

        if !super::payment::is_header_safe(&self.url) {
            return Err(crate::X402Error::config(
                "Facilitator URL must be printable ASCII",
            ));
        }

        if self.timeout.is_zero() {
            return Err(crate::X402Error::config(
                "Facilitator timeout must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Set the request timeout cap
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl Default for FacilitatorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FACILITATOR_URL)
    }
}

/// Body of `POST <facilitator>/verify`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest<'a> {
    pub payment: &'a PaymentArtifact,
    pub pay_to: &'a str,
    pub network: &'a str,
    pub asset: &'a str,
    pub max_amount_required: &'a TokenAmount,
}

impl<'a> VerifyRequest<'a> {
    /// Build the verification request for an artifact against quoted terms
    pub fn new(payment: &'a PaymentArtifact, terms: &'a PaymentTerms) -> Self {
        Self {
            payment,
            pay_to: &terms.pay_to,
            network: &terms.network,
            asset: &terms.asset,
            max_amount_required: &terms.max_amount_required,
        }
    }
}

/// Payment verification response.
///
/// Facilitators that only signal the verdict through the status code return
/// an empty body, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Whether the payment is valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_valid: Option<bool>,
    /// Reason for invalidity (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    /// Payer's address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

impl VerifyResponse {
    /// Read the body of a 2xx `/verify` answer.
    ///
    /// An empty body defers to the status. Anything else must be a JSON object
    /// whose `isValid`, when present, is a boolean. Every other shape is a
    /// decline. `invalidReason` and `payer` are informational and never fail
    /// the parse.
    pub fn from_body(body: &[u8]) -> crate::Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body).map_err(|e| {
            crate::X402Error::payment_verification_failed(format!(
                "Unreadable facilitator response: {}",
                e
            ))
        })?;
        let Value::Object(fields) = value else {
            return Err(crate::X402Error::payment_verification_failed(
                "Facilitator response is not a JSON object",
            ));
        };

        let is_valid = match fields.get("isValid") {
            None => None,
            Some(Value::Bool(valid)) => Some(*valid),
            Some(other) => {
                return Err(crate::X402Error::payment_verification_failed(format!(
                    "Facilitator returned non-boolean isValid: {}",
                    other
                )))
            }
        };

        Ok(Self {
            is_valid,
            invalid_reason: fields.get("invalidReason").and_then(text),
            payer: fields.get("payer").and_then(text),
        })
    }

    /// Approves unless the body explicitly says otherwise
    pub fn is_approved(&self) -> bool {
        self.is_valid != Some(false)
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_facilitator_config_validate() {
        assert!(FacilitatorConfig::default().validate().is_ok());
        assert!(FacilitatorConfig::new("").validate().is_err());
        assert!(FacilitatorConfig::new("ftp://facilitator").validate().is_err());
        assert!(FacilitatorConfig::new("https://facilitator.stableyard.fi")
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_facilitator_config_debug_redacts_key() {
        let config = FacilitatorConfig::default().with_api_key("super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_verify_request_shape() {
        let artifact: PaymentArtifact = r#"{"sig":"0x01"}"#.parse().unwrap();
        let terms = crate::types::PaymentRequirement::new(
            "movement",
            "0x1::aptos_coin::AptosCoin",
            "100000000".parse().unwrap(),
            "coupon",
        )
        .quote("0xpayee", "https://facilitator.stableyard.fi");

        let body = serde_json::to_value(VerifyRequest::new(&artifact, &terms)).unwrap();
        assert_eq!(
            body,
            json!({
                "payment": {"sig": "0x01"},
                "payTo": "0xpayee",
                "network": "movement",
                "asset": "0x1::aptos_coin::AptosCoin",
                "maxAmountRequired": "100000000"
            })
        );
    }

    #[test]
    fn test_verify_response_verdict() {
        let empty = VerifyResponse::from_body(b"").unwrap();
        assert!(empty.is_approved());
        assert!(VerifyResponse::from_body(b" \n").unwrap().is_approved());
        assert!(VerifyResponse::from_body(b"{}").unwrap().is_approved());

        let declined =
            VerifyResponse::from_body(br#"{"isValid": false, "invalidReason": "expired"}"#)
                .unwrap();
        assert!(!declined.is_approved());
        assert_eq!(declined.invalid_reason.as_deref(), Some("expired"));
    }

    #[test]
    fn test_verify_response_tolerates_odd_detail_fields() {
        let declined = VerifyResponse::from_body(
            br#"{"isValid": false, "invalidReason": {"code": "insufficient_funds"}, "payer": 42}"#,
        )
        .unwrap();
        assert!(!declined.is_approved());
        assert!(declined
            .invalid_reason
            .unwrap()
            .contains("insufficient_funds"));
        assert_eq!(declined.payer.as_deref(), Some("42"));
    }

    #[test]
    fn test_verify_response_rejects_unexpected_shapes() {
        let bodies: [&[u8]; 7] = [
            br#"{"isValid": "false"}"#,
            br#"{"isValid": null}"#,
            br#"{"isValid": 0}"#,
            br#"{"isValid": "true"}"#,
            b"OK",
            b"[true]",
            b"\"valid\"",
        ];
        for body in bodies {
            let result = VerifyResponse::from_body(body);
            assert!(
                matches!(
                    result,
                    Err(crate::X402Error::PaymentVerificationFailed { .. })
                ),
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }
}
