//! Payment-related types

use crate::types::constants::{DEFAULT_MAX_TIMEOUT_SECONDS, DEFAULT_MIME_TYPE};
use crate::{Result, X402Error};
use http::HeaderValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Amount in the asset's smallest unit, kept as a decimal string.
///
/// Only ASCII digits are accepted so the value never goes through a float.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenAmount(String);

impl TokenAmount {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TokenAmount {
    type Err = X402Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(X402Error::config(format!(
                "Amount '{}' must be a non-empty string of decimal digits",
                s
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for TokenAmount {
    type Error = X402Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TokenAmount> for String {
    fn from(amount: TokenAmount) -> Self {
        amount.0
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a protected route demands, fixed at startup.
///
/// The receiving address and facilitator endpoint are not part of this
/// struct; they are attached per request by [`PaymentRequirement::quote`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirement {
    /// Target chain/network identifier (e.g., "movement")
    pub network: String,
    /// Accepted fungible asset
    pub asset: String,
    /// Upper bound on the payable amount, in the asset's smallest unit
    pub max_amount_required: TokenAmount,
    /// Human-readable description shown to the payer
    pub description: String,
    /// Content type of the unlocked resource
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    /// How long quoted terms stay valid
    #[serde(default = "default_max_timeout_seconds")]
    pub max_timeout_seconds: u32,
}

fn default_mime_type() -> String {
    DEFAULT_MIME_TYPE.to_string()
}

fn default_max_timeout_seconds() -> u32 {
    DEFAULT_MAX_TIMEOUT_SECONDS
}

impl PaymentRequirement {
    /// Create a new payment requirement
    pub fn new(
        network: impl Into<String>,
        asset: impl Into<String>,
        max_amount_required: TokenAmount,
        description: impl Into<String>,
    ) -> Self {
        Self {
            network: network.into(),
            asset: asset.into(),
            max_amount_required,
            description: description.into(),
            mime_type: default_mime_type(),
            max_timeout_seconds: DEFAULT_MAX_TIMEOUT_SECONDS,
        }
    }

    /// Set the MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Set the maximum timeout
    pub fn with_max_timeout_seconds(mut self, max_timeout_seconds: u32) -> Self {
        self.max_timeout_seconds = max_timeout_seconds;
        self
    }

    /// Check that the terms can be advertised in a response header
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("network", self.network.as_str()),
            ("asset", self.asset.as_str()),
            ("mimeType", self.mime_type.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(X402Error::config(format!("{} cannot be empty", field)));
            }
        }

        for (field, value) in [
            ("network", self.network.as_str()),
            ("asset", self.asset.as_str()),
            ("description", self.description.as_str()),
            ("mimeType", self.mime_type.as_str()),
        ] {
            if !is_header_safe(value) {
                return Err(X402Error::config(format!(
                    "{} must be printable ASCII to fit in the {} header",
                    field,
                    super::constants::headers::X_PAYMENT_RESPONSE
                )));
            }
        }

        Ok(())
    }

    /// Attach the receiving address and facilitator endpoint
    pub fn quote(&self, pay_to: &str, facilitator_url: &str) -> PaymentTerms {
        PaymentTerms {
            network: self.network.clone(),
            pay_to: pay_to.to_string(),
            asset: self.asset.clone(),
            max_amount_required: self.max_amount_required.clone(),
            description: self.description.clone(),
            mime_type: self.mime_type.clone(),
            max_timeout_seconds: self.max_timeout_seconds,
            facilitator_url: facilitator_url.to_string(),
        }
    }
}

pub(crate) fn is_header_safe(value: &str) -> bool {
    value.bytes().all(|b| (0x20..0x7f).contains(&b))
}

/// Terms advertised to the client in the `X-PAYMENT-RESPONSE` header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTerms {
    pub network: String,
    pub pay_to: String,
    pub asset: String,
    pub max_amount_required: TokenAmount,
    pub description: String,
    pub mime_type: String,
    pub max_timeout_seconds: u32,
    pub facilitator_url: String,
}

impl PaymentTerms {
    /// Serialize the terms into a header value
    pub fn to_header_value(&self) -> Result<HeaderValue> {
        let json = serde_json::to_string(self)?;
        HeaderValue::from_str(&json).map_err(|e| {
            X402Error::internal(format!("Payment terms are not a valid header value: {}", e))
        })
    }

    /// The static part of these terms
    pub fn requirement(&self) -> PaymentRequirement {
        PaymentRequirement {
            network: self.network.clone(),
            asset: self.asset.clone(),
            max_amount_required: self.max_amount_required.clone(),
            description: self.description.clone(),
            mime_type: self.mime_type.clone(),
            max_timeout_seconds: self.max_timeout_seconds,
        }
    }
}

/// Client-supplied proof of payment from the `X-PAYMENT` header.
///
/// The schema belongs to the payment protocol; the gate only checks that the
/// header is well-formed JSON and passes the value on to the facilitator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PaymentArtifact(Value);

impl PaymentArtifact {
    /// Parse an artifact from a raw header value
    pub fn from_header(header: &HeaderValue) -> Result<Self> {
        let raw = header.to_str().map_err(|_| {
            X402Error::invalid_payment_payload("X-PAYMENT header is not visible ASCII")
        })?;
        raw.parse()
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

impl FromStr for PaymentArtifact {
    type Err = X402Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map(Self)
            .map_err(|e| X402Error::invalid_payment_payload(format!("Failed to decode payment: {}", e)))
    }
}
