//! Error types for the x402 payment gate

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Result type alias for x402 operations
pub type Result<T> = std::result::Result<T, X402Error>;

/// Errors produced by the payment gate, its verifier and the server around it
#[derive(Debug, thiserror::Error)]
pub enum X402Error {
    /// Invalid startup configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The X-PAYMENT header could not be parsed
    #[error("Invalid payment payload: {message}")]
    InvalidPaymentPayload { message: String },

    /// The facilitator declined the payment
    #[error("Payment verification failed: {reason}")]
    PaymentVerificationFailed { reason: String },

    /// The facilitator did not answer within the allotted time
    #[error("Facilitator timeout after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Unexpected fault inside the gate itself
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl X402Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_payment_payload(message: impl Into<String>) -> Self {
        Self::InvalidPaymentPayload {
            message: message.into(),
        }
    }

    pub fn payment_verification_failed(reason: impl Into<String>) -> Self {
        Self::PaymentVerificationFailed {
            reason: reason.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error belongs to the payment decision rather than to
    /// the server itself. Payment failures are reported to clients as 402.
    pub fn is_payment_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidPaymentPayload { .. }
                | Self::PaymentVerificationFailed { .. }
                | Self::Timeout { .. }
                | Self::Http(_)
        )
    }

    /// HTTP status used when this error reaches the client
    pub fn status_code(&self) -> StatusCode {
        if self.is_payment_failure() {
            StatusCode::PAYMENT_REQUIRED
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for X402Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::PAYMENT_REQUIRED {
            // Details stay in the logs; the payer only learns that it failed.
            tracing::warn!(error = %self, "Payment failure surfaced as 402");
            (
                status,
                Json(json!({
                    "error": crate::types::constants::messages::VERIFICATION_FAILED,
                    "message": crate::types::constants::messages::VERIFICATION_FAILED_DETAIL,
                })),
            )
                .into_response()
        } else {
            tracing::error!(error = %self, "Internal server error");
            (
                status,
                Json(json!({
                    "success": false,
                    "error": "Internal server error",
                })),
            )
                .into_response()
        }
    }
}
