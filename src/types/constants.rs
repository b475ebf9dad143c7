//! Common constants for headers, networks and assets

/// HTTP header names used by the x402 gate
pub mod headers {
    use http::HeaderName;

    /// Request header carrying the client's payment proof
    pub const X_PAYMENT: &str = "X-PAYMENT";
    /// Response header carrying the serialized payment terms
    pub const X_PAYMENT_RESPONSE: &str = "X-PAYMENT-RESPONSE";

    /// [`X_PAYMENT`] as a typed header name
    pub const X_PAYMENT_NAME: HeaderName = HeaderName::from_static("x-payment");
    /// [`X_PAYMENT_RESPONSE`] as a typed header name
    pub const X_PAYMENT_RESPONSE_NAME: HeaderName =
        HeaderName::from_static("x-payment-response");

}

/// Known network identifiers
pub mod networks {
    /// Movement network
    pub const MOVEMENT: &str = "movement";

    /// Check if a network is known to this server
    pub fn is_supported(network: &str) -> bool {
        matches!(network, MOVEMENT)
    }
}

/// Known asset identifiers
pub mod assets {
    /// Native MOVE coin, addressed through the Aptos coin module
    pub const APTOS_COIN: &str = "0x1::aptos_coin::AptosCoin";
}

/// Client-facing messages for 402 responses
pub mod messages {
    pub const PAYMENT_REQUIRED: &str = "Payment Required";
    pub const PAYMENT_REQUIRED_DETAIL: &str = "Please include X-PAYMENT header with payment proof";
    pub const VERIFICATION_FAILED: &str = "Payment verification failed";
    pub const VERIFICATION_FAILED_DETAIL: &str = "Invalid or insufficient payment";
}

/// Default facilitator URL
pub const DEFAULT_FACILITATOR_URL: &str = "https://facilitator.stableyard.fi";

/// Default cap on a single facilitator call, in seconds
pub const DEFAULT_FACILITATOR_TIMEOUT_SECS: u64 = 30;

/// Default listening port
pub const DEFAULT_PORT: u16 = 4402;

/// Default MIME type of a protected resource
pub const DEFAULT_MIME_TYPE: &str = "application/json";

/// Default validity of quoted terms, in seconds
pub const DEFAULT_MAX_TIMEOUT_SECONDS: u32 = 60;
