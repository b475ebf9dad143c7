//! Paywall gate implementation

use super::config::PaywallConfig;
use crate::policy::RoutePolicy;
use crate::types::constants::{headers, messages};
use crate::types::{PaymentArtifact, PaymentRequirement, PaymentTerms};
use crate::verifier::{create_verifier, PaymentVerifier, RejectReason, VerificationOutcome};
use crate::Result;
use axum::{
    extract::{Request, State},
    http::{
        header::ACCESS_CONTROL_EXPOSE_HEADERS, HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

/// Decides, per request, whether a payment is required and whether the one
/// presented is good enough.
///
/// Holds only read-only state: the route policy, the paywall config and the
/// verifier. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct PaywallGate {
    policy: Arc<RoutePolicy>,
    config: Arc<PaywallConfig>,
    verifier: Arc<dyn PaymentVerifier>,
}

/// What the gate decided for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentResult {
    /// The route is not protected
    Free,
    /// Payment verified; the request may proceed
    Approved { terms: PaymentTerms },
    /// No X-PAYMENT header on a protected route
    PaymentRequired { terms: PaymentTerms },
    /// A payment was presented and refused
    Rejected {
        terms: PaymentTerms,
        reason: RejectReason,
    },
}

impl PaywallGate {
    /// Create a gate, building the verifier selected by the config
    pub fn new(policy: RoutePolicy, config: PaywallConfig) -> Result<Self> {
        config.validate()?;
        let verifier = create_verifier(config.verifier_mode, &config.facilitator)?;
        Ok(Self::with_verifier(policy, config, verifier))
    }

    /// Create a gate around an existing verifier
    pub fn with_verifier(
        policy: RoutePolicy,
        config: PaywallConfig,
        verifier: Arc<dyn PaymentVerifier>,
    ) -> Self {
        Self {
            policy: Arc::new(policy),
            config: Arc::new(config),
            verifier,
        }
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    pub fn config(&self) -> &PaywallConfig {
        &self.config
    }

    pub fn verifier(&self) -> &dyn PaymentVerifier {
        self.verifier.as_ref()
    }

    /// The requirement guarding a route.
    ///
    /// This is the one exception to exact method keying: axum answers `HEAD`
    /// with the `GET` handler, so a `HEAD` request falls back to the `GET`
    /// entry unless the policy lists `HEAD` itself. Every other method only
    /// matches its own entry.
    fn requirement_for(&self, method: &Method, path: &str) -> Option<&PaymentRequirement> {
        self.policy.lookup(method, path).or_else(|| {
            if method == Method::HEAD {
                self.policy.lookup(&Method::GET, path)
            } else {
                None
            }
        })
    }

    /// Quote the terms for a requirement with the current receiving address
    pub fn quote(&self, requirement: &PaymentRequirement) -> PaymentTerms {
        requirement.quote(&self.config.pay_to, &self.config.facilitator.url)
    }

    /// Decide what to do with a request, without running any handler
    pub async fn evaluate(
        &self,
        method: &Method,
        path: &str,
        request_headers: &HeaderMap,
    ) -> PaymentResult {
        let Some(requirement) = self.requirement_for(method, path) else {
            return PaymentResult::Free;
        };
        let terms = self.quote(requirement);

        // HeaderMap::get returns the first value when the header repeats.
        let Some(header) = request_headers.get(headers::X_PAYMENT) else {
            tracing::debug!(%method, path, "Payment required: no X-PAYMENT header");
            return PaymentResult::PaymentRequired { terms };
        };

        let artifact = match PaymentArtifact::from_header(header) {
            Ok(artifact) => artifact,
            Err(e) => {
                let reason = RejectReason::Malformed(e.to_string());
                tracing::warn!(%method, path, %reason, "Rejecting payment");
                return PaymentResult::Rejected { terms, reason };
            }
        };

        match self.verifier.verify(&artifact, &terms).await {
            VerificationOutcome::Approved => {
                tracing::info!(
                    %method,
                    path,
                    mode = %self.verifier.mode(),
                    "Payment approved"
                );
                PaymentResult::Approved { terms }
            }
            VerificationOutcome::Rejected { reason } => {
                match &reason {
                    RejectReason::Unavailable(_) => tracing::error!(
                        %method,
                        path,
                        facilitator = %terms.facilitator_url,
                        %reason,
                        "Payment could not be verified"
                    ),
                    _ => tracing::warn!(%method, path, %reason, "Rejecting payment"),
                }
                PaymentResult::Rejected { terms, reason }
            }
        }
    }

    /// Run the gate in front of `next`.
    ///
    /// `next` is called at most once, and only for free routes or approved
    /// payments. Its response and errors are returned untouched.
    pub async fn intercept<B, F, Fut, E>(
        &self,
        request: axum::http::Request<B>,
        next: F,
    ) -> std::result::Result<Response, E>
    where
        F: FnOnce(axum::http::Request<B>) -> Fut,
        Fut: Future<Output = std::result::Result<Response, E>>,
    {
        let (parts, body) = request.into_parts();
        let decision = self
            .evaluate(&parts.method, parts.uri.path(), &parts.headers)
            .await;

        match decision {
            PaymentResult::Free | PaymentResult::Approved { .. } => {
                next(axum::http::Request::from_parts(parts, body)).await
            }
            PaymentResult::PaymentRequired { terms } => Ok(self
                .create_payment_required_response(&terms)
                .unwrap_or_else(IntoResponse::into_response)),
            PaymentResult::Rejected { terms, .. } => Ok(self
                .create_rejected_response(&terms)
                .unwrap_or_else(IntoResponse::into_response)),
        }
    }

    /// 402 for a request that carried no payment
    fn create_payment_required_response(&self, terms: &PaymentTerms) -> Result<Response> {
        self.create_402(
            terms,
            messages::PAYMENT_REQUIRED,
            messages::PAYMENT_REQUIRED_DETAIL,
        )
    }

    /// 402 for a malformed, declined or unverifiable payment. All three look
    /// the same to the client.
    fn create_rejected_response(&self, terms: &PaymentTerms) -> Result<Response> {
        self.create_402(
            terms,
            messages::VERIFICATION_FAILED,
            messages::VERIFICATION_FAILED_DETAIL,
        )
    }

    fn create_402(&self, terms: &PaymentTerms, error: &str, message: &str) -> Result<Response> {
        let terms_header = terms.to_header_value().map_err(|e| {
            tracing::error!(error = %e, network = %terms.network, "Failed to encode payment terms");
            e
        })?;

        let mut response = (
            StatusCode::PAYMENT_REQUIRED,
            Json(json!({
                "error": error,
                "message": message,
            })),
        )
            .into_response();

        let response_headers = response.headers_mut();
        response_headers.insert(headers::X_PAYMENT_RESPONSE_NAME, terms_header);
        response_headers.insert(
            ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static(headers::X_PAYMENT_RESPONSE),
        );

        Ok(response)
    }
}

/// Axum middleware function for the paywall gate
pub async fn paywall_middleware(
    State(gate): State<PaywallGate>,
    request: Request,
    next: Next,
) -> Response {
    gate.intercept(request, |request| async move {
        Ok::<_, Infallible>(next.run(request).await)
    })
    .await
    .unwrap_or_else(|never| match never {})
}
