//! Demo handlers served behind the paywall gate

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::sync::Arc;

/// Default target of the premium content redirect
pub const DEFAULT_PREMIUM_REDIRECT_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// State shared by the demo handlers
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    pay_to: String,
    premium_redirect_url: String,
}

impl AppState {
    pub fn new(pay_to: impl Into<String>, premium_redirect_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pay_to: pay_to.into(),
                premium_redirect_url: premium_redirect_url.into(),
            }),
        }
    }

    pub fn pay_to(&self) -> &str {
        &self.inner.pay_to
    }

    pub fn premium_redirect_url(&self) -> &str {
        &self.inner.premium_redirect_url
    }
}

/// `GET /`
pub async fn root(State(state): State<AppState>) -> String {
    format!(
        "Movement x402 payment server. Payments go to {}. Request /api/premium-content to try it.",
        state.pay_to()
    )
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// `GET /api/premium-content`. Only reached once the gate approved the payment.
pub async fn premium_content(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!(location = state.premium_redirect_url(), "Serving premium content");
    (
        StatusCode::FOUND,
        [(header::LOCATION, state.premium_redirect_url().to_string())],
    )
}
