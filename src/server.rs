//! HTTP server assembly
//!
//! Builds the axum router (demo handlers behind the paywall gate, CORS,
//! request tracing, panic recovery) and runs it until Ctrl-C or SIGTERM.

use crate::config::ServerSettings;
use crate::error::X402Error;
use crate::handlers::{self, AppState};
use crate::middleware::{paywall_middleware, PaywallGate};
use crate::policy::PREMIUM_CONTENT_PATH;
use crate::types::constants::headers;
use crate::verifier::VerifierMode;
use crate::Result;
use axum::{
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::any::Any;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};

/// Build the application router from the startup settings
pub fn build_app(settings: &ServerSettings) -> Result<Router> {
    let policy = settings.load_policy()?;
    tracing::info!(
        pay_to = %settings.paywall.pay_to,
        facilitator = %settings.paywall.facilitator.url,
        mode = %settings.paywall.verifier_mode,
        routes = policy.len(),
        "Loaded payment configuration"
    );
    for (route, requirement) in policy.routes() {
        tracing::debug!(
            %route,
            network = %requirement.network,
            amount = %requirement.max_amount_required,
            "Protected route"
        );
    }

    if settings.paywall.verifier_mode == VerifierMode::PassThrough {
        tracing::warn!(
            "X402_VERIFIER_MODE=pass-through: any well-formed X-PAYMENT header unlocks protected routes"
        );
    }

    let gate = PaywallGate::new(policy, settings.paywall.clone())?;
    let state = AppState::new(
        settings.paywall.pay_to.clone(),
        settings.premium_redirect_url.clone(),
    );
    let cors = cors_layer(&settings.cors_allowed_origin)?;

    Ok(with_layers(routes(state), gate, cors))
}

fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(PREMIUM_CONTENT_PATH, get(handlers::premium_content))
        .with_state(state)
}

/// Wrap routes with the gate (innermost), panic recovery, CORS and tracing.
fn with_layers(routes: Router, gate: PaywallGate, cors: CorsLayer) -> Router {
    routes
        .layer(axum::middleware::from_fn_with_state(gate, paywall_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS policy for browser clients. `*` allows any origin.
pub fn cors_layer(allowed_origin: &str) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, headers::X_PAYMENT_NAME])
        .expose_headers([headers::X_PAYMENT_RESPONSE_NAME]);

    if allowed_origin == "*" {
        return Ok(layer.allow_origin(cors::Any));
    }

    let origin = HeaderValue::from_str(allowed_origin).map_err(|_| {
        X402Error::config(format!("Invalid CORS_ALLOWED_ORIGIN: {}", allowed_origin))
    })?;
    Ok(layer.allow_origin(origin))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    X402Error::internal(format!("Handler panicked: {}", detail)).into_response()
}

/// Bind and serve until a shutdown signal arrives
pub async fn serve(settings: ServerSettings) -> Result<()> {
    let app = build_app(&settings)?;

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| X402Error::config(format!("Failed to bind to {}: {}", addr, e)))?;
    tracing::info!(
        "Payment server listening on http://{} (protected header: {})",
        addr,
        headers::X_PAYMENT
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM (Unix)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
