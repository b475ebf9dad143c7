//! Tower service layer for the paywall gate

use super::payment::PaywallGate;
use axum::response::Response;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Tower layer that puts a [`PaywallGate`] in front of a service
#[derive(Debug, Clone)]
pub struct PaywallLayer {
    gate: PaywallGate,
}

impl PaywallLayer {
    pub fn new(gate: PaywallGate) -> Self {
        Self { gate }
    }
}

impl<S> tower::Layer<S> for PaywallLayer {
    type Service = PaywallService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PaywallService {
            inner,
            gate: self.gate.clone(),
        }
    }
}

/// Tower service for the paywall gate
#[derive(Debug, Clone)]
pub struct PaywallService<S> {
    inner: S,
    gate: PaywallGate,
}

impl<S, ReqBody> tower::Service<http::Request<ReqBody>> for PaywallService<S>
where
    S: tower::Service<http::Request<ReqBody>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<ReqBody>) -> Self::Future {
        // Keep the service that was polled ready; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let gate = self.gate.clone();

        Box::pin(async move { gate.intercept(req, |req| inner.call(req)).await })
    }
}
