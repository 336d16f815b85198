//! Request span middleware.
//!
//! Wraps every request in an `api_request` span, logs completion with status
//! and latency, and feeds the outcome into [`GatewayMetrics`].

use super::metrics::{GatewayMetrics, RequestOutcome};
use axum::http::{Request, Response};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{info, info_span, warn, Instrument, Span};

/// Layer that creates a span for each request
#[derive(Clone)]
pub struct RequestSpanLayer {
    metrics: Arc<GatewayMetrics>,
}

impl RequestSpanLayer {
    pub fn new(metrics: Arc<GatewayMetrics>) -> Self {
        Self { metrics }
    }
}

impl<S> Layer<S> for RequestSpanLayer {
    type Service = RequestSpanService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestSpanService {
            inner,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Request span service
#[derive(Clone)]
pub struct RequestSpanService<S> {
    inner: S,
    metrics: Arc<GatewayMetrics>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestSpanService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: 'static,
    ReqBody: Send + 'static,
    ResBody: 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // Take the service that was driven to readiness
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let metrics = Arc::clone(&self.metrics);

        let span = info_span!(
            "api_request",
            http.method = %req.method(),
            http.target = %req.uri().path(),
            http.status = tracing::field::Empty,
        );

        Box::pin(
            async move {
                let started = Instant::now();
                let result = inner.call(req).await;
                let latency_ms = started.elapsed().as_millis() as u64;

                match &result {
                    Ok(response) => {
                        let status = response.status();
                        Span::current().record("http.status", status.as_u16());

                        let outcome = if status.is_server_error() {
                            RequestOutcome::ServerError
                        } else if status.is_client_error() {
                            RequestOutcome::ClientError
                        } else {
                            RequestOutcome::Success
                        };
                        metrics.record_request(outcome, latency_ms);

                        if outcome == RequestOutcome::ServerError {
                            warn!(status = status.as_u16(), latency_ms, "Request failed");
                        } else {
                            info!(status = status.as_u16(), latency_ms, "Request completed");
                        }
                    }
                    Err(_) => {
                        metrics.record_request(RequestOutcome::ServerError, latency_ms);
                        warn!(latency_ms, "Request errored in inner service");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
