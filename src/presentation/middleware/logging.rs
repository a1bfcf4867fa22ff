//! Request Logging and Metrics
//!
//! `tower-http` trace layer with one span per request, plus a middleware
//! feeding the Prometheus HTTP counters.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    http::Response,
    middleware::Next,
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultOnRequest, TraceLayer},
};
use tracing::Span;

use crate::infrastructure::metrics;

/// Trace layer: span with method and path, status recorded on response.
#[allow(clippy::type_complexity)]
pub fn create_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> Span + Clone,
    DefaultOnRequest,
    impl Fn(&Response<Body>, Duration, &Span) + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                uri = %req.uri().path(),
                status = tracing::field::Empty,
                latency_ms = tracing::field::Empty,
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, span: &Span| {
            let status = res.status();
            span.record("status", tracing::field::display(status));
            span.record("latency_ms", latency.as_millis() as u64);

            if status.is_server_error() {
                tracing::error!(%status, "response");
            } else {
                tracing::info!(%status, "response");
            }
        })
}

/// Record count and latency of every routed request.
pub async fn track_metrics(request: Request, next: Next) -> Response<Body> {
    let start = Instant::now();
    let method = request.method().to_string();
    // route template keeps label cardinality bounded
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;

    metrics::record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
