//! HTTP request tracing for axum routers.

use axum::extract::Request;
use axum::response::Response;
use std::time::Duration;
use tower_http::classify::{ServerErrorsAsFailures, ServerErrorsFailureClass, SharedClassifier};
use tower_http::trace::{DefaultOnBodyChunk, DefaultOnEos, TraceLayer};
use tracing::{Span, error, info, warn};

/// Concrete type of the layer returned by [`trace_requests`].
pub type RequestTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    fn(&Request) -> Span,
    fn(&Request, &Span),
    fn(&Response, Duration, &Span),
    DefaultOnBodyChunk,
    DefaultOnEos,
    fn(ServerErrorsFailureClass, Duration, &Span),
>;

/// Create a tracing layer that opens one span per request and logs its outcome.
///
/// # Example
///
/// ```
/// use ner::logging::trace_requests;
///
/// let app: axum::Router = axum::Router::new().layer(trace_requests());
/// ```
pub fn trace_requests() -> RequestTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(make_request_span as fn(&Request) -> Span)
        .on_request(log_request as fn(&Request, &Span))
        .on_response(log_response as fn(&Response, Duration, &Span))
        .on_failure(log_failure as fn(ServerErrorsFailureClass, Duration, &Span))
}

fn make_request_span(request: &Request) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        version = ?request.version(),
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    )
}

fn log_request(request: &Request, _span: &Span) {
    info!("Started {} request to {}", request.method(), request.uri());
}

fn log_response(response: &Response, latency: Duration, span: &Span) {
    let status = response.status().as_u16();
    span.record("status", status);
    span.record("latency_ms", latency.as_millis() as u64);

    // 5xx responses are reported once, by `log_failure`
    if status < 400 {
        info!("Completed request with status {} in {:?}", status, latency);
    } else if status < 500 {
        warn!("Request error (client): status {} in {:?}", status, latency);
    }
}

fn log_failure(failure: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
    error!(error = %failure, latency_ms = latency.as_millis() as u64, "Request processing failed");
}
