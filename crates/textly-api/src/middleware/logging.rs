use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// One line per request with method, path, status and latency
///
/// For streamed responses the latency covers the time to first byte only.
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(%method, %uri, status = status.as_u16(), duration_ms, "Request completed");
    } else if status.is_client_error() {
        tracing::warn!(%method, %uri, status = status.as_u16(), duration_ms, "Request completed");
    } else {
        tracing::info!(%method, %uri, status = status.as_u16(), duration_ms, "Request completed");
    }
    response
}
