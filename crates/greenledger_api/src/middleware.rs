//! Request-level logging middleware.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::{error, info, warn};
use std::time::Instant;

/// Emits one `http_request` event per request with status and duration.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        error!(
            "event=http_request module=api status=error method={method} path={path} http_status={} duration_ms={duration_ms}",
            status.as_u16()
        );
    } else if status.is_client_error() {
        warn!(
            "event=http_request module=api status=rejected method={method} path={path} http_status={} duration_ms={duration_ms}",
            status.as_u16()
        );
    } else {
        info!(
            "event=http_request module=api status=ok method={method} path={path} http_status={} duration_ms={duration_ms}",
            status.as_u16()
        );
    }

    response
}
