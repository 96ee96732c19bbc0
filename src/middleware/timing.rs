//! Request timing and access logging.

use std::time::Instant;

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::info;

pub const PROCESS_TIME_HEADER: &str = "x-process-time";

/// Logs each request and sets `X-Process-Time` to the elapsed seconds.
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let mut response = next.run(req).await;

    let elapsed = started.elapsed().as_secs_f64();
    info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        elapsed_secs = elapsed,
        "Handled request"
    );
    if let Ok(value) = HeaderValue::from_str(&format!("{:.6}", elapsed)) {
        response.headers_mut().insert(PROCESS_TIME_HEADER, value);
    }
    response
}
