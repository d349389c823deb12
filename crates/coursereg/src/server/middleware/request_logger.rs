use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use rand::Rng;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, Instrument};

pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Logs every request with a correlation ID, which is also echoed back in
/// the `x-correlation-id` response header.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let correlation_id = generate_correlation_id();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let span = tracing::info_span!("request", correlation_id = %correlation_id);
    let mut response = next.run(req).instrument(span.clone()).await;

    span.in_scope(|| {
        info!(
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }

    response
}

fn generate_correlation_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}
