use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

pub const REQUESTS_TOTAL: &str = "relay_requests_total";
pub const REQUEST_DURATION: &str = "relay_request_duration_seconds";

/// Wraps every request in a span tagged with a fresh request id and records
/// a count and latency per method/status once the response is ready.
pub async fn request_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = Uuid::new_v4();

    let span = info_span!("request", %request_id, %method, %path);
    let response = async {
        debug!("Received request");
        next.run(req).await
    }
    .instrument(span.clone())
    .await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(REQUEST_DURATION, "method" => method).record(latency.as_secs_f64());

    span.in_scope(|| {
        info!(
            status,
            latency_ms = latency.as_millis() as u64,
            "Request completed"
        );
    });

    response
}
