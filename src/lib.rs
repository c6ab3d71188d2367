//! Stateless relay that signs inbound request bodies with HMAC-SHA256 and
//! forwards them to a workflow-automation webhook.
//!
//! `OPTIONS` answers the CORS preflight, `POST` is signed and forwarded to
//! `{N8N_WEBHOOK_BASE}/webhook/clean2`, anything else gets a 405. The
//! downstream status and body come back to the caller as-is (2xx collapses
//! to 200); transport failures become a 500 with `{"error": ...}`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod relay;
pub mod telemetry;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    middleware::from_fn,
    routing::get,
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

pub use crate::{
    config::{AppConfig, RelayConfig},
    error::{AppError, RelayError},
    relay::{RelayReply, SignedRelay},
};

use crate::relay::{CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN};

/// Builds the HTTP surface: `GET /health` plus the relay for every other
/// method and path.
pub fn app(relay: SignedRelay, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            "/health",
            get(handlers::health_check).fallback(handlers::relay_request),
        )
        .fallback(handlers::relay_request)
        .with_state(relay)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(from_fn(telemetry::request_metrics))
        // Covers responses the relay never sees, such as body-limit rejections.
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ))
}
