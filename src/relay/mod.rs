use axum::{
    body::Bytes,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::{config::RelayConfig, error::RelayError};

mod client;
mod downstream;
mod signing;

pub use client::build_client;
pub use downstream::{
    Downstream, DownstreamResponse, ForwardedRequest, HttpDownstream, SIGNATURE_HEADER,
    SOURCE_HEADER, SOURCE_TAG,
};
pub use signing::sign_body;

/// Fixed webhook path appended to the configured base URL.
pub const WEBHOOK_PATH: &str = "/webhook/clean2";

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type,X-Agent-HMAC,X-Source";
pub const CORS_ALLOW_METHODS: &str = "POST,OPTIONS";

/// Signed in place of a missing or empty body.
const EMPTY_BODY: &[u8] = b"{}";

pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(3);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(CORS_ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    headers
}

/// Strips at most one trailing slash from `base` and appends [`WEBHOOK_PATH`].
pub fn destination_url(base: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    format!("{base}{WEBHOOK_PATH}")
}

/// Status, headers and body handed back to the original caller.
#[derive(Debug, Clone)]
pub struct RelayReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RelayReply {
    fn preflight() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: cors_headers(),
            body: None,
        }
    }

    fn method_not_allowed() -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            headers: cors_headers(),
            body: Some("Method not allowed".to_string()),
        }
    }

    /// 2xx collapses to 200; everything else passes through untouched.
    fn relayed(response: DownstreamResponse) -> Self {
        let status = if response.status.is_success() {
            StatusCode::OK
        } else {
            response.status
        };
        Self {
            status,
            headers: cors_headers(),
            body: Some(response.body),
        }
    }
}

impl From<&RelayError> for RelayReply {
    fn from(err: &RelayError) -> Self {
        let mut headers = cors_headers();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers,
            body: Some(json!({ "error": err.to_string() }).to_string()),
        }
    }
}

impl IntoResponse for RelayReply {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, self.headers, body).into_response(),
            None => (self.status, self.headers).into_response(),
        }
    }
}

/// Stateless signer and forwarder. Cloning shares the downstream client.
#[derive(Clone)]
pub struct SignedRelay {
    config: RelayConfig,
    downstream: Arc<dyn Downstream>,
}

impl SignedRelay {
    pub fn new(config: RelayConfig, downstream: Arc<dyn Downstream>) -> Self {
        Self { config, downstream }
    }

    /// Relay backed by a real HTTP client.
    pub fn over_http(config: RelayConfig) -> Result<Self, RelayError> {
        let client = build_client()?;
        Ok(Self::new(config, Arc::new(HttpDownstream::new(client))))
    }

    /// Dispatches on method. Only `POST` reaches the downstream target.
    pub async fn handle(&self, method: &Method, body: Option<Bytes>) -> RelayReply {
        if method == Method::OPTIONS {
            debug!("Answering CORS preflight");
            return RelayReply::preflight();
        }
        if method != Method::POST {
            debug!(method = %method, "Rejecting method");
            return RelayReply::method_not_allowed();
        }

        match self.forward(body).await {
            Ok(response) => RelayReply::relayed(response),
            Err(e) => {
                error!(error = %e, "Relay failed");
                RelayReply::from(&e)
            }
        }
    }

    async fn forward(&self, body: Option<Bytes>) -> Result<DownstreamResponse, RelayError> {
        let body = body
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| Bytes::from_static(EMPTY_BODY));
        let signature = sign_body(&self.config.secret, &body)?;
        let url = destination_url(&self.config.base_url);
        let body_len = body.len();

        let response = self
            .downstream
            .forward(ForwardedRequest {
                url: url.clone(),
                signature,
                body,
            })
            .await?;

        info!(
            destination = %url,
            status = response.status.as_u16(),
            request_len = body_len,
            response_len = response.body.len(),
            "Relayed request"
        );
        Ok(response)
    }
}
