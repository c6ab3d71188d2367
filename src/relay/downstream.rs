use async_trait::async_trait;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use tracing::debug;

use crate::error::RelayError;

pub const SIGNATURE_HEADER: &str = "x-agent-hmac";
pub const SOURCE_HEADER: &str = "x-source";
pub const SOURCE_TAG: &str = "site";

/// The single outbound request a POST produces.
#[derive(Debug, Clone)]
pub struct ForwardedRequest {
    pub url: String,
    pub signature: String,
    pub body: Bytes,
}

impl ForwardedRequest {
    pub fn headers(&self) -> Result<HeaderMap, RelayError> {
        let signature = HeaderValue::from_str(&self.signature)
            .map_err(|e| RelayError::InvalidHeader {
                name: SIGNATURE_HEADER,
                reason: e.to_string(),
            })?;

        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(HeaderName::from_static(SIGNATURE_HEADER), signature);
        headers.insert(
            HeaderName::from_static(SOURCE_HEADER),
            HeaderValue::from_static(SOURCE_TAG),
        );
        Ok(headers)
    }
}

/// What came back from the downstream target, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamResponse {
    pub status: StatusCode,
    pub body: String,
}

#[async_trait]
pub trait Downstream: Send + Sync {
    /// Performs the outbound call. Non-2xx statuses are a successful
    /// `DownstreamResponse`, only transport failures are errors.
    async fn forward(&self, request: ForwardedRequest) -> Result<DownstreamResponse, RelayError>;
}

/// Forwards over HTTP with a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpDownstream {
    client: reqwest::Client,
}

impl HttpDownstream {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Downstream for HttpDownstream {
    async fn forward(&self, request: ForwardedRequest) -> Result<DownstreamResponse, RelayError> {
        let url = reqwest::Url::parse(&request.url).map_err(|e| {
            RelayError::InvalidDestination {
                url: request.url.clone(),
                reason: e.to_string(),
            }
        })?;
        let headers = request.headers()?;

        debug!(url = %url, body_len = request.body.len(), "Sending downstream request");
        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Ok(DownstreamResponse { status, body })
    }
}
