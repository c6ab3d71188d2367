use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::Method,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::relay::SignedRelay;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Only `POST` bodies are buffered, so the body limit never shadows the
/// preflight or the 405.
pub async fn relay_request(State(relay): State<SignedRelay>, req: Request) -> Response {
    let method = req.method().clone();
    if method != Method::POST {
        return relay.handle(&method, None).await.into_response();
    }

    match Bytes::from_request(req, &()).await {
        Ok(body) => relay.handle(&method, Some(body)).await.into_response(),
        Err(rejection) => rejection.into_response(),
    }
}
