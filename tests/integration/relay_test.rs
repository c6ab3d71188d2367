use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use super::common::{assert_cors, closed_port_url, expected_signature, MockWebhook, RelayServer};

#[test_log::test(tokio::test)]
async fn test_post_is_signed_and_forwarded_verbatim() {
    let webhook = MockWebhook::start(StatusCode::OK, r#"{"queued":true}"#).await;
    let relay = RelayServer::start("top-secret", &webhook.base_url()).await;

    // Odd spacing on purpose: the relay must not re-serialize.
    let body = r#"{ "to":"lead@example.com",  "subject":"Hello", "body":"Hi there" }"#;
    let response = Client::new()
        .post(&relay.url)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(response.headers());
    assert_eq!(response.text().await.unwrap(), r#"{"queued":true}"#);

    let requests = webhook.requests();
    assert_eq!(requests.len(), 1);
    let forwarded = &requests[0];
    assert_eq!(forwarded.body, body.as_bytes());
    assert_eq!(forwarded.headers["content-type"], "application/json");
    assert_eq!(forwarded.headers["x-source"], "site");
    assert_eq!(
        forwarded.headers["x-agent-hmac"],
        expected_signature("top-secret", body.as_bytes()).as_str()
    );
}

#[test_log::test(tokio::test)]
async fn test_empty_post_forwards_empty_object() {
    let webhook = MockWebhook::start(StatusCode::OK, "ok").await;
    let relay = RelayServer::start("top-secret", &webhook.base_url()).await;

    let response = Client::new().post(&relay.url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let requests = webhook.requests();
    assert_eq!(requests[0].body, &b"{}"[..]);
    assert_eq!(
        requests[0].headers["x-agent-hmac"],
        expected_signature("top-secret", b"{}").as_str()
    );
}

#[tokio::test]
async fn test_unset_secret_signs_with_empty_key() {
    let webhook = MockWebhook::start(StatusCode::OK, "ok").await;
    let relay = RelayServer::start("", &webhook.base_url()).await;

    let payload = json!({"to": "a@b.c", "subject": "s", "body": "b"}).to_string();
    let response = Client::new()
        .post(&relay.url)
        .body(payload.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        webhook.requests()[0].headers["x-agent-hmac"],
        expected_signature("", payload.as_bytes()).as_str()
    );
}

#[tokio::test]
async fn test_trailing_slash_base_reaches_webhook() {
    let webhook = MockWebhook::start(StatusCode::OK, "ok").await;
    let relay = RelayServer::start("k", &format!("{}/", webhook.base_url())).await;

    let response = Client::new().post(&relay.url).body("{}").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(webhook.requests().len(), 1);
}

#[tokio::test]
async fn test_downstream_404_is_passed_through() {
    let webhook = MockWebhook::start(StatusCode::NOT_FOUND, "not found").await;
    let relay = RelayServer::start("k", &webhook.base_url()).await;

    let response = Client::new().post(&relay.url).body("{}").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors(response.headers());
    assert_eq!(response.text().await.unwrap(), "not found");
}

#[tokio::test]
async fn test_downstream_created_is_reported_as_200() {
    let webhook = MockWebhook::start(StatusCode::CREATED, "created").await;
    let relay = RelayServer::start("k", &webhook.base_url()).await;

    let response = Client::new().post(&relay.url).body("{}").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "created");
}

#[tokio::test]
async fn test_downstream_server_error_is_not_masked() {
    let webhook = MockWebhook::start(StatusCode::BAD_GATEWAY, "upstream down").await;
    let relay = RelayServer::start("k", &webhook.base_url()).await;

    let response = Client::new().post(&relay.url).body("{}").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.text().await.unwrap(), "upstream down");
}

#[test_log::test(tokio::test)]
async fn test_connection_refused_yields_error_envelope() {
    let relay = RelayServer::start("k", &closed_port_url().await).await;

    let response = Client::new().post(&relay.url).body("{}").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(response.headers());

    let body: Value = response.json().await.unwrap();
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert!(!object["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_unset_base_url_yields_error_envelope() {
    let relay = RelayServer::start("k", "").await;

    let response = Client::new().post(&relay.url).body("{}").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("/webhook/clean2"));
}

#[tokio::test]
async fn test_preflight_never_reaches_webhook() {
    let webhook = MockWebhook::start(StatusCode::OK, "ok").await;
    let relay = RelayServer::start("k", &webhook.base_url()).await;

    let response = Client::new()
        .request(reqwest::Method::OPTIONS, &relay.url)
        .header("origin", "https://site.example")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_cors(response.headers());
    assert!(response.text().await.unwrap().is_empty());
    assert!(webhook.requests().is_empty());
}

#[tokio::test]
async fn test_other_methods_never_reach_webhook() {
    let webhook = MockWebhook::start(StatusCode::OK, "ok").await;
    let relay = RelayServer::start("k", &webhook.base_url()).await;
    let client = Client::new();

    for method in [reqwest::Method::GET, reqwest::Method::PUT, reqwest::Method::DELETE] {
        let response = client.request(method, &relay.url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_cors(response.headers());
        assert_eq!(response.text().await.unwrap(), "Method not allowed");
    }
    assert!(webhook.requests().is_empty());
}
