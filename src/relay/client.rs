use std::time::Duration;

/// Pooled client for downstream calls. No request timeout is set: the relay
/// waits for the downstream response however long it takes.
pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(32)
        .tcp_keepalive(Duration::from_secs(60))
        .build()
}
