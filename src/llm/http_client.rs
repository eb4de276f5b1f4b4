use reqwest::Client;
use std::time::Duration;

/// Build the shared HTTP client for a provider. The request timeout is the
/// per-call bound from `ModelConfig`; connection setup gets its own shorter
/// bound.
pub fn build_provider_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
