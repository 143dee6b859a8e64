use anyhow::{Context, Result};
use std::time::Duration;

/// Build the HTTP client shared by all translation providers.
///
/// Every vendor call is bounded by `timeout` so a hung connection cannot
/// block the calling request forever.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .build()
        .context("Failed to build translation HTTP client")
}
