// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
///
/// All requests go through the configured forward proxy; without one,
/// proxy environment variables are ignored too. The idle
/// pool is capped at the connection ceiling; the hard ceiling on in-flight
/// requests is enforced by the fetcher.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .pool_max_idle_per_host(config.max_connections);

    if let Some(proxy) = config.proxy_url() {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    } else {
        builder = builder.no_proxy();
    }

    Ok(builder.build()?)
}
