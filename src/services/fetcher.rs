// src/services/fetcher.rs

//! Cache-aware page fetcher.
//!
//! Two independent gates bound the work in flight: one limits requests to
//! the site, the other (inside [`PageCache`]) limits cache file operations.
//! Neither is held while waiting on the other.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::Client;
use scraper::Html;
use tokio::sync::Semaphore;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::storage::PageCache;
use crate::utils::http::create_async_client;
use crate::utils::resolve_url;

/// A fetched page body.
///
/// Parsing is deferred to [`Page::document`] so the unparsed body can cross
/// await points; extract from the document and drop it before awaiting.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub body: String,
}

impl Page {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// Parse the body as an HTML document.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Counters describing where pages came from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchStats {
    pub network: usize,
    pub cache_hits: usize,
    pub retries: usize,
}

/// Fetches site pages through the on-disk cache.
pub struct PageFetcher {
    client: Client,
    base_url: Url,
    cache: PageCache,
    connections: Arc<Semaphore>,
    retry_attempts: u32,
    retry_delay: Duration,
    network: AtomicUsize,
    cache_hits: AtomicUsize,
    retries: AtomicUsize,
}

impl PageFetcher {
    /// Create a fetcher with a client built from the configuration.
    pub fn new(config: &CrawlerConfig, cache: PageCache) -> Result<Self> {
        let client = create_async_client(config)?;
        Self::with_client(client, config, cache)
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: Client, config: &CrawlerConfig, cache: PageCache) -> Result<Self> {
        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
            cache,
            connections: Arc::new(Semaphore::new(config.max_connections.max(1))),
            retry_attempts: config.retry_attempts,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            network: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            retries: AtomicUsize::new(0),
        })
    }

    /// Fetch a page, serving it from the cache when allowed and present.
    ///
    /// On a network fetch the body is stored in the cache before returning,
    /// so a later cached fetch of the same URL never hits the network.
    pub async fn fetch(&self, url: &str, use_cache: bool) -> Result<Page> {
        if use_cache {
            if let Some(body) = self.cache.read(url).await? {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                log::debug!("Cache hit: {}", url);
                return Ok(Page::new(url, body));
            }
        }

        let body = self.download(url).await?;
        self.network.fetch_add(1, Ordering::Relaxed);
        self.cache.write(url, &body).await?;
        Ok(Page::new(url, body))
    }

    /// Snapshot of the fetch counters.
    pub fn stats(&self) -> FetchStats {
        FetchStats {
            network: self.network.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }

    /// GET a page, retrying transient failures with exponential backoff.
    async fn download(&self, url: &str) -> Result<String> {
        let full_url = resolve_url(&self.base_url, url);
        let mut attempt = 0;

        loop {
            match self.request(&full_url).await {
                Err(e) if e.is_transient() && attempt < self.retry_attempts => {
                    let delay = self.retry_delay.saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    log::warn!(
                        "Fetch failed for {} ({}), retry {}/{} in {:?}",
                        full_url,
                        e,
                        attempt,
                        self.retry_attempts,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    /// Single GET, holding a connection permit for its whole duration.
    async fn request(&self, url: &str) -> Result<String> {
        let _permit = self
            .connections
            .acquire()
            .await
            .map_err(|e| AppError::Io(std::io::Error::other(e)))?;

        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}
