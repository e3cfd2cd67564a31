//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP, caching and concurrency settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Which slice of the completed-tournaments listing to walk
    #[serde(default)]
    pub listing: ListingConfig,

    /// Cache and output locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let crawler = &self.crawler;
        if crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if crawler.max_connections == 0 {
            return Err(AppError::validation("crawler.max_connections must be > 0"));
        }
        if crawler.cache_io_permits < crawler.max_connections {
            return Err(AppError::validation(
                "crawler.cache_io_permits must be >= crawler.max_connections",
            ));
        }
        Url::parse(&crawler.base_url)
            .map_err(|e| AppError::validation(format!("crawler.base_url: {e}")))?;
        if let Some(proxy) = crawler.proxy_url() {
            Url::parse(proxy).map_err(|e| AppError::validation(format!("crawler.proxy: {e}")))?;
        }
        if self.listing.start_page == 0 {
            return Err(AppError::validation("listing.start_page must be >= 1"));
        }
        if !self.listing.path.starts_with('/') {
            return Err(AppError::validation("listing.path must start with '/'"));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Site root every page path is resolved against
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Forward proxy all requests go through (`None` connects directly)
    #[serde(default = "defaults::proxy")]
    pub proxy: Option<String>,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum simultaneous requests to the site
    #[serde(default = "defaults::max_connections")]
    pub max_connections: usize,

    /// Maximum simultaneous cache file reads/writes
    #[serde(default = "defaults::cache_io_permits")]
    pub cache_io_permits: usize,

    /// Extra attempts for a transient network failure
    #[serde(default = "defaults::retry_attempts")]
    pub retry_attempts: u32,

    /// Base backoff between attempts, doubled on every retry
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,
}

impl CrawlerConfig {
    /// Proxy to route through; an empty string in the file means none.
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy.as_deref().filter(|p| !p.trim().is_empty())
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            proxy: defaults::proxy(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_connections: defaults::max_connections(),
            cache_io_permits: defaults::cache_io_permits(),
            retry_attempts: defaults::retry_attempts(),
            retry_delay_ms: defaults::retry_delay(),
        }
    }
}

/// Query parameters of the completed-tournaments listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "defaults::listing_path")]
    pub path: String,
    #[serde(default = "defaults::game")]
    pub game: String,
    #[serde(default = "defaults::format")]
    pub format: String,
    #[serde(default = "defaults::platform")]
    pub platform: String,
    /// Sent as the `type` query parameter
    #[serde(default = "defaults::kind")]
    pub kind: String,
    #[serde(default = "defaults::time")]
    pub time: String,
    /// First listing page to request
    #[serde(default = "defaults::start_page")]
    pub start_page: u32,
}

impl ListingConfig {
    /// Relative URL of one listing page.
    pub fn page_url(&self, page: u32) -> String {
        format!(
            "{}?game={}&format={}&platform={}&type={}&time={}&page={}",
            self.path, self.game, self.format, self.platform, self.kind, self.time, page
        )
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            path: defaults::listing_path(),
            game: defaults::game(),
            format: defaults::format(),
            platform: defaults::platform(),
            kind: defaults::kind(),
            time: defaults::time(),
            start_page: defaults::start_page(),
        }
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the page cache
    #[serde(default = "defaults::cache_dir")]
    pub cache_dir: PathBuf,

    /// Directory receiving one `<tournament id>.json` per tournament
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_dir: defaults::cache_dir(),
            output_dir: defaults::output_dir(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn base_url() -> String {
        "https://play.limitlesstcg.com".into()
    }
    pub fn proxy() -> Option<String> {
        Some("http://193.52.32.156:3128".into())
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/91.0.4472.106 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_connections() -> usize {
        20
    }
    pub fn cache_io_permits() -> usize {
        50
    }
    pub fn retry_attempts() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        500
    }

    // Listing defaults
    pub fn listing_path() -> String {
        "/tournaments/completed".into()
    }
    pub fn game() -> String {
        "POCKET".into()
    }
    pub fn format() -> String {
        "STANDARD".into()
    }
    pub fn platform() -> String {
        "all".into()
    }
    pub fn kind() -> String {
        "online".into()
    }
    pub fn time() -> String {
        "all".into()
    }
    pub fn start_page() -> u32 {
        1
    }

    // Path defaults
    pub fn cache_dir() -> PathBuf {
        PathBuf::from("cache")
    }
    pub fn output_dir() -> PathBuf {
        PathBuf::from("output")
    }
}
