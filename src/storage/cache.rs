//! On-disk page cache.
//!
//! Every fetched page body is stored under a path derived from its URL.
//! A file being present is the only validity check: entries never expire
//! and a truncated file is served as-is.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use url::Url;

use crate::error::{AppError, Result};
use crate::storage::write_atomic;
use crate::utils::{REMAPPED_PLAYER_ID, SENTINEL_PLAYER_ID};

/// Suffix appended to every cache file.
const CACHE_SUFFIX: &str = ".html";

/// Filesystem page cache with a bound on concurrent file operations.
#[derive(Clone)]
pub struct PageCache {
    root_dir: PathBuf,
    io_gate: Arc<Semaphore>,
}

impl PageCache {
    /// Create a cache rooted at `root_dir` allowing `io_permits` concurrent
    /// reads/writes.
    pub fn new(root_dir: impl Into<PathBuf>, io_permits: usize) -> Self {
        Self {
            root_dir: root_dir.into(),
            io_gate: Arc::new(Semaphore::new(io_permits.max(1))),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Relative cache key of a URL.
    ///
    /// Takes the path and query, remaps the sentinel player segment, then
    /// keeps only alphanumerics and `/`.
    pub fn cache_key(url: &str) -> String {
        let path = match Url::parse(url) {
            Ok(parsed) => match parsed.query() {
                Some(query) => format!("{}?{}", parsed.path(), query),
                None => parsed.path().to_string(),
            },
            Err(_) => url.to_string(),
        };

        let sentinel = format!("/player/{SENTINEL_PLAYER_ID}/");
        let remapped = format!("/player/{REMAPPED_PLAYER_ID}/");
        let path = path.replace(&sentinel, &remapped);

        let mut key: String = path
            .chars()
            .filter(|c| *c == '/' || c.is_alphanumeric())
            .collect();
        key.push_str(CACHE_SUFFIX);
        key
    }

    /// Full path of the cache file for a URL.
    pub fn path_for(&self, url: &str) -> PathBuf {
        let key = Self::cache_key(url);
        self.root_dir.join(key.trim_start_matches('/'))
    }

    /// Read a cached body, `None` if the URL was never stored.
    pub async fn read(&self, url: &str) -> Result<Option<String>> {
        let path = self.path_for(url);
        let _permit = self.acquire().await?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Store a body for a URL, creating directories on demand.
    pub async fn write(&self, url: &str, body: &str) -> Result<()> {
        let path = self.path_for(url);
        let _permit = self.acquire().await?;
        write_atomic(&path, body.as_bytes()).await
    }

    /// Count stored pages.
    pub async fn count_entries(&self) -> Result<usize> {
        let mut count = 0;
        let mut pending = vec![self.root_dir.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(AppError::Io(e)),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if path.to_string_lossy().ends_with(CACHE_SUFFIX) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    async fn acquire(&self) -> Result<tokio::sync::SemaphorePermit<'_>> {
        self.io_gate
            .acquire()
            .await
            .map_err(|e| AppError::Io(std::io::Error::other(e)))
    }
}
