//! Storage for crawled pages and finished tournament records.
//!
//! ## Directory Structure
//!
//! ```text
//! cache/                                  # PageCache: one file per fetched URL
//! └── tournament/
//!     └── {id}/
//!         ├── standingsplayers.html
//!         ├── pairings.html
//!         └── player/{player}/decklist.html
//! output/                                 # LocalStorage: one record per tournament
//! └── {id}.json
//! ```

pub mod cache;
pub mod local;

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::Tournament;

// Re-export for convenience
pub use cache::PageCache;
pub use local::LocalStorage;

/// Trait for tournament record backends.
#[async_trait]
pub trait TournamentStorage: Send + Sync {
    /// Whether a record for this tournament was already written.
    async fn exists(&self, tournament_id: &str) -> Result<bool>;

    /// Persist a finished tournament. Returns the location written.
    ///
    /// A record is either fully written or absent; readers never observe a
    /// partial record.
    async fn write_tournament(&self, tournament: &Tournament) -> Result<String>;

    /// Load a previously written tournament.
    async fn load_tournament(&self, tournament_id: &str) -> Result<Option<Tournament>>;

    /// Ids of all written tournaments.
    async fn list_ids(&self) -> Result<Vec<String>>;
}

/// Write bytes atomically (write to temp, then rename), creating parent
/// directories as needed.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
