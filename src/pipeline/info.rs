// src/pipeline/info.rs

use crate::error::Result;
use crate::storage::{PageCache, TournamentStorage};

/// What a previous crawl left on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInfo {
    pub cached_pages: usize,
    pub tournaments: usize,
    pub players: usize,
    pub matches: usize,
}

/// Count cached pages and stored tournaments, and log the totals.
pub async fn run_info(cache: &PageCache, storage: &dyn TournamentStorage) -> Result<StoreInfo> {
    let cached_pages = cache.count_entries().await?;
    let ids = storage.list_ids().await?;

    let mut info = StoreInfo {
        cached_pages,
        tournaments: ids.len(),
        players: 0,
        matches: 0,
    };
    for id in &ids {
        if let Some(tournament) = storage.load_tournament(id).await? {
            info.players += tournament.players.len();
            info.matches += tournament.matches.len();
        }
    }

    log::info!("Cache directory: {}", cache.root_dir().display());
    log::info!("  {} cached pages", info.cached_pages);
    match ids.last() {
        Some(last) => log::info!(
            "{} tournaments stored ({} players, {} matches), last id {}",
            info.tournaments,
            info.players,
            info.matches,
            last
        ),
        None => log::info!("No tournaments stored yet."),
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Match, MatchResult, Tournament};
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_counts_cache_and_records() {
        let tmp = TempDir::new().unwrap();
        let cache = PageCache::new(tmp.path().join("cache"), 4);
        let storage = LocalStorage::new(tmp.path().join("output"));

        cache.write("/tournament/a/standings?players", "<html></html>").await.unwrap();
        cache.write("/tournament/a/pairings", "<html></html>").await.unwrap();
        storage
            .write_tournament(&Tournament {
                id: "a".to_string(),
                name: "Cup".to_string(),
                date: "2025-03-01".to_string(),
                organizer: "Org".to_string(),
                format: "STANDARD".to_string(),
                declared_player_count: 2,
                players: Vec::new(),
                matches: vec![Match::new(MatchResult::new("x", 2), MatchResult::new("y", 0))],
            })
            .await
            .unwrap();

        let info = run_info(&cache, &storage).await.unwrap();
        assert_eq!(
            info,
            StoreInfo {
                cached_pages: 2,
                tournaments: 1,
                players: 0,
                matches: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_empty_directories() {
        let tmp = TempDir::new().unwrap();
        let cache = PageCache::new(tmp.path().join("cache"), 4);
        let storage = LocalStorage::new(tmp.path().join("output"));

        let info = run_info(&cache, &storage).await.unwrap();
        assert_eq!(info.cached_pages, 0);
        assert_eq!(info.tournaments, 0);
    }
}
