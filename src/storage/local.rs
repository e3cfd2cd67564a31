//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── {tournament id}.json
//! └── ...
//! ```

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::Tournament;
use crate::storage::{TournamentStorage, write_atomic};

const RECORD_EXTENSION: &str = "json";

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the record path for a tournament.
    fn path(&self, tournament_id: &str) -> PathBuf {
        self.root_dir
            .join(format!("{tournament_id}.{RECORD_EXTENSION}"))
    }
}

#[async_trait]
impl TournamentStorage for LocalStorage {
    async fn exists(&self, tournament_id: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.path(tournament_id)).await?)
    }

    async fn write_tournament(&self, tournament: &Tournament) -> Result<String> {
        let path = self.path(&tournament.id);
        let bytes = serde_json::to_vec_pretty(tournament)?;
        write_atomic(&path, &bytes).await?;

        log::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(path.display().to_string())
    }

    async fn load_tournament(&self, tournament_id: &str) -> Result<Option<Tournament>> {
        match tokio::fs::read(self.path(tournament_id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeckListItem, Match, MatchResult, Player};
    use tempfile::TempDir;

    fn sample(id: &str) -> Tournament {
        Tournament {
            id: id.to_string(),
            name: "Cup".to_string(),
            date: "2025-03-01".to_string(),
            organizer: "Org".to_string(),
            format: "STANDARD".to_string(),
            declared_player_count: 8,
            players: vec![Player {
                id: "joueur_nul".to_string(),
                name: "Nul".to_string(),
                placing: None,
                country: Some("FR".to_string()),
                decklist: vec![DeckListItem {
                    category: "Trainer".to_string(),
                    url: "https://pocket.limitlesstcg.com/cards/P-A/7".to_string(),
                    name: "Professor's Research".to_string(),
                    count: 2,
                }],
            }],
            matches: vec![Match::new(
                MatchResult::new("joueur_nul", 2),
                MatchResult::new("ash", 0),
            )],
        }
    }

    #[tokio::test]
    async fn test_write_and_load() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(!storage.exists("abc").await.unwrap());
        storage.write_tournament(&sample("abc")).await.unwrap();
        assert!(storage.exists("abc").await.unwrap());

        let loaded = storage.load_tournament("abc").await.unwrap().unwrap();
        assert_eq!(loaded, sample("abc"));
    }

    #[tokio::test]
    async fn test_creates_missing_root() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("nested/output"));

        storage.write_tournament(&sample("abc")).await.unwrap();
        assert!(tmp.path().join("nested/output/abc.json").exists());
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage.write_tournament(&sample("abc")).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["abc.json".to_string()]);
    }

    #[tokio::test]
    async fn test_list_ids() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        assert!(storage.list_ids().await.unwrap().is_empty());

        storage.write_tournament(&sample("b")).await.unwrap();
        storage.write_tournament(&sample("a")).await.unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "x").unwrap();

        assert_eq!(storage.list_ids().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_load_missing() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        assert!(storage.load_tournament("nope").await.unwrap().is_none());
    }
}
