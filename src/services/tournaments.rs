// src/services/tournaments.rs

//! Per-tournament crawl.
//!
//! Takes a listing row and its standings page through
//! standings → decklists → pairings and hands the finished record to the
//! storage backend. Nothing is written unless every fetch succeeded.

use std::collections::HashSet;

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::error::{AppError, Result};
use crate::models::{Match, Player, StandingsRow, Tournament, TournamentRow};
use crate::services::extract::{
    extract_decklist, extract_history_urls, extract_matches, extract_standings,
};
use crate::services::fetcher::{Page, PageFetcher};
use crate::storage::{PageCache, TournamentStorage};
use crate::utils::pairings_url;

/// How a tournament left the crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TournamentOutcome {
    /// Record written.
    Emitted {
        players: usize,
        decklists: usize,
        matches: usize,
        location: String,
    },
    /// A record from an earlier run exists; nothing was fetched.
    AlreadyStored,
    /// No player has a non-empty decklist; pairings were not fetched.
    NoDecklists,
}

/// Crawls the pages of one tournament at a time.
pub struct TournamentCrawler<'a> {
    fetcher: &'a PageFetcher,
    storage: &'a dyn TournamentStorage,
    concurrency: usize,
}

impl<'a> TournamentCrawler<'a> {
    /// Create a crawler issuing at most `concurrency` fetches per batch.
    pub fn new(
        fetcher: &'a PageFetcher,
        storage: &'a dyn TournamentStorage,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            storage,
            concurrency: concurrency.max(1),
        }
    }

    /// Whether this tournament can be skipped before any fetch.
    pub async fn is_stored(&self, tournament_id: &str) -> Result<bool> {
        self.storage.exists(tournament_id).await
    }

    /// Crawl a tournament whose standings page is already fetched.
    pub async fn crawl(&self, row: &TournamentRow, standings: &Page) -> Result<TournamentOutcome> {
        let entries = extract_standings(&standings.document(), &row.id, &standings.url)?;

        let players = self.fetch_players(entries).await?;
        if players.iter().all(|p| p.decklist.is_empty()) {
            return Ok(TournamentOutcome::NoDecklists);
        }

        let matches = self.fetch_matches(&row.id).await?;

        let tournament = Tournament {
            id: row.id.clone(),
            name: row.name.clone(),
            date: row.date.clone(),
            organizer: row.organizer.clone(),
            format: row.format.clone(),
            declared_player_count: row.declared_player_count,
            players,
            matches,
        };
        let location = self.storage.write_tournament(&tournament).await?;

        Ok(TournamentOutcome::Emitted {
            players: tournament.players.len(),
            decklists: tournament.decklist_count(),
            matches: tournament.matches.len(),
            location,
        })
    }

    /// Fetch every linked decklist and keep the players that have one.
    ///
    /// Standings order is preserved.
    async fn fetch_players(&self, entries: Vec<StandingsRow>) -> Result<Vec<Player>> {
        let linked = entries
            .into_iter()
            .filter_map(|entry| entry.decklist_url.clone().map(|url| (url, entry)));

        stream::iter(linked)
            .map(|(url, entry)| async move {
                let page = self.fetcher.fetch(&url, true).await?;
                let decklist = extract_decklist(&page.document(), &page.url)?;

                Ok::<_, AppError>(Player {
                    id: entry.id,
                    name: entry.name,
                    placing: entry.placing,
                    country: entry.country,
                    decklist,
                })
            })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    /// Fetch the latest pairings page and every earlier round it links to.
    async fn fetch_matches(&self, tournament_id: &str) -> Result<Vec<Match>> {
        let latest_url = pairings_url(tournament_id);
        let latest = self.fetcher.fetch(&latest_url, true).await?;

        // Keyed like the cache so absolute and relative links to one page collapse.
        let mut seen = HashSet::from([PageCache::cache_key(&latest_url)]);
        let history: Vec<String> = extract_history_urls(&latest.document())?
            .into_iter()
            .filter(|url| seen.insert(PageCache::cache_key(url)))
            .collect();

        let mut pages: Vec<Page> = stream::iter(history)
            .map(|url| async move { self.fetcher.fetch(&url, true).await })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;
        pages.push(latest);

        let mut matches = Vec::new();
        for page in &pages {
            matches.extend(extract_matches(&page.document(), &page.url)?);
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CrawlerConfig;
    use crate::storage::LocalStorage;
    use crate::utils::{decklist_url, standings_url};
    use tempfile::TempDir;

    const STANDINGS: &str = r#"
        <table class="striped">
          <tr><th>#</th><th>Name</th><th>Deck</th></tr>
          <tr data-name="Ash" data-placing="1" data-country="JP">
            <td><a href="/tournament/abc/player/ash">Ash</a></td>
            <td><a href="/tournament/abc/player/ash/decklist">Deck</a></td>
          </tr>
          <tr data-name="Misty" data-placing="2">
            <td><a href="/tournament/abc/player/misty">Misty</a></td>
          </tr>
          <tr data-name="Nul" data-placing="3">
            <td><a href="/tournament/abc/player/nul">Nul</a></td>
            <td><a href="/tournament/abc/player/nul/decklist">Deck</a></td>
          </tr>
        </table>"#;

    const DECKLIST: &str = r#"
        <div class="decklist">
          <div class="cards">
            <div class="heading">Pokémon (2)</div>
            <p><a href="https://pocket.limitlesstcg.com/cards/A1/1">2 Bulbasaur</a></p>
          </div>
        </div>"#;

    const LATEST_PAIRINGS: &str = r#"
        <div class="mini-nav">
          <a href="/tournament/abc/pairings?round=1">1</a>
          <a href="/tournament/abc/pairings">2</a>
          <a href="/tournament/abc/pairings?round=3">Next</a>
        </div>
        <div class="pairings">
          <table data-tournament="abc">
            <tr><th>P1</th><th>P2</th></tr>
            <tr data-completed="1">
              <td class="p1" data-id="ash" data-count="2">Ash</td>
              <td class="p2" data-id="nul" data-count="0">Nul</td>
            </tr>
          </table>
        </div>"#;

    const ROUND_ONE: &str = r#"
        <div class="live-bracket">
          <div class="bracket-match">
            <div class="live-bracket-player" data-id="nul"><div class="score" data-score="2"></div></div>
            <div class="live-bracket-player" data-id="misty"><div class="score" data-score="1"></div></div>
          </div>
        </div>"#;

    /// Fetcher that can only be served from the cache: any network fetch fails.
    fn offline_fetcher(cache: PageCache) -> PageFetcher {
        let config = CrawlerConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            proxy: None,
            timeout_secs: 1,
            retry_attempts: 0,
            ..CrawlerConfig::default()
        };
        PageFetcher::new(&config, cache).unwrap()
    }

    fn row() -> TournamentRow {
        TournamentRow {
            id: "abc".to_string(),
            name: "Cup".to_string(),
            date: "2025-03-01".to_string(),
            organizer: "Org".to_string(),
            format: "STANDARD".to_string(),
            declared_player_count: 3,
        }
    }

    #[tokio::test]
    async fn test_crawl_merges_history_rounds() {
        let tmp = TempDir::new().unwrap();
        let cache = PageCache::new(tmp.path().join("cache"), 4);
        cache.write(&decklist_url("abc", "ash"), DECKLIST).await.unwrap();
        cache.write(&decklist_url("abc", "joueur_nul"), DECKLIST).await.unwrap();
        cache.write(&pairings_url("abc"), LATEST_PAIRINGS).await.unwrap();
        cache.write("/tournament/abc/pairings?round=1", ROUND_ONE).await.unwrap();

        let fetcher = offline_fetcher(cache);
        let storage = LocalStorage::new(tmp.path().join("output"));
        let crawler = TournamentCrawler::new(&fetcher, &storage, 4);

        let standings = Page::new(standings_url("abc"), STANDINGS);
        let outcome = crawler.crawl(&row(), &standings).await.unwrap();
        assert!(matches!(
            outcome,
            TournamentOutcome::Emitted {
                players: 2,
                decklists: 2,
                matches: 2,
                ..
            }
        ));

        let stored = storage.load_tournament("abc").await.unwrap().unwrap();
        let ids: Vec<_> = stored.players.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["ash", "joueur_nul"]);
        assert!(
            stored
                .matches
                .iter()
                .flat_map(|m| m.match_results.iter())
                .all(|r| r.player_id != "nul")
        );
        assert_eq!(fetcher.stats().network, 0);
        assert_eq!(fetcher.stats().cache_hits, 4);
    }

    #[tokio::test]
    async fn test_history_links_to_same_page_counted_once() {
        let tmp = TempDir::new().unwrap();
        let cache = PageCache::new(tmp.path().join("cache"), 4);
        cache.write(&decklist_url("abc", "ash"), DECKLIST).await.unwrap();
        cache.write(&decklist_url("abc", "joueur_nul"), DECKLIST).await.unwrap();
        cache
            .write(
                &pairings_url("abc"),
                &LATEST_PAIRINGS.replace(
                    r#"<a href="/tournament/abc/pairings">2</a>"#,
                    r#"<a href="https://play.limitlesstcg.com/tournament/abc/pairings">2</a>
                       <a href="https://play.limitlesstcg.com/tournament/abc/pairings?round=1">1</a>"#,
                ),
            )
            .await
            .unwrap();
        cache.write("/tournament/abc/pairings?round=1", ROUND_ONE).await.unwrap();

        let fetcher = offline_fetcher(cache);
        let storage = LocalStorage::new(tmp.path().join("output"));
        let crawler = TournamentCrawler::new(&fetcher, &storage, 4);

        let standings = Page::new(standings_url("abc"), STANDINGS);
        crawler.crawl(&row(), &standings).await.unwrap();

        let stored = storage.load_tournament("abc").await.unwrap().unwrap();
        assert_eq!(stored.matches.len(), 2);
        assert_eq!(fetcher.stats().cache_hits, 4);
    }

    #[tokio::test]
    async fn test_no_decklists_skips_pairings() {
        let tmp = TempDir::new().unwrap();
        let cache = PageCache::new(tmp.path().join("cache"), 4);
        let fetcher = offline_fetcher(cache);
        let storage = LocalStorage::new(tmp.path().join("output"));
        let crawler = TournamentCrawler::new(&fetcher, &storage, 4);

        let standings = Page::new(
            standings_url("abc"),
            r#"<table class="striped"><tr><th></th></tr>
                 <tr data-name="Misty"><td><a href="/tournament/abc/player/misty">Misty</a></td></tr>
               </table>"#,
        );
        let outcome = crawler.crawl(&row(), &standings).await.unwrap();

        assert_eq!(outcome, TournamentOutcome::NoDecklists);
        assert!(!storage.exists("abc").await.unwrap());
        assert_eq!(fetcher.stats().network, 0);
    }

    #[tokio::test]
    async fn test_empty_decklists_count_as_none() {
        let tmp = TempDir::new().unwrap();
        let cache = PageCache::new(tmp.path().join("cache"), 4);
        cache
            .write(&decklist_url("abc", "ash"), "<div class=\"decklist\"></div>")
            .await
            .unwrap();
        cache
            .write(&decklist_url("abc", "joueur_nul"), "<p>private</p>")
            .await
            .unwrap();

        let fetcher = offline_fetcher(cache);
        let storage = LocalStorage::new(tmp.path().join("output"));
        let crawler = TournamentCrawler::new(&fetcher, &storage, 4);

        let standings = Page::new(standings_url("abc"), STANDINGS);
        let outcome = crawler.crawl(&row(), &standings).await.unwrap();
        assert_eq!(outcome, TournamentOutcome::NoDecklists);
        assert!(!storage.exists("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_page_aborts_without_output() {
        let tmp = TempDir::new().unwrap();
        let cache = PageCache::new(tmp.path().join("cache"), 4);
        cache.write(&decklist_url("abc", "ash"), DECKLIST).await.unwrap();

        let fetcher = offline_fetcher(cache);
        let storage = LocalStorage::new(tmp.path().join("output"));
        let crawler = TournamentCrawler::new(&fetcher, &storage, 4);

        let standings = Page::new(standings_url("abc"), STANDINGS);
        assert!(crawler.crawl(&row(), &standings).await.is_err());
        assert!(!storage.exists("abc").await.unwrap());
    }
}
