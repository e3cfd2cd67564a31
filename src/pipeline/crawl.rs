// src/pipeline/crawl.rs

//! Listing traversal.
//!
//! Walks the completed-tournaments listing one page at a time. Listing
//! pages always come from the network; everything below them is cached.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::error::{AppError, Result};
use crate::models::{Config, TournamentRow};
use crate::services::extract::extract_listing;
use crate::services::fetcher::{FetchStats, Page, PageFetcher};
use crate::services::tournaments::{TournamentCrawler, TournamentOutcome};
use crate::storage::TournamentStorage;
use crate::utils::standings_url;

/// Totals of one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub listing_pages: usize,
    pub tournaments_seen: usize,
    pub emitted: usize,
    pub skipped_existing: usize,
    pub skipped_no_decklist: usize,
    pub fetch: FetchStats,
}

impl CrawlSummary {
    fn started() -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            end_time: now,
            listing_pages: 0,
            tournaments_seen: 0,
            emitted: 0,
            skipped_existing: 0,
            skipped_no_decklist: 0,
            fetch: FetchStats::default(),
        }
    }

    fn record(&mut self, outcome: &TournamentOutcome) {
        match outcome {
            TournamentOutcome::Emitted { .. } => self.emitted += 1,
            TournamentOutcome::AlreadyStored => self.skipped_existing += 1,
            TournamentOutcome::NoDecklists => self.skipped_no_decklist += 1,
        }
    }

    fn log(&self) {
        let elapsed = self.end_time - self.start_time;
        log::info!(
            "Crawl finished in {}s: {} listing pages, {} tournaments seen",
            elapsed.num_seconds(),
            self.listing_pages,
            self.tournaments_seen
        );
        log::info!(
            "  emitted {}, already stored {}, without decklists {}",
            self.emitted,
            self.skipped_existing,
            self.skipped_no_decklist
        );
        log::info!(
            "  pages: {} downloaded, {} from cache, {} retries",
            self.fetch.network,
            self.fetch.cache_hits,
            self.fetch.retries
        );
    }
}

/// Crawl every listing page from the configured start page to the last one.
///
/// Stops at the first error; records already written stay on disk and are
/// skipped by the next run.
pub async fn run_crawler(
    config: &Config,
    fetcher: &PageFetcher,
    storage: &dyn TournamentStorage,
) -> Result<CrawlSummary> {
    let mut summary = CrawlSummary::started();
    let concurrency = config.crawler.max_connections;
    let crawler = TournamentCrawler::new(fetcher, storage, concurrency);

    let mut page = config.listing.start_page;
    loop {
        let url = config.listing.page_url(page);
        let listing_page = fetcher.fetch(&url, false).await?;
        let listing = extract_listing(&listing_page.document(), &url)?;
        summary.listing_pages += 1;

        log::info!(
            "Listing page {}/{}: {} tournaments",
            listing.pagination.current,
            listing.pagination.max,
            listing.tournaments.len()
        );

        let mut pending = Vec::new();
        for row in listing.tournaments {
            summary.tournaments_seen += 1;
            if crawler.is_stored(&row.id).await? {
                log::debug!("{}: already stored, skipping", row.id);
                summary.record(&TournamentOutcome::AlreadyStored);
            } else {
                pending.push(row);
            }
        }

        let with_standings = fetch_standings(fetcher, pending, concurrency).await?;
        for (row, standings) in with_standings {
            log::info!("Extracting tournament {}", row.id);
            let outcome = crawler.crawl(&row, &standings).await?;
            match &outcome {
                TournamentOutcome::Emitted {
                    players,
                    decklists,
                    matches,
                    location,
                } => log::info!(
                    "{}: {} players, {} decklists, {} matches -> {}",
                    row.id,
                    players,
                    decklists,
                    matches,
                    location
                ),
                TournamentOutcome::NoDecklists => {
                    log::info!("{}: no decklists, skipping", row.id)
                }
                TournamentOutcome::AlreadyStored => {}
            }
            summary.record(&outcome);
        }

        if !listing.pagination.has_next() {
            break;
        }
        page = listing.pagination.current.max(page) + 1;
    }

    summary.end_time = Utc::now();
    summary.fetch = fetcher.stats();
    summary.log();
    Ok(summary)
}

/// Fetch the standings pages of a listing page's tournaments as one batch.
async fn fetch_standings(
    fetcher: &PageFetcher,
    rows: Vec<TournamentRow>,
    concurrency: usize,
) -> Result<Vec<(TournamentRow, Page)>> {
    stream::iter(rows)
        .map(|row| async move {
            let page = fetcher.fetch(&standings_url(&row.id), true).await?;
            Ok::<_, AppError>((row, page))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}
