//! Service layer for the crawler application.
//!
//! - Page fetching through the cache (`PageFetcher`)
//! - Page extractors (`extract`)
//! - Per-tournament crawl (`TournamentCrawler`)

pub mod extract;
pub mod fetcher;
pub mod tournaments;

pub use fetcher::{FetchStats, Page, PageFetcher};
pub use tournaments::{TournamentCrawler, TournamentOutcome};
