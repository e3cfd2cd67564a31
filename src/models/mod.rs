// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! - `config`: TOML configuration
//! - `page`: fragments extracted from a single page
//! - `tournament`: the assembled record written to disk

mod config;
mod page;
mod tournament;

// Re-export all public types
pub use config::{Config, CrawlerConfig, ListingConfig, PathsConfig};
pub use page::{ListingPage, Pagination, StandingsRow, TournamentRow};
pub use tournament::{DeckListItem, Match, MatchResult, Player, Tournament};
