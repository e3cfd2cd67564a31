//! Pipeline entry points for crawler operations.
//!
//! - `run_crawler`: Walk the listing and emit every new tournament
//! - `run_validate`: Check and report the effective configuration
//! - `run_info`: Report what the cache and output directories hold

pub mod crawl;
pub mod info;
pub mod validate;

pub use crawl::{CrawlSummary, run_crawler};
pub use info::run_info;
pub use validate::run_validate;
