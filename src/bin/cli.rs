//! Limitless TCG tournament crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tcg_crawler::{
    error::Result,
    models::Config,
    pipeline,
    services::PageFetcher,
    storage::{LocalStorage, PageCache},
};

/// Crawl completed Limitless TCG tournaments into JSON records
#[derive(Parser, Debug)]
#[command(
    name = "crawler",
    version,
    about = "Limitless TCG tournament crawler"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "crawler.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the listing and write every new tournament (default)
    Crawl {
        /// Connect directly instead of through the configured proxy
        #[arg(long)]
        no_proxy: bool,

        /// Output directory (overrides paths.output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Page cache directory (overrides paths.cache_dir)
        #[arg(long)]
        cache: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Show what the cache and output directories hold
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    let command = cli.command.unwrap_or(Command::Crawl {
        no_proxy: false,
        output: None,
        cache: None,
    });

    match command {
        Command::Crawl {
            no_proxy,
            output,
            cache,
        } => {
            if no_proxy {
                config.crawler.proxy = None;
            }
            if let Some(output) = output {
                config.paths.output_dir = output;
            }
            if let Some(cache) = cache {
                config.paths.cache_dir = cache;
            }
            config.validate()?;

            log::info!(
                "Crawling {} via {}",
                config.crawler.base_url,
                config.crawler.proxy_url().unwrap_or("direct connection")
            );

            let cache = PageCache::new(&config.paths.cache_dir, config.crawler.cache_io_permits);
            let fetcher = PageFetcher::new(&config.crawler, cache)?;
            let storage = LocalStorage::new(&config.paths.output_dir);

            let summary = pipeline::run_crawler(&config, &fetcher, &storage).await?;
            log::info!(
                "Crawl complete! {} new tournaments in {}",
                summary.emitted,
                config.paths.output_dir.display()
            );
        }

        Command::Validate => {
            pipeline::run_validate(&config)?;
            log::info!("All validations passed!");
        }

        Command::Info => {
            let cache = PageCache::new(&config.paths.cache_dir, config.crawler.cache_io_permits);
            let storage = LocalStorage::new(&config.paths.output_dir);
            pipeline::run_info(&cache, &storage).await?;
        }
    }

    Ok(())
}
