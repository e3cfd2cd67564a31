// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;

/// Validate the configuration and report the values a crawl would use.
pub fn run_validate(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    let crawler = &config.crawler;
    log::info!("✓ Config OK");
    log::info!("  base url: {}", crawler.base_url);
    log::info!("  proxy: {}", crawler.proxy_url().unwrap_or("none"));
    log::info!("  user agent: {}", crawler.user_agent);
    log::info!("  timeout: {}s", crawler.timeout_secs);
    log::info!(
        "  connections: {}, cache permits: {}",
        crawler.max_connections,
        crawler.cache_io_permits
    );
    log::info!(
        "  retries: {} (base delay {}ms)",
        crawler.retry_attempts,
        crawler.retry_delay_ms
    );
    log::info!("  first listing page: {}", config.listing.page_url(config.listing.start_page));
    log::info!("  cache: {}", config.paths.cache_dir.display());
    log::info!("  output: {}", config.paths.output_dir.display());
    Ok(())
}
