//! # Announcement Harvester
//!
//! Harvests announcement articles published within a date window from a
//! category-based, paginated archive and saves them as JSON and CSV.
//!
//! ## Usage
//!
//! ```sh
//! announcement_harvester 2025-03-01 2025-03-31 ./out
//! ```
//!
//! ## Architecture
//!
//! The run is a sequential pipeline:
//! 1. **Validation**: dates and output folder, before any network activity
//! 2. **Discovery**: category listings from the archive homepage
//! 3. **Harvesting**: walk each category's listing pages, filtering by date
//!    and restarting a category when its listing shifts mid-scan
//! 4. **Extraction**: title and body of every harvested article
//! 5. **Output**: timestamped JSON and CSV files

use chrono::Local;
use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod fetch;
mod harvest;
mod models;
mod outputs;
mod scrapers;
#[cfg(test)]
mod testing;
mod utils;

use cli::Cli;
use config::HarvestConfig;
use fetch::ReqwestFetcher;
use harvest::HarvestEngine;
use scrapers::archive::discover_categories;
use scrapers::article::ArticleExtractor;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("announcement_harvester starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Validate before touching the network ----
    let window = match args.validate(Local::now().date_naive()).await {
        Ok(window) => window,
        Err(e) => {
            error!(error = %e, "Invalid arguments");
            return Err(e.into());
        }
    };
    let config = match HarvestConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(%window, folder = %args.folder.display(), max_pages = config.max_pages, "Arguments validated");

    let fetcher = ReqwestFetcher::new(&config.user_agent)?;

    // ---- Discover categories ----
    let categories =
        match discover_categories(&fetcher, &config.homepage_url, config.listing_timeout()).await {
            Ok(categories) => categories,
            Err(e) => {
                error!(url = %config.homepage_url, error = %e, "Failed to fetch categories");
                return Err(e.into());
            }
        };

    // ---- Harvest listing pages ----
    let engine = HarvestEngine::new(&fetcher, &config, window);
    let report = engine.harvest(&categories).await;

    for (category, count) in report
        .articles
        .iter()
        .counts_by(|a| a.category_id.as_str())
        .into_iter()
        .sorted()
    {
        info!(category, count, "Articles found in category");
    }
    for abandoned in &report.abandoned {
        warn!(
            category = %abandoned.category_id,
            attempts = abandoned.attempts,
            reason = %abandoned.last_failure,
            "Category abandoned; its articles are missing from the output"
        );
    }
    info!(count = report.articles.len(), "Total articles to process");

    // ---- Extract article content ----
    info!("Extracting title and body content");
    let extractor = ArticleExtractor::new(&fetcher, &config);
    let records = extractor.extract_records(&report.articles).await;

    // ---- Output ----
    let paths =
        match outputs::export(&records, &args.folder, &window, Local::now().naive_local()).await {
            Ok(paths) => paths,
            Err(e) => {
                error!(error = %e, "Failed to save articles");
                return Err(e.into());
            }
        };

    let elapsed = start_time.elapsed();
    info!(
        count = records.len(),
        json = %paths.json.display(),
        spreadsheet = %paths.spreadsheet.display(),
        secs = elapsed.as_secs(),
        "Scraping complete"
    );

    Ok(())
}
