//! Command-line interface for the announcement harvester.
//!
//! Three positional arguments select the date window and the output folder.
//! Everything is validated before any network activity.

use crate::error::ValidationError;
use crate::models::DateWindow;
use crate::utils::ensure_writable_dir;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Everything published in March 2025
/// announcement_harvester 2025-03-01 2025-03-31 ./out
///
/// # With config overrides
/// announcement_harvester 2025-03-01 2025-03-31 ./out --config harvest.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape announcement articles by date range.")]
pub struct Cli {
    /// Start date in YYYY-MM-DD format
    #[arg(value_name = "START_DATE")]
    pub start_date: String,

    /// End date in YYYY-MM-DD format
    #[arg(value_name = "END_DATE")]
    pub end_date: String,

    /// Folder to save the scraped files
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Optional path to a YAML file overriding harvest settings
    #[arg(short, long, env = "HARVEST_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse and check the date arguments against `today`.
    pub fn date_window(&self, today: NaiveDate) -> Result<DateWindow, ValidationError> {
        let start = parse_date("START_DATE", &self.start_date)?;
        let end = parse_date("END_DATE", &self.end_date)?;

        for (name, date) in [("START_DATE", start), ("END_DATE", end)] {
            if date > today {
                return Err(ValidationError::FutureDate { name, date });
            }
        }
        DateWindow::new(start, end).ok_or(ValidationError::EndBeforeStart { start, end })
    }

    /// Validate every argument: dates first, then the output folder, which is
    /// created when missing.
    pub async fn validate(&self, today: NaiveDate) -> Result<DateWindow, ValidationError> {
        let window = self.date_window(today)?;
        ensure_writable_dir(&self.folder)
            .await
            .map_err(|source| ValidationError::OutputFolder {
                path: self.folder.display().to_string(),
                source,
            })?;
        Ok(window)
    }
}

fn parse_date(name: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::MalformedDate {
        name,
        value: value.to_string(),
    })
}
