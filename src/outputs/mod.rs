//! Output generation for harvested article records.
//!
//! # Submodules
//!
//! - [`json`]: structured records as a JSON array
//! - [`spreadsheet`]: the same records as a CSV table
//!
//! # Output Structure
//!
//! Both files share a prefix built from the generation time and the
//! requested date range:
//!
//! ```text
//! output_folder/
//! ├── 20250506_141502_articles_2025-05-01_to_2025-05-06.json
//! └── 20250506_141502_articles_2025-05-01_to_2025-05-06.csv
//! ```

pub mod json;
pub mod spreadsheet;

use crate::error::ExportError;
use crate::models::{ArticleRecord, DateWindow};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub json: PathBuf,
    pub spreadsheet: PathBuf,
}

/// File stem shared by every output of one run.
pub fn file_stem(generated_at: NaiveDateTime, window: &DateWindow) -> String {
    format!(
        "{}_articles_{}_to_{}",
        generated_at.format("%Y%m%d_%H%M%S"),
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d")
    )
}

/// Write every output format into `folder`.
#[instrument(level = "info", skip(records), fields(count = records.len()))]
pub async fn export(
    records: &[ArticleRecord],
    folder: &Path,
    window: &DateWindow,
    generated_at: NaiveDateTime,
) -> Result<ExportPaths, ExportError> {
    let stem = file_stem(generated_at, window);
    let paths = ExportPaths {
        json: folder.join(format!("{stem}.json")),
        spreadsheet: folder.join(format!("{stem}.csv")),
    };

    json::write_records(records, &paths.json).await?;
    spreadsheet::write_records(records, &paths.spreadsheet).await?;

    info!(
        json = %paths.json.display(),
        spreadsheet = %paths.spreadsheet.display(),
        "Saved articles"
    );
    Ok(paths)
}
