//! JSON output.
//!
//! Records are written as one pretty-printed array with two-space
//! indentation. Non-ASCII text is kept as is.

use crate::error::ExportError;
use crate::models::ArticleRecord;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write `records` as a JSON array to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_records(records: &[ArticleRecord], path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).await.map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!("Wrote JSON records");
    Ok(())
}
