//! Spreadsheet output as CSV with a `date,title,body,category` header row.

use crate::error::ExportError;
use crate::models::ArticleRecord;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const HEADER: [&str; 4] = ["date", "title", "body", "category"];

/// Render `records` as CSV, header included even when empty.
pub fn to_csv(records: &[ArticleRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}

#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_records(records: &[ArticleRecord], path: &Path) -> Result<(), ExportError> {
    let bytes = to_csv(records)?;
    fs::write(path, bytes).await.map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!("Wrote spreadsheet records");
    Ok(())
}
