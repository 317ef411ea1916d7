//! Error types for every stage of a harvest run.
//!
//! Only [`ValidationError`], [`DiscoveryError`] and [`ExportError`] ever end a
//! run. [`FetchError`] is recovered from by the harvest engine and
//! [`ExtractionError`] is folded into a sentinel record by the article
//! extractor.

use thiserror::Error;

/// A page could not be retrieved.
///
/// Kept separate from content errors so callers can tell a flaky network
/// apart from a page that no longer has the expected shape.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("could not fetch archive homepage: {0}")]
    Fetch(#[from] FetchError),

    #[error("announcements navigation not found on {url}")]
    MissingNavigation { url: String },

    #[error("invalid homepage url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Why one attempt at an article page failed. Every variant is retryable.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Missing title on the page.")]
    MissingTitle,

    #[error("Missing body content on the page.")]
    MissingBody,
}

/// Command-line input rejected before any network activity.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{name} must be in YYYY-MM-DD format, got '{value}'")]
    MalformedDate { name: &'static str, value: String },

    #[error("{name} {date} is in the future")]
    FutureDate {
        name: &'static str,
        date: chrono::NaiveDate,
    },

    #[error("END_DATE {end} must be on or after START_DATE {start}")]
    EndBeforeStart {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("output folder {path} is not usable: {source}")]
    OutputFolder {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_messages() {
        assert_eq!(
            ExtractionError::MissingBody.to_string(),
            "Missing body content on the page."
        );
        let err = ExtractionError::from(FetchError::Status {
            url: "https://example.com/a".to_string(),
            status: 503,
        });
        assert_eq!(
            err.to_string(),
            "request to https://example.com/a returned HTTP 503"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MalformedDate {
            name: "START_DATE",
            value: "2025/01/01".to_string(),
        };
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }
}
