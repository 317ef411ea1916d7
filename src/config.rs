//! Runtime constants for a harvest run.
//!
//! Defaults suit the OKX announcement archive. Any subset of fields can be
//! overridden from a YAML file passed with `--config`:
//!
//! ```yaml
//! max_pages: 40
//! category_attempts: 5
//! listing_timeout_secs: 60
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_HOMEPAGE_URL: &str = "https://www.okx.com/help/category/announcements";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarvestConfig {
    /// Page listing every announcement category.
    pub homepage_url: String,
    /// Hard cap on listing pages visited per category attempt.
    pub max_pages: u32,
    pub listing_timeout_secs: u64,
    pub article_timeout_secs: u64,
    /// Total attempts per article page, including the first.
    pub article_retries: u32,
    /// Total scan attempts per category, including the first.
    pub category_attempts: u32,
    /// First backoff delay between attempts; `0` disables sleeping.
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub user_agent: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            homepage_url: DEFAULT_HOMEPAGE_URL.to_string(),
            max_pages: 100,
            listing_timeout_secs: 120,
            article_timeout_secs: 60,
            article_retries: 3,
            category_attempts: 3,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 10_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HarvestConfig {
    /// Load defaults, applying the YAML file at `path` on top when given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            None => Self::default(),
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
                    path: path.display().to_string(),
                    source,
                })?;
                info!(path = %path.display(), "Loaded config overrides");
                config
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to `null`, which means "all defaults".
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_pages", self.max_pages),
            ("article_retries", self.article_retries),
            ("category_attempts", self.category_attempts),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        if self.listing_timeout_secs == 0 || self.article_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout",
                reason: "timeouts must be at least one second".to_string(),
            });
        }
        if let Err(e) = url::Url::parse(&self.homepage_url) {
            return Err(ConfigError::Invalid {
                field: "homepage_url",
                reason: e.to_string(),
            });
        }
        Ok(())
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn article_timeout(&self) -> Duration {
        Duration::from_secs(self.article_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = HarvestConfig::from_yaml("max_pages: 5\ncategory_attempts: 4\n").unwrap();
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.category_attempts, 4);
        assert_eq!(config.article_retries, 3);
        assert_eq!(config.homepage_url, DEFAULT_HOMEPAGE_URL);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(HarvestConfig::from_yaml("").unwrap(), HarvestConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(HarvestConfig::from_yaml("max_page: 5").is_err());
    }

    #[test]
    fn test_zero_max_pages_invalid() {
        let config = HarvestConfig {
            max_pages: 0,
            ..HarvestConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "max_pages",
                ..
            })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retry_base_delay_ms: 0").unwrap();
        let config = HarvestConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.retry_base_delay(), Duration::ZERO);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = HarvestConfig::load(Some(Path::new("/nonexistent/harvest.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
