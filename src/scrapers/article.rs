//! Article page scraper.
//!
//! An article page carries its headline in an `h1` whose class contains
//! `index_article-title-h1` and its body in a `div` whose class contains
//! `index_richTextContent` (older posts use `index_markdownContent`).
//!
//! Extraction never fails the caller: after the last attempt a sentinel
//! [`ExtractedArticle`] carrying the failure reason is returned, so every
//! harvested article yields exactly one exported record.

use crate::config::HarvestConfig;
use crate::error::ExtractionError;
use crate::fetch::PageFetcher;
use crate::models::{ArticleRecord, ExtractedArticle, HarvestedArticle};
use crate::utils::{backoff, find_first_by_class_substring, html_to_markdown, truncate_for_log};
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const TITLE_CLASS: &str = "index_article-title-h1";
const BODY_CLASSES: [&str; 2] = ["index_richTextContent", "index_markdownContent"];

#[derive(Debug)]
pub struct ArticleExtractor<'a, F> {
    fetcher: &'a F,
    attempts: u32,
    timeout: Duration,
    base_delay: Duration,
    max_delay: Duration,
}

impl<'a, F: PageFetcher> ArticleExtractor<'a, F> {
    pub fn new(fetcher: &'a F, config: &HarvestConfig) -> Self {
        Self {
            fetcher,
            attempts: config.article_retries.max(1),
            timeout: config.article_timeout(),
            base_delay: config.retry_base_delay(),
            max_delay: config.retry_max_delay(),
        }
    }

    /// Fetch one article, retrying transient failures.
    ///
    /// Returns a sentinel whose title and body both embed the last error
    /// once every attempt has failed.
    #[instrument(level = "info", skip(self))]
    pub async fn extract(&self, url: &str) -> ExtractedArticle {
        let mut last_error = None;

        for attempt in 1..=self.attempts {
            match self.try_extract(url).await {
                Ok(article) => {
                    debug!(attempt, body_bytes = article.body.len(), "Extracted article");
                    return article;
                }
                Err(e) => {
                    warn!(attempt, max = self.attempts, error = %e, "Article extraction attempt failed");
                    last_error = Some(e);
                    if attempt < self.attempts {
                        backoff(attempt, self.base_delay, self.max_delay).await;
                    }
                }
            }
        }

        let reason = last_error.map(|e| e.to_string());
        let preview = reason
            .as_deref()
            .map(|r| truncate_for_log(r, 200))
            .unwrap_or_default();
        warn!(
            attempts = self.attempts,
            reason = %preview,
            "Failed to extract article; emitting placeholder record"
        );
        sentinel(url, reason.as_deref())
    }

    async fn try_extract(&self, url: &str) -> Result<ExtractedArticle, ExtractionError> {
        let document = self.fetcher.fetch(url, self.timeout).await?;
        parse_article(&document, url)
    }

    /// Extract every harvested article in order, one record per input.
    #[instrument(level = "info", skip_all, fields(count = articles.len()))]
    pub async fn extract_records(&self, articles: &[HarvestedArticle]) -> Vec<ArticleRecord> {
        let total = articles.len();
        let mut records = Vec::with_capacity(total);
        for (i, article) in articles.iter().enumerate() {
            let extracted = self.extract(&article.url).await;
            info!(
                index = i + 1,
                total,
                url = %extracted.url,
                category = %article.category_id,
                title = %truncate_for_log(&extracted.title, 80),
                "Scraped article"
            );
            records.push(ArticleRecord::new(article, extracted));
        }
        records
    }
}

/// Pull the title and body out of an article page.
pub fn parse_article(document: &Html, url: &str) -> Result<ExtractedArticle, ExtractionError> {
    let title = find_first_by_class_substring(document, "h1", TITLE_CLASS)
        .ok_or(ExtractionError::MissingTitle)?;
    let body = BODY_CLASSES
        .iter()
        .find_map(|class| find_first_by_class_substring(document, "div", class))
        .ok_or(ExtractionError::MissingBody)?;

    Ok(ExtractedArticle {
        url: url.to_string(),
        title: title.text().collect::<String>().trim().to_string(),
        body: html_to_markdown(&body.html()),
    })
}

fn sentinel(url: &str, reason: Option<&str>) -> ExtractedArticle {
    let (title, body) = match reason {
        Some(reason) => (
            format!("Failed to extract title: {reason}"),
            format!("Failed to extract body: {reason}"),
        ),
        None => (
            "Failed to extract title".to_string(),
            "Failed to extract body".to_string(),
        ),
    };
    ExtractedArticle {
        url: url.to_string(),
        title,
        body,
    }
}
