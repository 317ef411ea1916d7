//! Data models flowing through a harvest run.
//!
//! - [`ArticleSummary`]: one entry on a category listing page
//! - [`PageResult`]: everything parsed from one listing page
//! - [`CategoryListing`]: a category id and its first listing page
//! - [`HarvestedArticle`]: a summary inside the date window, tagged with its category
//! - [`ExtractedArticle`]: title and body pulled from an article page
//! - [`ArticleRecord`]: the exported row
//!
//! Summaries and page results live only for one page-processing step.
//! Harvested articles accumulate for the whole run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An article link and publish date as shown on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
    /// Absolute article URL; unique within one scan of a category.
    pub url: String,
    pub published_at: NaiveDate,
}

/// A category of the announcement archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryListing {
    /// Slug taken from the listing URL, e.g. `earn`.
    pub category_id: String,
    /// URL of page 1 of the category listing.
    pub base_url: String,
}

/// The parsed contents of one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    /// Summaries in listing order (newest first).
    pub summaries: Vec<ArticleSummary>,
    /// Highest page number in the pagination controls. Only read from page 1.
    pub total_pages: Option<u32>,
}

/// A listing entry that fell inside the requested window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestedArticle {
    pub url: String,
    pub published_at: NaiveDate,
    pub category_id: String,
}

/// Title and body text of one article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub url: String,
    pub title: String,
    pub body: String,
}

/// One exported row. Field order is the column order of the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Publish date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub title: String,
    pub body: String,
    pub category: String,
}

impl ArticleRecord {
    pub fn new(article: &HarvestedArticle, extracted: ExtractedArticle) -> Self {
        Self {
            date: article.published_at,
            title: extracted.title,
            body: extracted.body,
            category: article.category_id.clone(),
        }
    }
}

/// A closed date range compared at day granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Returns `None` when `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_before_start(&self, date: NaiveDate) -> bool {
        date < self.start
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_date_window_is_closed_on_both_ends() {
        let window = DateWindow::new(date("2025-03-01"), date("2025-03-31")).unwrap();
        assert!(window.contains(date("2025-03-01")));
        assert!(window.contains(date("2025-03-31")));
        assert!(window.contains(date("2025-03-15")));
        assert!(!window.contains(date("2025-02-28")));
        assert!(!window.contains(date("2025-04-01")));
    }

    #[test]
    fn test_date_window_single_day() {
        let window = DateWindow::new(date("2025-03-01"), date("2025-03-01")).unwrap();
        assert!(window.contains(date("2025-03-01")));
        assert!(window.is_before_start(date("2025-02-28")));
        assert!(!window.is_before_start(date("2025-03-02")));
    }

    #[test]
    fn test_date_window_rejects_inverted_range() {
        assert!(DateWindow::new(date("2025-03-02"), date("2025-03-01")).is_none());
    }

    #[test]
    fn test_article_record_serialization() {
        let article = HarvestedArticle {
            url: "https://www.okx.com/help/earn-update".to_string(),
            published_at: date("2025-05-06"),
            category_id: "earn".to_string(),
        };
        let record = ArticleRecord::new(
            &article,
            ExtractedArticle {
                url: article.url.clone(),
                title: "Earn update".to_string(),
                body: "Body text".to_string(),
            },
        );

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2025-05-06","title":"Earn update","body":"Body text","category":"earn"}"#
        );
    }
}
