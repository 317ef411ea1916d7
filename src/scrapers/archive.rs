//! Announcement archive scraper: category discovery and listing pages.
//!
//! # URL Pattern
//!
//! Categories live under `/help/section/announcements-{slug}`. Page 1 of a
//! category is the bare section URL, later pages append `/page/{n}`:
//!
//! ```text
//! https://www.okx.com/help/section/announcements-earn
//! https://www.okx.com/help/section/announcements-earn/page/2
//! ```
//!
//! # Listing Shape
//!
//! Each entry is an `li` whose class contains `index_articleItem`, holding the
//! article link and a `DateDisplay` span such as `Published on Mar 5, 2025`.
//! Pagination links carry `data-e2e-okd-pagination-pager`; only page 1's
//! controls are trusted for the page count.

use crate::error::{DiscoveryError, FetchError};
use crate::fetch::PageFetcher;
use crate::models::{ArticleSummary, CategoryListing, PageResult};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

const CATEGORY_MARKER: &str = "/help/section/announcements-";
/// Aggregate of every category, capped by the site short of full coverage.
const AGGREGATE_CATEGORY: &str = "announcements-latest-announcements";
const DATE_PREFIX: &str = "Published on ";
const DATE_FORMAT: &str = "%b %d, %Y";

static NAV_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"nav[aria-label="Announcements"]"#).expect("valid selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));
static ITEM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"li[class*="index_articleItem"]"#).expect("valid selector"));
static DATE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"span[data-testid="DateDisplay"]"#).expect("valid selector"));
static PAGER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("ul.okui-pagination a[data-e2e-okd-pagination-pager]")
        .expect("valid selector")
});

/// Fetch the archive homepage and list its categories.
///
/// # Errors
///
/// Fails when the homepage cannot be fetched or has no announcements
/// navigation. Either way the run has nothing to harvest.
#[instrument(level = "info", skip(fetcher))]
pub async fn discover_categories<F: PageFetcher>(
    fetcher: &F,
    homepage_url: &str,
    timeout: Duration,
) -> Result<Vec<CategoryListing>, DiscoveryError> {
    let homepage = Url::parse(homepage_url).map_err(|source| DiscoveryError::InvalidUrl {
        url: homepage_url.to_string(),
        source,
    })?;
    let document = fetcher.fetch(homepage_url, timeout).await?;
    let categories = parse_categories(&document, &homepage)?;

    info!(
        count = categories.len(),
        source = homepage_url,
        "Discovered announcement categories"
    );
    debug!(categories = ?categories, "Category listings");
    Ok(categories)
}

/// Extract category listings from a parsed homepage, in navigation order.
///
/// The aggregate "latest announcements" category is skipped. When two links
/// map to the same id the first one wins.
pub fn parse_categories(
    document: &Html,
    homepage: &Url,
) -> Result<Vec<CategoryListing>, DiscoveryError> {
    let nav = document
        .select(&NAV_SELECTOR)
        .next()
        .ok_or_else(|| DiscoveryError::MissingNavigation {
            url: homepage.to_string(),
        })?;

    let mut seen = HashSet::new();
    let mut categories = Vec::new();
    for link in nav.select(&LINK_SELECTOR) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !href.contains(CATEGORY_MARKER) || href.contains(AGGREGATE_CATEGORY) {
            continue;
        }
        let Some(category_id) = category_id(href) else {
            continue;
        };
        let Ok(base_url) = homepage.join(href) else {
            warn!(href, "Skipping category link that is not a valid URL");
            continue;
        };
        if seen.insert(category_id.clone()) {
            categories.push(CategoryListing {
                category_id,
                base_url: base_url.to_string(),
            });
        }
    }
    Ok(categories)
}

/// Category id from a listing href: the text after the last `announcements-`.
///
/// ```ignore
/// assert_eq!(category_id("/help/section/announcements-earn/"), Some("earn".into()));
/// ```
pub fn category_id(href: &str) -> Option<String> {
    let (_, tail) = href.rsplit_once("announcements-")?;
    let id = tail.trim_end_matches('/');
    (!id.is_empty()).then(|| id.to_string())
}

/// URL of listing page `page` (1-based) for a category.
pub fn page_url(base_url: &str, page: u32) -> String {
    if page > 1 {
        format!("{}/page/{}", base_url.trim_end_matches('/'), page)
    } else {
        base_url.to_string()
    }
}

/// Fetch and parse one listing page of a category.
#[instrument(level = "debug", skip(fetcher, listing), fields(category = %listing.category_id))]
pub async fn fetch_page<F: PageFetcher>(
    fetcher: &F,
    listing: &CategoryListing,
    page: u32,
    timeout: Duration,
) -> Result<PageResult, FetchError> {
    let url = page_url(&listing.base_url, page);
    let document = fetcher.fetch(&url, timeout).await?;
    let base = Url::parse(&listing.base_url).ok();
    let result = parse_page(&document, page, base.as_ref());
    debug!(
        %url,
        summaries = result.summaries.len(),
        total_pages = ?result.total_pages,
        "Parsed listing page"
    );
    Ok(result)
}

/// Parse the summaries of one listing page.
///
/// Items missing a link or a date are skipped. Unparseable dates are skipped
/// with a warning. `total_pages` is only filled in for page 1.
pub fn parse_page(document: &Html, page: u32, base: Option<&Url>) -> PageResult {
    let mut summaries = Vec::new();

    for item in document.select(&ITEM_SELECTOR) {
        let href = item
            .select(&LINK_SELECTOR)
            .next()
            .and_then(|a| a.value().attr("href"));
        let date = item.select(&DATE_SELECTOR).next();
        let (Some(href), Some(date)) = (href, date) else {
            continue;
        };

        let url = match base.map(|b| b.join(href)) {
            Some(Ok(resolved)) => resolved.to_string(),
            Some(Err(e)) => {
                warn!(href, error = %e, "Skipping listing item with invalid link");
                continue;
            }
            None => href.to_string(),
        };

        let raw_date = date.text().collect::<String>();
        let raw_date = raw_date.trim();
        let raw_date = raw_date.strip_prefix(DATE_PREFIX).unwrap_or(raw_date).trim();
        match NaiveDate::parse_from_str(raw_date, DATE_FORMAT) {
            Ok(published_at) => summaries.push(ArticleSummary { url, published_at }),
            Err(e) => {
                warn!(raw_date, %url, error = %e, "Could not parse listing date; skipping item");
            }
        }
    }

    let total_pages = if page == 1 {
        total_pages(document)
    } else {
        None
    };
    PageResult {
        summaries,
        total_pages,
    }
}

/// Highest numeric label among the pagination controls.
fn total_pages(document: &Html) -> Option<u32> {
    document
        .select(&PAGER_SELECTOR)
        .filter_map(|a| {
            let label = a.text().collect::<String>();
            let label = label.trim();
            if !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit()) {
                label.parse::<u32>().ok()
            } else {
                None
            }
        })
        .max()
}
