//! Harvest engine: walks category listings and collects articles inside a
//! date window.
//!
//! # Per-category state machine
//!
//! ```text
//! Start -> FetchingPage1 -> Walking(page) -+-> Walking(page + 1)
//!   ^                                      +-> EarlyStop ------> Committed
//!   |                                      +-> ExhaustedPages -> Committed
//!   +---- attempt < budget <----------------+-> Race / FetchFailed
//!                                                 |
//!                              attempt == budget -+-> Abandoned
//! ```
//!
//! The listing is live and newest-first, so an item inserted at the top while
//! an attempt is walking pushes an already-seen URL onto a later page. Each
//! attempt owns a fresh seen-URL set; a repeat means the attempt did not
//! observe one consistent ordering and is thrown away whole, since the shift
//! poisons every page collected so far. A page fetch failure is handled the
//! same way and draws on the same attempt budget.
//!
//! Results for a category reach the run-wide [`HarvestReport`] only after an
//! attempt completes, so an abandoned category leaves earlier ones untouched.

use crate::config::HarvestConfig;
use crate::error::FetchError;
use crate::fetch::PageFetcher;
use crate::models::{ArticleSummary, CategoryListing, DateWindow, HarvestedArticle};
use crate::scrapers::archive::fetch_page;
use crate::utils::backoff;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Why a single scan attempt was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// `url` was already seen earlier in the same attempt.
    Race { page: u32, url: String },
    /// Listing page `page` could not be fetched.
    Fetch { page: u32, reason: String },
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Race { page, url } => {
                write!(f, "listing changed during scan: {url} seen again on page {page}")
            }
            AttemptFailure::Fetch { page, reason } => {
                write!(f, "failed to fetch page {page}: {reason}")
            }
        }
    }
}

/// How a completed attempt ended its walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStop {
    /// Page `page` reached back past the window start.
    EarlyStop { page: u32 },
    /// Every page up to the (possibly capped) page count was visited.
    ExhaustedPages { page: u32 },
}

/// The committed result of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryHarvest {
    pub category_id: String,
    pub articles: Vec<HarvestedArticle>,
    /// Page count reported by page 1, or 1 when it has no pagination.
    pub reported_pages: u32,
    pub pages_visited: u32,
    /// The reported page count exceeded `max_pages`.
    pub capped: bool,
    pub stop: ScanStop,
    /// Attempts used, including the successful one.
    pub attempts: u32,
}

/// A category that ran out of attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbandonedCategory {
    pub category_id: String,
    pub attempts: u32,
    pub last_failure: AttemptFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOutcome {
    Committed(CategoryHarvest),
    Abandoned(AbandonedCategory),
}

/// Run-scoped collector of committed categories.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    /// Articles of every committed category, in category then listing order.
    pub articles: Vec<HarvestedArticle>,
    pub committed: Vec<String>,
    pub abandoned: Vec<AbandonedCategory>,
}

impl HarvestReport {
    pub fn record(&mut self, outcome: CategoryOutcome) {
        match outcome {
            CategoryOutcome::Committed(harvest) => {
                self.committed.push(harvest.category_id);
                self.articles.extend(harvest.articles);
            }
            CategoryOutcome::Abandoned(abandoned) => self.abandoned.push(abandoned),
        }
    }
}

/// State of one scan attempt. Never reused across attempts.
#[derive(Debug, Default)]
struct AttemptScan {
    seen: HashSet<String>,
    articles: Vec<HarvestedArticle>,
}

impl AttemptScan {
    /// Record a summary, returning its URL back if it was already seen.
    fn observe(
        &mut self,
        summary: ArticleSummary,
        category_id: &str,
        window: &DateWindow,
    ) -> Result<(), String> {
        if !self.seen.insert(summary.url.clone()) {
            return Err(summary.url);
        }
        if window.contains(summary.published_at) {
            self.articles.push(HarvestedArticle {
                url: summary.url,
                published_at: summary.published_at,
                category_id: category_id.to_string(),
            });
        }
        Ok(())
    }
}

/// Whether a page shows the walk has gone past the window start.
///
/// Page 1 only stops the walk when every entry is older, since a pinned old
/// post can sit above newer ones there. Later pages stop on the first older
/// entry.
pub fn should_stop_early(page: u32, summaries: &[ArticleSummary], window: &DateWindow) -> bool {
    let older = |s: &ArticleSummary| window.is_before_start(s.published_at);
    if page > 1 {
        summaries.iter().any(older)
    } else {
        !summaries.is_empty() && summaries.iter().all(older)
    }
}

#[derive(Debug)]
pub struct HarvestEngine<'a, F> {
    fetcher: &'a F,
    window: DateWindow,
    max_pages: u32,
    attempts: u32,
    timeout: Duration,
    base_delay: Duration,
    max_delay: Duration,
}

impl<'a, F: PageFetcher> HarvestEngine<'a, F> {
    pub fn new(fetcher: &'a F, config: &HarvestConfig, window: DateWindow) -> Self {
        Self {
            fetcher,
            window,
            max_pages: config.max_pages.max(1),
            attempts: config.category_attempts.max(1),
            timeout: config.listing_timeout(),
            base_delay: config.retry_base_delay(),
            max_delay: config.retry_max_delay(),
        }
    }

    /// Harvest every category in order.
    ///
    /// Abandoned categories are reported and skipped; they never stop the run.
    #[instrument(level = "info", skip_all, fields(window = %self.window, categories = categories.len()))]
    pub async fn harvest(&self, categories: &[CategoryListing]) -> HarvestReport {
        let mut report = HarvestReport::default();
        for listing in categories {
            let outcome = self.harvest_category(listing).await;
            report.record(outcome);
        }
        info!(
            articles = report.articles.len(),
            committed = report.committed.len(),
            abandoned = report.abandoned.len(),
            "Harvest finished"
        );
        report
    }

    /// Scan one category until an attempt completes or the budget runs out.
    #[instrument(level = "info", skip_all, fields(category = %listing.category_id))]
    pub async fn harvest_category(&self, listing: &CategoryListing) -> CategoryOutcome {
        info!(url = %listing.base_url, "Processing category");
        let mut attempt = 1;
        loop {
            match self.scan(listing, attempt).await {
                Ok(harvest) => {
                    info!(
                        attempt,
                        articles = harvest.articles.len(),
                        reported_pages = harvest.reported_pages,
                        pages_visited = harvest.pages_visited,
                        capped = harvest.capped,
                        stop = ?harvest.stop,
                        "Finished processing category"
                    );
                    return CategoryOutcome::Committed(harvest);
                }
                Err(failure) => {
                    match &failure {
                        AttemptFailure::Race { page, url } => warn!(
                            attempt,
                            page,
                            %url,
                            "Duplicate article found; listing changed mid-scan"
                        ),
                        AttemptFailure::Fetch { page, reason } => warn!(
                            attempt,
                            page,
                            %reason,
                            "Listing page fetch failed"
                        ),
                    }
                    if attempt >= self.attempts {
                        warn!(
                            attempts = attempt,
                            reason = %failure,
                            "Max attempts reached; abandoning category"
                        );
                        return CategoryOutcome::Abandoned(AbandonedCategory {
                            category_id: listing.category_id.clone(),
                            attempts: attempt,
                            last_failure: failure,
                        });
                    }
                    info!(attempt, "Restarting category scan from page 1");
                    backoff(attempt, self.base_delay, self.max_delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One front-to-back walk of a category listing.
    async fn scan(
        &self,
        listing: &CategoryListing,
        attempt: u32,
    ) -> Result<CategoryHarvest, AttemptFailure> {
        let fetch_failure = |page: u32| {
            move |e: FetchError| AttemptFailure::Fetch {
                page,
                reason: e.to_string(),
            }
        };

        let mut current = fetch_page(self.fetcher, listing, 1, self.timeout)
            .await
            .map_err(fetch_failure(1))?;
        let reported_pages = current.total_pages.unwrap_or(1).max(1);
        let capped = reported_pages > self.max_pages;
        if capped {
            warn!(
                reported_pages,
                max_pages = self.max_pages,
                "Category has more pages than max_pages; coverage may be incomplete"
            );
        }
        let pages_to_visit = reported_pages.min(self.max_pages);

        let mut scan = AttemptScan::default();
        let mut page = 1;
        let stop = loop {
            let stop_early = should_stop_early(page, &current.summaries, &self.window);
            for summary in current.summaries {
                scan.observe(summary, &listing.category_id, &self.window)
                    .map_err(|url| AttemptFailure::Race { page, url })?;
            }
            if stop_early {
                break ScanStop::EarlyStop { page };
            }
            if page >= pages_to_visit {
                break ScanStop::ExhaustedPages { page };
            }
            page += 1;
            current = fetch_page(self.fetcher, listing, page, self.timeout)
                .await
                .map_err(fetch_failure(page))?;
        };

        Ok(CategoryHarvest {
            category_id: listing.category_id.clone(),
            articles: scan.articles,
            reported_pages,
            pages_visited: page,
            capped,
            stop,
            attempts: attempt,
        })
    }
}
