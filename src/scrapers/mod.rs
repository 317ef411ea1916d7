//! Scrapers for the announcement archive.
//!
//! Scraping is split in two phases, like every source this crate has
//! targeted:
//!
//! 1. **Indexing** ([`archive`]): discover categories on the archive
//!    homepage and read listing pages into article summaries
//! 2. **Fetching** ([`article`]): download each article page and extract its
//!    title and body
//!
//! Both phases only talk to the network through
//! [`PageFetcher`](crate::fetch::PageFetcher).
//!
//! Missing per-item fields and unparseable dates are logged and skipped.
//! Failed article pages become placeholder records.

pub mod archive;
pub mod article;
