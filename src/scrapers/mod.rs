//! Scrapers for the briefing-room website.
//!
//! Scraping follows the same two-phase pattern as the rest of the pipeline:
//!
//! 1. **Indexing**: [`crawler`] walks the paginated listing, using [`listing`]
//!    to parse each page, and appends discovered briefings to the ledger
//! 2. **Fetching**: [`transcript`] downloads each briefing's transcript page
//!    and writes its body text to disk
//!
//! All network access goes through a [`Fetch`](crate::fetcher::Fetch)
//! implementation, so failed items are logged and skipped without failing
//! the batch, and re-runs are served from the response cache.

pub mod crawler;
pub mod listing;
pub mod transcript;
