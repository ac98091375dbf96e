//! Listing crawler.
//!
//! Walks `?page=0 .. ?page=page_count-1` of the briefing listing, appending
//! every briefing found to the ledger. The listing offers no reliable "last
//! page" signal, so the page count is an operator-supplied bound; with
//! `stop_on_empty_page` the crawl also ends at the first page whose list is
//! empty.

use tracing::{error, info, instrument, warn};
use url::Url;

use crate::config::ListingConfig;
use crate::errors::{PipelineError, PipelineResult};
use crate::fetcher::Fetch;
use crate::ledger::Ledger;
use crate::models::BriefingRecord;
use crate::scrapers::listing::{ListingPage, parse_listing};

/// URL of one listing page.
pub fn page_url(listing_url: &str, page: u32) -> String {
    let separator = if listing_url.contains('?') { '&' } else { '?' };
    format!("{listing_url}{separator}page={page}")
}

/// Crawl the listing and append what was found to the ledger.
///
/// A page that fails to download or parse is logged and skipped; the crawl
/// continues with the next page. Returns the records discovered by this run.
#[instrument(level = "info", skip_all, fields(page_count = page_count))]
pub async fn crawl<F: Fetch>(
    fetcher: &F,
    listing: &ListingConfig,
    page_count: u32,
    ledger: &Ledger,
) -> PipelineResult<Vec<BriefingRecord>> {
    let base = Url::parse(&listing.site_url)
        .map_err(|e| PipelineError::Config(format!("bad site_url {:?}: {e}", listing.site_url)))?;

    let mut discovered = Vec::new();
    for page in 0..page_count {
        let url = page_url(&listing.listing_url, page);
        info!(page, %url, "Parsing listing page");

        let parsed = match crawl_page(fetcher, &url, &base, &listing.title_prefix).await {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(page, %url, error = %e, "Listing page failed; continuing");
                continue;
            }
        };

        for bad in &parsed.malformed {
            warn!(page, %url, title = %bad.title, reason = %bad.reason, "Skipping malformed listing item");
        }
        if !parsed.records.is_empty() {
            ledger.append(&parsed.records).await?;
        }
        info!(
            page,
            kept = parsed.records.len(),
            skipped = parsed.skipped,
            malformed = parsed.malformed.len(),
            "Listing page done"
        );

        let empty = parsed.items == 0;
        discovered.extend(parsed.records);
        if empty && listing.stop_on_empty_page {
            info!(page, "Empty listing page; stopping crawl");
            break;
        }
    }

    info!(count = discovered.len(), "Crawl complete");
    Ok(discovered)
}

async fn crawl_page<F: Fetch>(
    fetcher: &F,
    url: &str,
    base: &Url,
    title_prefix: &str,
) -> PipelineResult<ListingPage> {
    let html = fetcher.fetch(url).await?;
    parse_listing(&html, base, title_prefix).ok_or_else(|| PipelineError::MissingListing {
        url: url.to_string(),
        container: "entry-list".to_string(),
    })
}
