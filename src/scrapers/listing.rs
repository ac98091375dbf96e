//! Briefing-room listing page parser.
//!
//! A listing page holds one `.entry-list` container whose `li` children look
//! like:
//!
//! ```html
//! <li>
//!   <h3><a href="/the-press-office/2014/03/05/press-briefing-...">Press Briefing by ...</a></h3>
//!   <p class="date-line">March 5, 2014</p>
//! </li>
//! ```
//!
//! Statements, readouts and other entry types share the list; only titles
//! starting with the configured prefix are kept.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::errors::MalformedRecordError;
use crate::models::BriefingRecord;
use crate::utils::parse_listing_date;

static ENTRY_LIST: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".entry-list").expect("static selector"));
static DATE_LINE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".date-line").expect("static selector"));
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3 a").expect("static selector"));

/// Everything found on one listing page.
#[derive(Debug, Default)]
pub struct ListingPage {
    /// Kept briefings, in page order.
    pub records: Vec<BriefingRecord>,
    /// Briefing items that could not be parsed.
    pub malformed: Vec<MalformedRecordError>,
    /// Items dropped by the title prefix filter.
    pub skipped: usize,
    /// Total `li` items in the container.
    pub items: usize,
}

/// Parse one listing page.
///
/// Returns `None` when the page has no `.entry-list` container at all.
/// Relative links are resolved against `base`.
pub fn parse_listing(html: &str, base: &Url, title_prefix: &str) -> Option<ListingPage> {
    let document = Html::parse_document(html);
    let container = document.select(&ENTRY_LIST).next()?;

    let mut page = ListingPage::default();
    for item in container
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "li")
    {
        page.items += 1;
        match parse_item(item, base, title_prefix) {
            Ok(Some(record)) => page.records.push(record),
            Ok(None) => page.skipped += 1,
            Err(e) => page.malformed.push(e),
        }
    }

    debug!(
        items = page.items,
        kept = page.records.len(),
        skipped = page.skipped,
        malformed = page.malformed.len(),
        "Parsed listing page"
    );
    Some(page)
}

/// `Ok(None)` for entries that are not briefings.
fn parse_item(
    item: ElementRef<'_>,
    base: &Url,
    title_prefix: &str,
) -> Result<Option<BriefingRecord>, MalformedRecordError> {
    let link = item.select(&TITLE_LINK).next();
    let title = link.map(|a| collapse_whitespace(&a.text().collect::<String>()));
    let malformed = |reason: &str| MalformedRecordError {
        title: title.clone().unwrap_or_default(),
        reason: reason.to_string(),
    };

    let (Some(link), Some(title)) = (link, title.as_deref()) else {
        return Err(malformed("no h3 title link"));
    };
    if !title.starts_with(title_prefix) {
        return Ok(None);
    }

    let href = link
        .value()
        .attr("href")
        .ok_or_else(|| malformed("title link has no href"))?;
    let transcript_url = base
        .join(href.trim())
        .map_err(|e| malformed(&format!("bad transcript link {href:?}: {e}")))?;

    let date_text = item
        .select(&DATE_LINE)
        .next()
        .map(|d| d.text().collect::<String>())
        .ok_or_else(|| malformed("no .date-line"))?;
    let date = parse_listing_date(&date_text)
        .ok_or_else(|| malformed(&format!("unparseable date {:?}", date_text.trim())))?;

    Ok(Some(BriefingRecord::new(date, title, transcript_url.as_str())))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base() -> Url {
        Url::parse("http://www.whitehouse.gov").unwrap()
    }

    fn item(title: &str, href: &str, date: &str) -> String {
        format!(
            r#"<li><h3><a href="{href}">{title}</a></h3><p class="date-line">{date}</p></li>"#
        )
    }

    fn page(items: &[String]) -> String {
        format!(
            r#"<html><body><div id="main"><ul class="entry-list">{}</ul></div></body></html>"#,
            items.join("\n")
        )
    }

    #[test]
    fn test_keeps_only_press_briefings() {
        let html = page(&[
            item(
                "Press Briefing by Press Secretary Jay Carney, 3/5/2014",
                "/the-press-office/2014/03/05/press-briefing",
                "March 5, 2014",
            ),
            item(
                "Statement by the President on Ukraine",
                "/the-press-office/2014/03/05/statement",
                "March 5, 2014",
            ),
            item(
                "Readout of the President's Call",
                "/the-press-office/2014/03/04/readout",
                "March 4, 2014",
            ),
        ]);

        let parsed = parse_listing(&html, &base(), "Press Briefing").unwrap();
        assert_eq!(parsed.items, 3);
        assert_eq!(parsed.skipped, 2);
        assert!(parsed.malformed.is_empty());
        assert_eq!(parsed.records.len(), 1);

        let record = &parsed.records[0];
        assert_eq!(record.publication_date, NaiveDate::from_ymd_opt(2014, 3, 5).unwrap());
        assert_eq!(
            record.transcript_url,
            "http://www.whitehouse.gov/the-press-office/2014/03/05/press-briefing"
        );
        assert!(record.slug.starts_with("03-05-14-press-briefing"));
    }

    #[test]
    fn test_bad_date_skips_item_not_page() {
        let html = page(&[
            item("Press Briefing, 1/2/2014", "/a", "Janvier 2, 2014"),
            item("Press Briefing, 1/3/2014", "/b", "January 3, 2014"),
        ]);

        let parsed = parse_listing(&html, &base(), "Press Briefing").unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.malformed.len(), 1);
        assert_eq!(parsed.malformed[0].title, "Press Briefing, 1/2/2014");
        assert!(parsed.malformed[0].reason.contains("Janvier"));
    }

    #[test]
    fn test_missing_link_is_malformed() {
        let html = page(&[r#"<li><h3>Press Briefing</h3><p class="date-line">May 1, 2014</p></li>"#.to_string()]);
        let parsed = parse_listing(&html, &base(), "Press Briefing").unwrap();
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.malformed.len(), 1);
    }

    #[test]
    fn test_title_whitespace_is_collapsed() {
        let html = page(&[item(
            "\n   Press Briefing by\n  Press Secretary Josh Earnest  ",
            "http://www.whitehouse.gov/abs",
            "  November 9, 2014 ",
        )]);
        let parsed = parse_listing(&html, &base(), "Press Briefing").unwrap();
        assert_eq!(parsed.records[0].title, "Press Briefing by Press Secretary Josh Earnest");
        assert_eq!(parsed.records[0].transcript_url, "http://www.whitehouse.gov/abs");
    }

    #[test]
    fn test_missing_container() {
        assert!(parse_listing("<html><body><p>Maintenance</p></body></html>", &base(), "Press Briefing").is_none());
    }

    #[test]
    fn test_empty_container() {
        let parsed = parse_listing(&page(&[]), &base(), "Press Briefing").unwrap();
        assert_eq!(parsed.items, 0);
        assert!(parsed.records.is_empty());
    }
}
