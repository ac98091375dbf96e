//! Utility functions for slugs, date keys, log truncation and directories.
//!
//! This module provides helpers used throughout the pipeline:
//! - Slugification of briefing titles into stable join keys
//! - The three date formats the artifacts are keyed by
//! - String truncation for logging
//! - File system validation for the data directory

use chrono::NaiveDate;
use std::fs as stdfs;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Date format used by the listing pages and the ledger (`March 5, 2014`).
pub const LISTING_DATE_FORMAT: &str = "%B %d, %Y";

/// Date format keying frequency index artifacts (`03-05-14`).
pub const INDEX_KEY_FORMAT: &str = "%m-%d-%y";

/// Date format of week starts in the summary and workbooks (`2014-03-02`).
pub const WEEK_FORMAT: &str = "%Y-%m-%d";

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (on a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Convert arbitrary text to a URL-friendly slug.
///
/// Lowercases the text, collapses every run of non-alphanumeric characters
/// into a single hyphen and trims hyphens from both ends. Apostrophes are
/// dropped, so `President's` becomes `presidents`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Press Briefing by Press Secretary Jay Carney, 1/2/2014"),
///            "press-briefing-by-press-secretary-jay-carney-1-2-2014");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.trim().chars().flat_map(char::to_lowercase) {
        if matches!(c, '\'' | '\u{2018}' | '\u{2019}') {
            continue;
        }
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Derive the slug of a briefing from its publication date and title.
pub fn briefing_slug(date: NaiveDate, title: &str) -> String {
    slugify(&format!("{}-{}", date.format(INDEX_KEY_FORMAT), title.trim()))
}

/// Parse a listing date such as `March 5, 2014`.
pub fn parse_listing_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), LISTING_DATE_FORMAT).ok()
}

/// Parse an index key such as `03-05-14` back into a date.
pub fn parse_index_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, INDEX_KEY_FORMAT).ok()
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let scratch = path.join(".write_check");
    stdfs::File::create(&scratch)?;
    let _ = stdfs::remove_file(&scratch);
    info!("Data directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let s = "é".repeat(10);
        let result = truncate_for_log(&s, 3);
        assert!(result.starts_with('é'));
        assert!(result.contains("(+18 bytes)"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Test-Article!"), "test-article");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("  --Trimmed--  "), "trimmed");
        assert_eq!(slugify("Special@#$Characters"), "special-characters");
        assert_eq!(slugify("President's Plan"), "presidents-plan");
        assert_eq!(slugify("President’s ‘Plan’"), "presidents-plan");
    }

    #[test]
    fn test_briefing_slug_prefixes_index_key() {
        let date = NaiveDate::from_ymd_opt(2014, 3, 5).unwrap();
        assert_eq!(
            briefing_slug(date, "Press Briefing by Press Secretary Jay Carney, 3/5/2014"),
            "03-05-14-press-briefing-by-press-secretary-jay-carney-3-5-2014"
        );
    }

    #[test]
    fn test_parse_listing_date() {
        assert_eq!(
            parse_listing_date(" March 5, 2014 "),
            NaiveDate::from_ymd_opt(2014, 3, 5)
        );
        assert_eq!(
            parse_listing_date("December 31, 2014"),
            NaiveDate::from_ymd_opt(2014, 12, 31)
        );
        assert_eq!(parse_listing_date("2014-03-05"), None);
        assert_eq!(parse_listing_date("Smarch 5, 2014"), None);
    }

    #[test]
    fn test_index_key_round_trips_date() {
        let date = NaiveDate::from_ymd_opt(2014, 11, 9).unwrap();
        let key = date.format(INDEX_KEY_FORMAT).to_string();
        assert_eq!(key, "11-09-14");
        assert_eq!(parse_index_key(&key), Some(date));
        assert_eq!(parse_index_key("not-a-date"), None);
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/c");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join(".write_check").exists());
    }
}
