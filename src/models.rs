//! Data models flowing through the briefing pipeline.
//!
//! This module defines the core data structures used throughout the application:
//! - [`BriefingRecord`]: One press briefing discovered on the listing pages
//! - [`RecordId`]: The typed `(date, slug)` identity carried between stages
//! - [`TranscriptDocument`]: Extracted body text of one transcript
//! - [`FrequencyIndex`]: N-gram counts for one transcript date
//! - [`WeeklyBucket`], [`SynonymGroup`], [`TimeSeriesSheet`]: aggregation and export

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::{INDEX_KEY_FORMAT, briefing_slug};

/// A press briefing as listed on the briefing-room index pages.
///
/// The `slug` is derived from the date and title and is the join key between
/// the ledger row, the transcript text artifact and its frequency index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BriefingRecord {
    /// Publication date shown on the listing.
    pub publication_date: NaiveDate,
    /// Listing title, e.g. "Press Briefing by Press Secretary Jay Carney, 3/5/2014".
    pub title: String,
    /// Absolute URL of the transcript page.
    pub transcript_url: String,
    /// Deterministic identifier derived from `(publication_date, title)`.
    pub slug: String,
}

impl BriefingRecord {
    pub fn new(publication_date: NaiveDate, title: &str, transcript_url: &str) -> Self {
        let title = title.trim().to_string();
        Self {
            slug: briefing_slug(publication_date, &title),
            publication_date,
            title,
            transcript_url: transcript_url.trim().to_string(),
        }
    }

    pub fn id(&self) -> RecordId {
        RecordId {
            date: self.publication_date,
            slug: self.slug.clone(),
        }
    }
}

/// Identity of a record as it moves from extraction to indexing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub date: NaiveDate,
    pub slug: String,
}

impl RecordId {
    /// Key of the frequency index artifact for this record (`MM-DD-YY`).
    ///
    /// Records sharing a date share a key; the later index replaces the earlier.
    pub fn index_key(&self) -> String {
        self.date.format(INDEX_KEY_FORMAT).to_string()
    }
}

/// A fetched transcript and the plain text extracted from it.
#[derive(Debug, Clone)]
pub struct TranscriptDocument {
    pub id: RecordId,
    /// The page as served.
    pub raw_html: String,
    /// Content blocks, trimmed and joined with `\n`.
    pub body_text: String,
}

/// N-gram frequency table for the transcript published on `date`.
///
/// Unigrams, bigrams and trigrams share the `words` map; multi-word keys are
/// joined by single spaces so orders can never collide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyIndex {
    #[serde(default)]
    pub date: NaiveDate,
    pub words: BTreeMap<String, u64>,
}

impl FrequencyIndex {
    /// Count for a term, zero when it never occurred.
    pub fn count(&self, term: &str) -> u64 {
        self.words.get(term).copied().unwrap_or(0)
    }
}

/// Tracked-term counts for the week starting on `week_start` (a Sunday).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyBucket {
    pub week_start: NaiveDate,
    pub term_counts: BTreeMap<String, u64>,
}

impl WeeklyBucket {
    /// A bucket with every tracked term present at zero.
    pub fn zeroed(week_start: NaiveDate, terms: &[String]) -> Self {
        Self {
            week_start,
            term_counts: terms.iter().map(|t| (t.clone(), 0)).collect(),
        }
    }

    pub fn count(&self, term: &str) -> u64 {
        self.term_counts.get(term).copied().unwrap_or(0)
    }
}

/// Terms whose weekly counts are reported as one series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymGroup {
    pub canonical_term: String,
    pub members: Vec<String>,
}

impl SynonymGroup {
    /// Build a group from its members; the first member is canonical.
    pub fn from_members(members: Vec<String>) -> Option<Self> {
        let canonical_term = members.first()?.clone();
        Some(Self {
            canonical_term,
            members,
        })
    }

    /// A pseudo-group holding a single term.
    pub fn single(term: &str) -> Self {
        Self {
            canonical_term: term.to_string(),
            members: vec![term.to_string()],
        }
    }

    /// Worksheet name: the bare term for single-member groups, otherwise
    /// `"{canonical} (+{members})"`.
    pub fn sheet_name(&self) -> String {
        if self.members.len() == 1 {
            self.canonical_term.clone()
        } else {
            format!("{} (+{})", self.canonical_term, self.members.len())
        }
    }

    /// Sum of member counts in one bucket, missing members counting zero.
    pub fn count_in(&self, bucket: &WeeklyBucket) -> u64 {
        self.members.iter().map(|m| bucket.count(m)).sum()
    }
}

/// One exported series: `(week_start, count)` rows in chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesSheet {
    pub name: String,
    pub rows: Vec<(NaiveDate, u64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_briefing_record_derives_slug() {
        let record = BriefingRecord::new(
            date(2014, 1, 2),
            "  Press Briefing by Press Secretary Jay Carney, 1/2/2014 ",
            "https://www.whitehouse.gov/the-press-office/2014/01/02/briefing",
        );
        assert_eq!(
            record.slug,
            "01-02-14-press-briefing-by-press-secretary-jay-carney-1-2-2014"
        );
        assert_eq!(record.title, "Press Briefing by Press Secretary Jay Carney, 1/2/2014");
        assert_eq!(record.id().index_key(), "01-02-14");
    }

    #[test]
    fn test_frequency_index_serialization() {
        let mut index = FrequencyIndex {
            date: date(2014, 3, 5),
            words: BTreeMap::new(),
        };
        index.words.insert("ukraine".to_string(), 4);
        index.words.insert("health care".to_string(), 2);

        let json = serde_json::to_string(&index).unwrap();
        assert!(json.contains(r#""date":"2014-03-05""#));
        assert!(json.contains(r#""health care":2"#));

        let back: FrequencyIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back.count("ukraine"), 4);
        assert_eq!(back.count("crimea"), 0);
    }

    #[test]
    fn test_zeroed_bucket_has_every_term() {
        let terms = vec!["isis".to_string(), "ebola".to_string()];
        let bucket = WeeklyBucket::zeroed(date(2014, 1, 5), &terms);
        assert_eq!(bucket.term_counts.len(), 2);
        assert_eq!(bucket.count("isis"), 0);
        assert_eq!(bucket.count("ebola"), 0);
    }

    #[test]
    fn test_synonym_group_naming_and_sum() {
        let group = SynonymGroup::from_members(vec![
            "ukraine".to_string(),
            "ukrainian".to_string(),
            "crimea".to_string(),
        ])
        .unwrap();
        assert_eq!(group.canonical_term, "ukraine");
        assert_eq!(group.sheet_name(), "ukraine (+3)");
        assert_eq!(SynonymGroup::single("ebola").sheet_name(), "ebola");
        assert!(SynonymGroup::from_members(vec![]).is_none());

        let mut bucket = WeeklyBucket::zeroed(date(2014, 3, 2), &[]);
        bucket.term_counts.insert("ukraine".to_string(), 7);
        bucket.term_counts.insert("crimea".to_string(), 2);
        assert_eq!(group.count_in(&bucket), 9);
    }
}
