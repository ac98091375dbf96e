//! Weekly aggregation of tracked-term counts.
//!
//! Every Sunday of the target year gets a bucket up front, so the time axis is
//! complete and gap-free even for weeks without a single briefing. Each
//! frequency index is then added to the bucket of the Sunday starting its
//! week. Indexes dated before the year's first Sunday belong to a week that
//! starts in the previous year; that bucket is not part of the axis and their
//! counts are discarded.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

use super::index::IndexStore;
use crate::errors::PipelineResult;
use crate::models::{FrequencyIndex, WeeklyBucket};
use crate::utils::WEEK_FORMAT;

/// Serialized form of a year's buckets: `{"YYYY-MM-DD": {term: count}}`.
pub type WeeklySummary = BTreeMap<String, BTreeMap<String, u64>>;

/// Every Sunday in `year`, ascending.
pub fn all_sundays(year: i32) -> Vec<NaiveDate> {
    let Some(jan1) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return Vec::new();
    };
    let to_sunday = (7 - jan1.weekday().num_days_from_sunday()) % 7;
    let mut sunday = jan1 + Duration::days(i64::from(to_sunday));
    let mut sundays = Vec::with_capacity(53);
    while sunday.year() == year {
        sundays.push(sunday);
        sunday += Duration::days(7);
    }
    sundays
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Tracked-term counts for every week of one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySeries {
    pub year: i32,
    pub terms: Vec<String>,
    pub buckets: BTreeMap<NaiveDate, WeeklyBucket>,
}

impl WeeklySeries {
    /// Zero-filled buckets for every Sunday of `year`.
    pub fn new(year: i32, terms: &[String]) -> Self {
        Self {
            year,
            terms: terms.to_vec(),
            buckets: all_sundays(year)
                .into_iter()
                .map(|sunday| (sunday, WeeklyBucket::zeroed(sunday, terms)))
                .collect(),
        }
    }

    /// Add one index to its week. Returns `false` when the index is outside
    /// the year or its week starts in the previous year.
    pub fn add(&mut self, index: &FrequencyIndex) -> bool {
        if index.date.year() != self.year {
            return false;
        }
        let Some(bucket) = self.buckets.get_mut(&week_start(index.date)) else {
            debug!(date = %index.date, "Week starts in the previous year; discarding");
            return false;
        };
        for term in &self.terms {
            *bucket.term_counts.entry(term.clone()).or_insert(0) += index.count(term);
        }
        true
    }

    /// Buckets in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &WeeklyBucket> {
        self.buckets.values()
    }

    pub fn to_summary(&self) -> WeeklySummary {
        self.buckets
            .iter()
            .map(|(sunday, bucket)| (sunday.format(WEEK_FORMAT).to_string(), bucket.term_counts.clone()))
            .collect()
    }

    /// Rebuild from a stored summary. Weeks or terms absent from the summary
    /// read as zero; entries outside the year's axis are ignored.
    pub fn from_summary(year: i32, terms: &[String], summary: &WeeklySummary) -> Self {
        let mut series = Self::new(year, terms);
        for (week, counts) in summary {
            let Ok(sunday) = NaiveDate::parse_from_str(week, WEEK_FORMAT) else {
                warn!(%week, "Unparseable week in summary; ignoring");
                continue;
            };
            if let Some(bucket) = series.buckets.get_mut(&sunday) {
                for term in terms {
                    if let Some(&count) = counts.get(term) {
                        bucket.term_counts.insert(term.clone(), count);
                    }
                }
            }
        }
        series
    }
}

/// Aggregate in-memory indexes into the weeks of `year`.
pub fn aggregate<'a>(
    year: i32,
    terms: &[String],
    indexes: impl IntoIterator<Item = &'a FrequencyIndex>,
) -> WeeklySeries {
    let mut series = WeeklySeries::new(year, terms);
    for index in indexes {
        series.add(index);
    }
    series
}

/// Aggregate every stored index dated in `year`.
///
/// Best effort: an index that cannot be read or parsed contributes nothing,
/// so the time axis stays complete over whatever data exists.
#[instrument(level = "info", skip(store, terms), fields(terms = terms.len()))]
pub async fn aggregate_year(
    store: &IndexStore,
    year: i32,
    terms: &[String],
) -> PipelineResult<WeeklySeries> {
    let mut indexes = Vec::new();
    let mut unreadable = 0usize;

    for date in store.dates().await?.into_iter().filter(|d| d.year() == year) {
        match store.read(date).await {
            Ok(Some(index)) => indexes.push(index),
            Ok(None) => {
                warn!(%date, "Index vanished while aggregating; counting as zero");
                unreadable += 1;
            }
            Err(e) => {
                warn!(%date, error = %e, "Unreadable index; counting as zero");
                unreadable += 1;
            }
        }
    }

    let series = aggregate(year, terms, &indexes);
    let counted = indexes
        .iter()
        .filter(|index| series.buckets.contains_key(&week_start(index.date)))
        .count();
    info!(
        weeks = series.buckets.len(),
        counted,
        discarded = indexes.len() - counted,
        unreadable,
        "Aggregated weekly counts"
    );
    Ok(series)
}
