//! Synonym merging: sum member-term series into one series per group.

use std::collections::HashSet;

use super::weekly::WeeklySeries;
use crate::models::{SynonymGroup, TimeSeriesSheet};

/// One sheet per group, each row the sum of the group's member counts for
/// that week. Members that were never tracked contribute zero.
pub fn merge(series: &WeeklySeries, groups: &[SynonymGroup]) -> Vec<TimeSeriesSheet> {
    groups
        .iter()
        .map(|group| TimeSeriesSheet {
            name: group.sheet_name(),
            rows: series
                .iter()
                .map(|bucket| (bucket.week_start, group.count_in(bucket)))
                .collect(),
        })
        .collect()
}

/// Single-member pseudo-group sheets for the `terms` no group covers.
pub fn ungrouped(
    series: &WeeklySeries,
    terms: &[String],
    groups: &[SynonymGroup],
) -> Vec<TimeSeriesSheet> {
    let covered: HashSet<&str> = groups
        .iter()
        .flat_map(|g| g.members.iter().map(String::as_str))
        .collect();
    let singles: Vec<SynonymGroup> = terms
        .iter()
        .filter(|t| !covered.contains(t.as_str()))
        .map(|t| SynonymGroup::single(t))
        .collect();
    merge(series, &singles)
}

/// One sheet per tracked term, unmerged.
pub fn term_sheets(series: &WeeklySeries) -> Vec<TimeSeriesSheet> {
    let singles: Vec<SynonymGroup> = series.terms.iter().map(|t| SynonymGroup::single(t)).collect();
    merge(series, &singles)
}

/// Merged groups first, then every tracked term no group covers.
pub fn merged_sheets(series: &WeeklySeries, groups: &[SynonymGroup]) -> Vec<TimeSeriesSheet> {
    let mut sheets = merge(series, groups);
    sheets.extend(ungrouped(series, &series.terms, groups));
    sheets
}
