//! Weekly summary JSON.
//!
//! The aggregate stage writes one file per year so export can run without
//! re-reading every frequency index:
//! ```text
//! text/summary/
//! └── 2014.json   # {"2014-01-05": {"isis": 0, "ebola": 3, ...}, ...}
//! ```

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

use crate::analysis::weekly::{WeeklySeries, WeeklySummary};
use crate::errors::PipelineResult;

pub fn summary_path(summary_dir: &Path, year: i32) -> PathBuf {
    summary_dir.join(format!("{year}.json"))
}

/// Write the year's weekly counts, replacing any earlier summary.
#[instrument(level = "info", skip_all, fields(year = series.year))]
pub async fn write_summary(series: &WeeklySeries, summary_dir: &Path) -> PipelineResult<PathBuf> {
    let json = serde_json::to_string_pretty(&series.to_summary())?;

    if let Err(e) = fs::create_dir_all(summary_dir).await {
        error!(dir = %summary_dir.display(), error = %e, "Failed to create summary dir");
        return Err(e.into());
    }

    let path = summary_path(summary_dir, series.year);
    fs::write(&path, json).await?;
    info!(path = %path.display(), weeks = series.buckets.len(), "Wrote weekly summary");
    Ok(path)
}

/// Load a stored summary as a series. `Ok(None)` when the year has not been
/// aggregated, or was aggregated for a term list that lacks a tracked term.
pub async fn read_summary(
    summary_dir: &Path,
    year: i32,
    terms: &[String],
) -> PipelineResult<Option<WeeklySeries>> {
    let bytes = match fs::read(summary_path(summary_dir, year)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let summary: WeeklySummary = serde_json::from_slice(&bytes)?;
    let missing = missing_terms(&summary, terms);
    if !missing.is_empty() {
        warn!(year, ?missing, "Stored summary does not cover every tracked term");
        return Ok(None);
    }
    Ok(Some(WeeklySeries::from_summary(year, terms, &summary)))
}

/// Tracked terms absent from at least one stored week.
fn missing_terms<'a>(summary: &WeeklySummary, terms: &'a [String]) -> Vec<&'a str> {
    terms
        .iter()
        .filter(|term| summary.is_empty() || summary.values().any(|counts| !counts.contains_key(*term)))
        .map(String::as_str)
        .collect()
}
