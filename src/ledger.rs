//! Append-only ledger of discovered briefings.
//!
//! The ledger is a CSV file with the columns `date,title,transcript_url`.
//! Every crawl appends; nothing is ever rewritten. Re-crawls therefore leave
//! duplicate rows behind, and older ledgers may repeat the header row, so the
//! reader skips header rows wherever they appear and [`Ledger::records`]
//! de-duplicates by slug, keeping the first occurrence.

use itertools::Itertools;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tokio::{fs, task};
use tracing::{Span, info, instrument, warn};

use crate::errors::PipelineResult;
use crate::models::BriefingRecord;
use crate::utils::{LISTING_DATE_FORMAT, parse_listing_date};

pub const LEDGER_HEADER: [&str; 3] = ["date", "title", "transcript_url"];

#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append records, writing the header first if the file is new or empty.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), count = records.len()))]
    pub async fn append(&self, records: &[BriefingRecord]) -> PipelineResult<()> {
        let path = self.path.clone();
        let records = records.to_vec();
        task::spawn_blocking(move || write_rows(&path, &records)).await??;
        info!("Appended to ledger");
        Ok(())
    }

    /// Every parseable row, in file order, duplicates included.
    ///
    /// A missing ledger reads as empty; rows that cannot be parsed are logged
    /// and skipped.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn rows(&self) -> PipelineResult<Vec<BriefingRecord>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            warn!("Ledger does not exist yet");
            return Ok(Vec::new());
        }
        let path = self.path.clone();
        let span = Span::current();
        task::spawn_blocking(move || span.in_scope(|| read_rows(&path))).await?
    }

    /// Distinct records by slug, first occurrence wins.
    pub async fn records(&self) -> PipelineResult<Vec<BriefingRecord>> {
        let rows = self.rows().await?;
        let total = rows.len();
        let records: Vec<BriefingRecord> = rows.into_iter().unique_by(|r| r.slug.clone()).collect();
        info!(rows = total, distinct = records.len(), "Read ledger");
        Ok(records)
    }
}

// csv only offers blocking readers and writers; these run on the blocking pool.

fn write_rows(path: &Path, records: &[BriefingRecord]) -> PipelineResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    if needs_header {
        writer.write_record(LEDGER_HEADER)?;
    }
    for record in records {
        writer.write_record([
            record.publication_date.format(LISTING_DATE_FORMAT).to_string().as_str(),
            record.title.as_str(),
            record.transcript_url.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn read_rows(path: &Path) -> PipelineResult<Vec<BriefingRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!(line = line + 1, error = %e, "Unreadable ledger row; skipping");
                continue;
            }
        };
        if row.get(0) == Some(LEDGER_HEADER[0]) {
            continue;
        }
        let (Some(date), Some(title), Some(url)) = (row.get(0), row.get(1), row.get(2)) else {
            warn!(line = line + 1, fields = row.len(), "Short ledger row; skipping");
            continue;
        };
        match parse_listing_date(date) {
            Some(date) => rows.push(BriefingRecord::new(date, title, url)),
            None => warn!(line = line + 1, %date, "Unparseable ledger date; skipping"),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(day: u32, title: &str) -> BriefingRecord {
        BriefingRecord::new(
            NaiveDate::from_ymd_opt(2014, 1, day).unwrap(),
            title,
            &format!("http://www.whitehouse.gov/briefing/{day}"),
        )
    }

    #[tokio::test]
    async fn test_append_writes_header_once() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(tmp.path().join("data/briefing_links.csv"));

        ledger.append(&[record(2, "Press Briefing, 1/2/2014")]).await.unwrap();
        ledger.append(&[record(3, "Press Briefing, 1/3/2014")]).await.unwrap();

        let text = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(text.matches("date,title,transcript_url").count(), 1);
        assert!(text.contains("\"Press Briefing, 1/2/2014\""));
        assert_eq!(ledger.rows().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_rows_dedup_by_slug() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(tmp.path().join("briefing_links.csv"));
        let batch = [record(2, "Press Briefing A"), record(3, "Press Briefing B")];

        ledger.append(&batch).await.unwrap();
        ledger.append(&batch).await.unwrap();

        assert_eq!(ledger.rows().await.unwrap().len(), 4);
        let distinct = ledger.records().await.unwrap();
        assert_eq!(distinct, batch.to_vec());
    }

    #[tokio::test]
    async fn test_tolerates_repeated_headers_and_bad_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("briefing_links.csv");
        std::fs::write(
            &path,
            "date,title,transcript_url\n\
             \"January 02, 2014\",Press Briefing A,http://x/a\n\
             date,title,transcript_url\n\
             sometime,Press Briefing B,http://x/b\n\
             \"January 03, 2014\",only two\n\
             \"January 03, 2014\",Press Briefing C,http://x/c\n",
        )
        .unwrap();

        let rows = Ledger::new(&path).rows().await.unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Press Briefing A", "Press Briefing C"]);
    }

    #[tokio::test]
    async fn test_missing_ledger_reads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(tmp.path().join("nope.csv"));
        assert!(ledger.records().await.unwrap().is_empty());
    }
}
