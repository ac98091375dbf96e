//! Stage drivers.
//!
//! Each stage reads the artifacts of the one before it from `data_dir`, so
//! stages can be run one at a time or all together:
//!
//! 1. **crawl**: listing pages → ledger
//! 2. **extract**: ledger → `text/{slug}.txt`
//! 3. **index**: text → `text/counts/{MM-DD-YY}.json`
//! 4. **aggregate**: indexes → `text/summary/{year}.json`
//! 5. **export**: summary → `terms.xlsx`, `synonyms.xlsx`
//!
//! Items are processed one at a time. A failing item is logged with its slug
//! and URL and skipped; only failures of the stage itself (unreadable ledger,
//! unwritable output) abort.

use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

use crate::analysis::index::{Counter, IndexStore, index_transcript};
use crate::analysis::synonyms::{merged_sheets, term_sheets};
use crate::analysis::weekly::{WeeklySeries, aggregate_year};
use crate::config::PipelineConfig;
use crate::errors::PipelineResult;
use crate::fetcher::Fetch;
use crate::ledger::Ledger;
use crate::outputs::{json, workbook};
use crate::scrapers::{crawler, transcript};
use crate::utils::truncate_for_log;

pub const TERMS_WORKBOOK: &str = "terms.xlsx";
pub const SYNONYMS_WORKBOOK: &str = "synonyms.xlsx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    Skipped,
    Failed,
}

/// Per-item tally of one stage run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageReport {
    pub done: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl StageReport {
    fn tally(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        outcomes.into_iter().fold(Self::default(), |mut report, outcome| {
            match outcome {
                Outcome::Done => report.done += 1,
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed => report.failed += 1,
            }
            report
        })
    }
}

/// The configured pipeline over one fetcher.
pub struct Pipeline<F> {
    config: PipelineConfig,
    fetcher: F,
}

impl<F: Fetch> Pipeline<F> {
    pub fn new(config: PipelineConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn ledger(&self) -> Ledger {
        Ledger::new(self.config.ledger_path())
    }

    fn index_store(&self) -> IndexStore {
        IndexStore::new(self.config.counts_dir())
    }

    /// Crawl the listing into the ledger.
    pub async fn crawl(&self) -> PipelineResult<StageReport> {
        let found = crawler::crawl(
            &self.fetcher,
            &self.config.listing,
            self.config.page_count,
            &self.ledger(),
        )
        .await?;
        Ok(StageReport {
            done: found.len(),
            ..StageReport::default()
        })
    }

    /// Extract every ledger record. Records whose text artifact already
    /// exists are skipped unless `force` is set.
    #[instrument(level = "info", skip(self))]
    pub async fn extract(&self, force: bool) -> PipelineResult<StageReport> {
        let ledger = self.ledger();
        let records = ledger.records().await?;
        let text_dir = self.config.text_dir();
        info!(count = records.len(), ledger = %ledger.path().display(), "Extracting transcripts");

        let outcomes: Vec<Outcome> = stream::iter(records.iter())
            .then(|record| {
                let text_dir = &text_dir;
                async move {
                    let path = transcript::text_path(text_dir, &record.slug);
                    if !force && fs::try_exists(&path).await.unwrap_or(false) {
                        return Outcome::Skipped;
                    }
                    match transcript::extract(&self.fetcher, record, text_dir).await {
                        Ok(doc) => {
                            debug!(
                                slug = %doc.id.slug,
                                html_bytes = doc.raw_html.len(),
                                text_bytes = doc.body_text.len(),
                                "Saved transcript text"
                            );
                            Outcome::Done
                        }
                        Err(e) => {
                            error!(
                                slug = %record.slug,
                                url = %record.transcript_url,
                                title = %truncate_for_log(&record.title, 80),
                                error = %e,
                                "Extraction failed; skipping record"
                            );
                            Outcome::Failed
                        }
                    }
                }
            })
            .collect()
            .await;

        let report = StageReport::tally(outcomes);
        info!(?report, "Extract stage complete");
        Ok(report)
    }

    /// Index every ledger record that has a text artifact, in ledger order.
    #[instrument(level = "info", skip(self))]
    pub async fn index(&self) -> PipelineResult<StageReport> {
        let records = self.ledger().records().await?;
        let text_dir = self.config.text_dir();
        let counter = Counter::new(&self.config.tokenization);
        let store = self.index_store();

        let outcomes: Vec<Outcome> = stream::iter(records.iter())
            .then(|record| {
                let (text_dir, counter, store) = (&text_dir, &counter, &store);
                async move {
                    let id = record.id();
                    if !fs::try_exists(transcript::text_path(text_dir, &id.slug))
                        .await
                        .unwrap_or(false)
                    {
                        warn!(slug = %id.slug, "No text artifact; not indexing");
                        return Outcome::Skipped;
                    }
                    match index_transcript(counter, store, text_dir, &id).await {
                        Ok(_) => Outcome::Done,
                        Err(e) => {
                            error!(slug = %id.slug, date = %id.date, error = %e, "Indexing failed; skipping record");
                            Outcome::Failed
                        }
                    }
                }
            })
            .collect()
            .await;

        let report = StageReport::tally(outcomes);
        info!(?report, "Index stage complete");
        Ok(report)
    }

    /// Aggregate the configured year and write its summary.
    pub async fn aggregate(&self) -> PipelineResult<WeeklySeries> {
        let series = aggregate_year(
            &self.index_store(),
            self.config.year,
            &self.config.tracked_terms(),
        )
        .await?;
        json::write_summary(&series, &self.config.summary_dir()).await?;
        Ok(series)
    }

    /// Write both workbooks from the stored summary, aggregating first when
    /// the year has no summary yet.
    #[instrument(level = "info", skip(self), fields(year = self.config.year))]
    pub async fn export(&self) -> PipelineResult<Vec<PathBuf>> {
        let summary_dir = self.config.summary_dir();
        let terms = self.config.tracked_terms();
        let series = match json::read_summary(&summary_dir, self.config.year, &terms).await? {
            Some(series) => series,
            None => {
                warn!("No usable weekly summary for this year; aggregating first");
                self.aggregate().await?
            }
        };

        let terms_path = summary_dir.join(TERMS_WORKBOOK);
        workbook::export(&term_sheets(&series), &terms_path).await?;

        let synonyms_path = summary_dir.join(SYNONYMS_WORKBOOK);
        let sheets = merged_sheets(&series, &self.config.synonym_groups());
        workbook::export(&sheets, &synonyms_path).await?;

        Ok(vec![terms_path, synonyms_path])
    }

    /// Every stage in order.
    pub async fn run_all(&self, force: bool) -> PipelineResult<()> {
        let crawled = self.crawl().await?;
        info!(records = crawled.done, "Crawl stage complete");
        self.extract(force).await?;
        self.index().await?;
        self.aggregate().await?;
        let written = self.export().await?;
        info!(workbooks = written.len(), "Pipeline complete");
        Ok(())
    }
}
