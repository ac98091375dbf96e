//! Frequency indexing of transcript text.
//!
//! [`Counter`] turns text into a merged unigram/bigram/trigram table;
//! [`IndexStore`] persists one table per transcript date as
//! `{MM-DD-YY}.json`:
//!
//! ```json
//! {"date": "2014-03-05", "words": {"ukraine": 12, "the ukraine": 1, ...}}
//! ```
//!
//! Indexes are keyed by date, not slug. Two briefings on the same day share a
//! file and the one indexed last replaces the other.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use super::stopwords;
use super::tokenizer::{is_punctuation, tokenize};
use crate::config::TokenizationConfig;
use crate::errors::{PipelineResult, TokenizationError};
use crate::models::{FrequencyIndex, RecordId};
use crate::scrapers::transcript::text_path;
use crate::utils::{INDEX_KEY_FORMAT, parse_index_key};

/// Configured tokenization and n-gram counting.
#[derive(Debug, Clone)]
pub struct Counter {
    orders: Vec<usize>,
    ignored: HashSet<String>,
    keep_punctuation: bool,
}

impl Counter {
    pub fn new(config: &TokenizationConfig) -> Self {
        let mut ignored = stopwords::resolve(&config.stopwords);
        ignored.extend(config.extra_ignored.iter().map(|w| w.trim().to_lowercase()));
        Self {
            orders: config.ngram_orders.iter().copied().filter(|&n| n > 0).collect(),
            ignored,
            keep_punctuation: config.keep_punctuation,
        }
    }

    /// Token stream after stop-word and noise-word removal.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .filter(|t| !self.ignored.contains(t))
            .collect()
    }

    /// Merged n-gram counts over one token stream.
    ///
    /// Punctuation tokens stay in the stream so n-grams never span them, but
    /// n-grams containing one are only counted with `keep_punctuation`.
    pub fn count(&self, text: &str) -> BTreeMap<String, u64> {
        let tokens = self.tokens(text);
        let mut words = BTreeMap::new();
        for &n in &self.orders {
            for window in tokens.windows(n) {
                if !self.keep_punctuation && window.iter().any(|t| is_punctuation(t)) {
                    continue;
                }
                *words.entry(window.join(" ")).or_insert(0) += 1;
            }
        }
        words
    }

    pub fn index(&self, date: NaiveDate, text: &str) -> FrequencyIndex {
        FrequencyIndex {
            date,
            words: self.count(text),
        }
    }
}

/// Directory of per-date frequency index artifacts.
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.format(INDEX_KEY_FORMAT)))
    }

    /// Write an index, replacing any earlier index for the same date.
    #[instrument(level = "debug", skip_all, fields(date = %index.date))]
    pub async fn write(&self, index: &FrequencyIndex) -> PipelineResult<()> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(index.date);
        if fs::try_exists(&path).await.unwrap_or(false) {
            debug!(path = %path.display(), "Replacing existing index for this date");
        }
        fs::write(&path, serde_json::to_vec(index)?).await?;
        Ok(())
    }

    /// Load the index for a date. `Ok(None)` when no index exists.
    pub async fn read(&self, date: NaiveDate) -> PipelineResult<Option<FrequencyIndex>> {
        let bytes = match fs::read(self.path_for(date)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut index: FrequencyIndex = serde_json::from_slice(&bytes)?;
        // The file name is the key; trust it over the stored field.
        index.date = date;
        Ok(Some(index))
    }

    /// Dates of every stored index, ascending. Files whose names are not
    /// `MM-DD-YY.json` are ignored.
    pub async fn dates(&self) -> io::Result<Vec<NaiveDate>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut dates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()).and_then(parse_index_key) {
                Some(date) => dates.push(date),
                None => debug!(path = %path.display(), "Ignoring file with unexpected name"),
            }
        }
        dates.sort();
        Ok(dates)
    }
}

/// Index the text artifact of one record.
#[instrument(level = "info", skip_all, fields(slug = %id.slug, date = %id.date))]
pub async fn index_transcript(
    counter: &Counter,
    store: &IndexStore,
    text_dir: &Path,
    id: &RecordId,
) -> PipelineResult<FrequencyIndex> {
    let bytes = fs::read(text_path(text_dir, &id.slug)).await?;
    let text = String::from_utf8(bytes).map_err(|e| TokenizationError {
        slug: id.slug.clone(),
        reason: format!("text artifact is not valid UTF-8: {e}"),
    })?;
    if text.trim().is_empty() {
        warn!("Text artifact is empty");
    }

    let index = counter.index(id.date, &text);
    store.write(&index).await?;
    info!(key = %id.index_key(), ngrams = index.words.len(), "Indexed transcript");
    Ok(index)
}
