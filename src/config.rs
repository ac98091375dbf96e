//! Pipeline configuration.
//!
//! Every value has a default matching the original 2014 briefing study, so the
//! YAML file only needs the keys being changed:
//!
//! ```yaml
//! year: 2014
//! page_count: 22
//! terms: [ebola, ukraine, crimea]
//! synonyms:
//!   - [ukraine, crimea]
//! fetcher:
//!   requests_per_minute: 60
//!   cache_dir: press_briefing_cache
//! tokenization:
//!   stopwords: english
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

use crate::errors::{PipelineError, PipelineResult};
use crate::models::SynonymGroup;

const DEFAULT_TERMS: &[&str] = &[
    "isis",
    "isil",
    "islamic state",
    "veteran",
    "veterans",
    "shinseki",
    "affordable care act",
    "obamacare",
    "healthcare",
    "health care",
    "insurance",
    "ukraine",
    "ukrainian",
    "crimea",
    "ebola",
    "border",
    "immigration",
    "unaccompanied minors",
    "position",
    "unemployed",
    "unemployment",
];

const DEFAULT_SYNONYMS: &[&[&str]] = &[
    &["isis", "isil", "islamic state"],
    &["veteran", "veterans", "shinseki"],
    &[
        "affordable care act",
        "obamacare",
        "healthcare",
        "health care",
        "insurance",
    ],
    &["ukraine", "ukrainian", "crimea"],
    &["unemployed", "unemployment"],
];

/// Top-level configuration: `{year, page_count, terms, synonyms}` plus the
/// settings of the individual stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Year whose weeks are aggregated and exported.
    pub year: i32,
    /// Number of listing pages to crawl (`?page=0` .. `?page=page_count-1`).
    pub page_count: u32,
    /// Tracked terms; multi-word terms match bigrams/trigrams.
    pub terms: Vec<String>,
    /// Synonym groups; the first member of each names the group.
    pub synonyms: Vec<Vec<String>>,
    /// Root of every artifact the pipeline writes.
    pub data_dir: PathBuf,
    pub fetcher: FetcherConfig,
    pub retry: RetryConfig,
    pub listing: ListingConfig,
    pub tokenization: TokenizationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            year: 2014,
            page_count: 22,
            terms: DEFAULT_TERMS.iter().map(|t| t.to_string()).collect(),
            synonyms: DEFAULT_SYNONYMS
                .iter()
                .map(|g| g.iter().map(|t| t.to_string()).collect())
                .collect(),
            data_dir: PathBuf::from("data"),
            fetcher: FetcherConfig::default(),
            retry: RetryConfig::default(),
            listing: ListingConfig::default(),
            tokenization: TokenizationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a YAML file, falling back to defaults for missing keys.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> PipelineResult<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&text)?;
        config.validate()?;
        info!(year = config.year, pages = config.page_count, terms = config.terms.len(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.fetcher.requests_per_minute == 0 {
            return Err(PipelineError::Config(
                "fetcher.requests_per_minute must be greater than zero".to_string(),
            ));
        }
        if self.tokenization.ngram_orders.is_empty()
            || self.tokenization.ngram_orders.contains(&0)
        {
            return Err(PipelineError::Config(
                "tokenization.ngram_orders must list positive orders".to_string(),
            ));
        }
        if let Some(empty) = self.synonyms.iter().position(|g| g.is_empty()) {
            return Err(PipelineError::Config(format!(
                "synonym group #{} is empty",
                empty + 1
            )));
        }
        Ok(())
    }

    /// Tracked terms, sorted and de-duplicated.
    pub fn tracked_terms(&self) -> Vec<String> {
        self.terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn synonym_groups(&self) -> Vec<SynonymGroup> {
        self.synonyms
            .iter()
            .filter_map(|g| {
                SynonymGroup::from_members(g.iter().map(|t| t.trim().to_lowercase()).collect())
            })
            .collect()
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("briefing_links.csv")
    }

    pub fn text_dir(&self) -> PathBuf {
        self.data_dir.join("text")
    }

    pub fn counts_dir(&self) -> PathBuf {
        self.text_dir().join("counts")
    }

    pub fn summary_dir(&self) -> PathBuf {
        self.text_dir().join("summary")
    }
}

/// Settings of the HTTP fetcher and its response cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Outbound request budget, spaced evenly over each minute.
    pub requests_per_minute: u32,
    /// Directory of the write-through response cache.
    pub cache_dir: PathBuf,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            cache_dir: PathBuf::from("press_briefing_cache"),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

/// Caller-side retry policy wrapped around the fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            max_jitter_ms: 250,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Where the listing lives and which of its entries count as briefings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Paginated listing; `?page=N` is appended.
    pub listing_url: String,
    /// Base for resolving relative transcript links.
    pub site_url: String,
    /// Only entries whose title starts with this are kept.
    pub title_prefix: String,
    /// End the crawl early at the first page with no list items.
    pub stop_on_empty_page: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            listing_url: "http://www.whitehouse.gov/briefing-room/press-briefings".to_string(),
            site_url: "http://www.whitehouse.gov".to_string(),
            title_prefix: "Press Briefing".to_string(),
            stop_on_empty_page: false,
        }
    }
}

/// Which stop-word list, if any, is removed before counting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwordSetting {
    /// Count every token.
    None,
    /// The built-in English list.
    English,
    /// A custom list.
    #[serde(untagged)]
    Custom(Vec<String>),
}

/// Tokenization and counting options.
///
/// The default counts every token into unigrams, bigrams and trigrams; the
/// filtered variant sets `stopwords: english` and lists noise words in
/// `extra_ignored`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizationConfig {
    pub ngram_orders: BTreeSet<usize>,
    pub stopwords: StopwordSetting,
    pub extra_ignored: BTreeSet<String>,
    /// Count n-grams containing punctuation tokens as well.
    pub keep_punctuation: bool,
}

impl Default for TokenizationConfig {
    fn default() -> Self {
        Self {
            ngram_orders: [1, 2, 3].into_iter().collect(),
            stopwords: StopwordSetting::None,
            extra_ignored: BTreeSet::new(),
            keep_punctuation: false,
        }
    }
}
