//! Typed errors for every stage of the pipeline.
//!
//! Each per-item failure has its own type so the driving loops can log it with
//! the context needed to re-run just that item (URL, slug, date) and move on.
//! [`PipelineError`] wraps them together with the I/O and serialization
//! failures that abort a whole stage.

use std::io;

use thiserror::Error;

/// A network or HTTP failure while retrieving one URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("response cache I/O for {url}: {source}")]
    Cache {
        url: String,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    /// The URL that failed.
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Cache { url, .. } => url,
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether a later attempt could plausibly succeed.
    ///
    /// Transport failures, throttling (429) and server errors (5xx) are
    /// transient; a malformed URL or a 404 will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::InvalidUrl { .. } | FetchError::Cache { .. } => false,
        }
    }
}

/// One listing item that could not be turned into a briefing record.
#[derive(Debug, Error)]
#[error("malformed listing item {title:?}: {reason}")]
pub struct MalformedRecordError {
    pub title: String,
    pub reason: String,
}

/// The transcript page did not yield any body text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no #{container} container in transcript {slug} ({url})")]
    MissingContainer {
        slug: String,
        url: String,
        container: String,
    },
    #[error("transcript {slug} ({url}) has no non-blank content blocks")]
    EmptyBody { slug: String, url: String },
}

/// A transcript text artifact could not be tokenized.
#[derive(Debug, Error)]
#[error("cannot tokenize transcript {slug}: {reason}")]
pub struct TokenizationError {
    pub slug: String,
    pub reason: String,
}

/// Any failure surfaced by a pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecordError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Tokenization(#[from] TokenizationError),
    #[error("listing page {url} has no .{container} container")]
    MissingListing { url: String, container: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
