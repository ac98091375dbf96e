//! # Briefing Trends
//!
//! Builds a corpus of White House press-briefing transcripts and charts how
//! often tracked terms come up, week by week.
//!
//! ## Usage
//!
//! ```sh
//! briefing_trends run
//! briefing_trends -c trends.yaml --year 2013 export
//! ```
//!
//! ## Architecture
//!
//! The application is a staged pipeline over files in `data_dir`:
//! 1. **Crawl**: Walk the paginated listing and append briefings to the ledger
//! 2. **Extract**: Fetch each transcript and save its body text
//! 3. **Index**: Count unigrams, bigrams and trigrams per transcript date
//! 4. **Aggregate**: Sum tracked-term counts into Sunday-started weeks
//! 5. **Export**: Write per-term and per-synonym-group workbooks
//!
//! All network access goes through one rate-limited, cache-backed fetcher.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod cli;
mod config;
mod errors;
mod fetcher;
mod ledger;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::{Cli, Command};
use config::PipelineConfig;
use errors::PipelineResult;
use fetcher::{Fetcher, RetryFetch};
use pipeline::Pipeline;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("briefing_trends starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match load_config(&args).await {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    // Early check: ensure the data dir is writable
    if let Err(e) = ensure_writable_dir(&config.data_dir).await {
        error!(
            path = %config.data_dir.display(),
            error = %e,
            "Data directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let fetcher = RetryFetch::from_config(Fetcher::new(&config.fetcher)?, &config.retry);
    let pipeline = Pipeline::new(config, fetcher);
    info!(
        year = pipeline.config().year,
        data_dir = %pipeline.config().data_dir.display(),
        "Pipeline ready"
    );

    if let Err(e) = dispatch(&pipeline, &args.command).await {
        error!(command = ?args.command, error = %e, "Stage failed");
        return Err(e.into());
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// YAML file (or defaults) with the CLI overrides applied.
async fn load_config(args: &Cli) -> PipelineResult<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path).await?,
        None => {
            info!("No config file given; using defaults");
            PipelineConfig::default()
        }
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(year) = args.year {
        config.year = year;
    }
    if let Some(pages) = args.pages {
        config.page_count = pages;
    }
    config.validate()?;
    Ok(config)
}

async fn dispatch(pipeline: &Pipeline<RetryFetch<Fetcher>>, command: &Command) -> PipelineResult<()> {
    match command {
        Command::Crawl => {
            let report = pipeline.crawl().await?;
            info!(records = report.done, "Crawl stage complete");
        }
        Command::Extract { force } => {
            pipeline.extract(*force).await?;
        }
        Command::Index => {
            pipeline.index().await?;
        }
        Command::Aggregate => {
            let series = pipeline.aggregate().await?;
            info!(year = series.year, weeks = series.buckets.len(), "Aggregate stage complete");
        }
        Command::Export => {
            for path in pipeline.export().await? {
                info!(path = %path.display(), "Exported");
            }
        }
        Command::Run { force } => pipeline.run_all(*force).await?,
    }
    Ok(())
}
