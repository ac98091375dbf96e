//! Command-line interface for the briefing pipeline.
//!
//! Every stage has its own subcommand; `run` executes them all in order.
//! Flags given here override the matching keys of the YAML configuration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Crawl, extract, index and chart press-briefing transcripts.
///
/// # Examples
///
/// ```sh
/// # Whole pipeline with the built-in 2014 defaults
/// briefing_trends run
///
/// # Re-extract every transcript with a custom config
/// briefing_trends -c trends.yaml extract --force
///
/// # Aggregate and export another year
/// briefing_trends --year 2013 aggregate
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "BRIEFING_TRENDS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root directory for every artifact (overrides `data_dir`)
    #[arg(short, long, env = "BRIEFING_TRENDS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Year to aggregate and export (overrides `year`)
    #[arg(short, long, env = "BRIEFING_TRENDS_YEAR")]
    pub year: Option<i32>,

    /// Number of listing pages to crawl (overrides `page_count`)
    #[arg(short, long, env = "BRIEFING_TRENDS_PAGES")]
    pub pages: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Crawl the listing pages into the ledger
    Crawl,
    /// Extract transcript text for every ledger record
    Extract {
        /// Re-extract records that already have a text file
        #[arg(long)]
        force: bool,
    },
    /// Build frequency indexes from extracted text
    Index,
    /// Aggregate indexes into weekly counts for the year
    Aggregate,
    /// Write the term and synonym workbooks
    Export,
    /// Run every stage in order
    Run {
        /// Re-extract records that already have a text file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "briefing_trends",
            "--config",
            "trends.yaml",
            "--data-dir",
            "/tmp/data",
            "extract",
            "--force",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("trends.yaml")));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/data")));
        assert_eq!(cli.command, Command::Extract { force: true });
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["briefing_trends", "-y", "2013", "-p", "5", "run"]);

        assert_eq!(cli.year, Some(2013));
        assert_eq!(cli.pages, Some(5));
        assert_eq!(cli.command, Command::Run { force: false });
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["briefing_trends"]).is_err());
    }
}
