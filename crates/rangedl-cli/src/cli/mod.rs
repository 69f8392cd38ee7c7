//! CLI for the rangedl downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use commands::{run_completions, run_get, run_probe, GetRequest};

/// Top-level CLI for rangedl.
#[derive(Debug, Parser)]
#[command(name = "rangedl")]
#[command(about = "rangedl: parallel HTTP byte-range downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// How to fetch and reassemble the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Segments write straight into their offsets of the output file.
    Direct,
    /// Segments write `.partN` files that are merged afterwards.
    Merge,
    /// One plain GET, no ranges.
    Simple,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL with parallel Range requests.
    Get {
        /// Direct HTTP/HTTPS URL to download.
        url: String,

        /// Output file (default: derived from the URL path).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Number of segments / parallel connections (default 8, or the config value).
        #[arg(short, long, value_name = "N")]
        concurrency: Option<usize>,

        /// Reassembly strategy (default: direct, or the config value).
        #[arg(short, long, value_enum)]
        strategy: Option<StrategyArg>,

        /// TOML file with transfer settings.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Show the size and range support a URL advertises.
    Probe {
        /// Direct HTTP/HTTPS URL to probe.
        url: String,
    },

    /// Print shell completions to stdout.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Get {
                url,
                output,
                concurrency,
                strategy,
                config,
            } => {
                run_get(GetRequest {
                    url,
                    output,
                    concurrency,
                    strategy,
                    config,
                })
                .await?
            }
            CliCommand::Probe { url } => run_probe(&url).await?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
