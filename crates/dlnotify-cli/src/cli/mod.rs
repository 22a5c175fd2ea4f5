//! CLI for the dlnotify download notification tracker.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dlnotify_core::config;
use std::path::PathBuf;

use commands::{run_replay, run_stats, run_sweep, ReplayOptions};

/// Top-level CLI for dlnotify.
#[derive(Debug, Parser)]
#[command(name = "dlnotify")]
#[command(about = "dlnotify: download notifications with throttling and bounded state", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Feed a JSON-lines file of host download events through the tracker.
    Replay {
        /// Event file, one JSON event per line ("-" for stdin).
        path: PathBuf,
        /// Pause between events, in milliseconds.
        #[arg(long, default_value = "0", value_name = "MS")]
        interval_ms: u64,
        /// Keep running this many seconds after the last event so pending alarms can fire.
        #[arg(long, default_value = "0", value_name = "SECS")]
        linger_secs: u64,
        /// Use the in-memory host: nothing is persisted.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show tracked download count, last notification time and permission state.
    Stats {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove stale and completed records from persisted state.
    Sweep,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Replay {
                path,
                interval_ms,
                linger_secs,
                dry_run,
            } => {
                let opts = ReplayOptions {
                    path,
                    interval_ms,
                    linger_secs,
                    dry_run,
                };
                run_replay(&cfg, &opts).await?;
            }
            CliCommand::Stats { json } => run_stats(&cfg, json).await?,
            CliCommand::Sweep => run_sweep(&cfg).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
