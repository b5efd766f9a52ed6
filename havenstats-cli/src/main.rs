// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `HavenStats` CLI - query the live stats services from the command line.
//!
//! # Examples
//!
//! ```bash
//! # All three statistics at once
//! havenstats
//!
//! # Data usage over the last week
//! havenstats usage --days 7
//!
//! # Execution metrics (needs LIT_STATUS_API_KEY or lit.api_key)
//! havenstats metrics --hours 48
//!
//! # Token ledger as JSON
//! havenstats ledger --format json --pretty
//!
//! # Subgraph indexing status
//! havenstats health
//!
//! # Poll every service and redraw on change
//! havenstats watch --interval 60
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{health, ledger, metrics, services, summary, usage, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// `HavenStats` CLI - live network statistics.
#[derive(Parser)]
#[command(name = "havenstats")]
#[command(about = "Live network statistics for Haven")]
#[command(long_about = r"
HavenStats fetches the live statistics shown on the Haven landing page.

Services:
  • Data Usage (Arkiv Network indexer chart)
  • Execution Metrics (Lit Protocol status service)
  • Token Ledger (Filecoin Pay subgraph)

Examples:
  havenstats                     # All services
  havenstats usage --days 7      # Data usage for one week
  havenstats metrics             # Needs LIT_STATUS_API_KEY
  havenstats --format json       # JSON output
  havenstats watch               # Keep polling
")]
#[command(version)]
#[command(author = "Haven Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'summary'.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Config file (defaults to the platform config directory).
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every statistic (default if no command specified).
    #[command(visible_alias = "s")]
    Summary,

    /// Data usage by day.
    #[command(visible_alias = "u")]
    Usage(usage::UsageArgs),

    /// Execution success metrics.
    #[command(visible_alias = "m")]
    Metrics(metrics::MetricsArgs),

    /// Token ledger totals.
    #[command(visible_alias = "l")]
    Ledger(ledger::LedgerArgs),

    /// Check the ledger subgraph's indexing status.
    Health,

    /// List services, configuration and cache state.
    Services(services::ServicesArgs),

    /// Poll every service and redraw on change.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// A required setting is missing.
    NotConfigured = 2,
    /// Every requested fetch failed.
    AllFailed = 3,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("havenstats=debug,info")
    } else {
        EnvFilter::new("havenstats=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Summary) | None => summary::run(&cli).await,
        Some(Commands::Usage(args)) => usage::run(args, &cli).await,
        Some(Commands::Metrics(args)) => metrics::run(args, &cli).await,
        Some(Commands::Ledger(args)) => ledger::run(args, &cli).await,
        Some(Commands::Health) => health::run(&cli).await,
        Some(Commands::Services(args)) => services::run(args, &cli).await,
        Some(Commands::Watch(args)) => watch::run(args, &cli).await,
    };

    match result {
        Ok(ExitCode::Success) => Ok(()),
        Ok(code) => std::process::exit(code as i32),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(ExitCode::Error as i32);
        }
    }
}
