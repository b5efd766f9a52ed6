//! Metrics command - execution success metrics.

use anyhow::Result;
use clap::Args;
use havenstats_fetch::{FetchRequest, StatsService};
use havenstats_providers::ExecutionMetricsService;
use tracing::{info, warn};

use super::{http_client, load_config, print_outcome};
use crate::{Cli, ExitCode};

/// Arguments for the metrics command.
#[derive(Args, Default)]
pub struct MetricsArgs {
    /// Hours to report, ending now.
    #[arg(long)]
    pub hours: Option<u32>,
}

/// Runs the metrics command.
pub async fn run(args: &MetricsArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli).await?;
    let http = http_client(&config)?;
    let mut lit = config.lit.service;
    if let Some(hours) = args.hours {
        lit = lit.with_hours(hours);
    }

    let service = ExecutionMetricsService::new(lit)?.with_http(http);
    if service.is_configured() {
        info!(hours = service.config().hours, "Fetching execution metrics");
    } else {
        warn!("No status API key; set LIT_STATUS_API_KEY or lit.api_key");
    }
    let result = service.fetch(&FetchRequest::new()).await;

    print_outcome(cli, service.info(), result, |metrics| metrics, |f, metrics| {
        f.format_metrics(metrics)
    })
}
