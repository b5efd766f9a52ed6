//! Usage command - data usage by day.

use anyhow::Result;
use clap::Args;
use havenstats_fetch::{FetchRequest, StatsService};
use havenstats_providers::DataUsageService;
use tracing::info;

use super::{http_client, load_config, print_outcome};
use crate::{Cli, ExitCode};

/// Arguments for the usage command.
#[derive(Args, Default)]
pub struct UsageArgs {
    /// Days to report, ending today.
    #[arg(long, short)]
    pub days: Option<u32>,
}

/// Runs the usage command.
pub async fn run(args: &UsageArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli).await?;
    let http = http_client(&config)?;
    let mut arkiv = config.arkiv.service;
    if let Some(days) = args.days {
        arkiv = arkiv.with_days(days);
    }

    info!(days = arkiv.days, "Fetching data usage");
    let service = DataUsageService::new(arkiv)?.with_http(http);
    let result = service.fetch(&FetchRequest::new()).await;

    print_outcome(cli, service.info(), result, |series| series, |f, series| {
        f.format_usage(series)
    })
}
