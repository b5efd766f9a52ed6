//! Summary command - every statistic at once.

use anyhow::Result;
use havenstats_fetch::{FetchError, FetchRequest, StatsService};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::output::{JsonFormatter, LedgerOutput, ServiceOutput, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

#[derive(Serialize)]
struct SummaryOutput<U, M, L> {
    usage: ServiceOutput<U>,
    metrics: ServiceOutput<M>,
    ledger: ServiceOutput<L>,
}

/// Runs the summary command.
pub async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli).await?;
    let services = config.service_set()?;

    info!("Fetching all services");
    let request = FetchRequest::new();
    let (usage, metrics, ledger) = futures::join!(
        services.usage.fetch(&request),
        services.metrics.fetch(&request),
        services.ledger.fetch(&request),
    );

    let all_failed = usage.is_err() && metrics.is_err() && ledger.is_err();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let sections = [
                render(&formatter, &services.usage.display_name(), &usage, |s| {
                    formatter.format_usage(s)
                }),
                render(&formatter, &services.metrics.display_name(), &metrics, |m| {
                    formatter.format_metrics(m)
                }),
                render(&formatter, &services.ledger.display_name(), &ledger, |l| {
                    formatter.format_ledger(l, false)
                }),
            ];
            println!("{}", sections.join("\n\n"));
        }
        OutputFormat::Json => {
            let output = SummaryOutput {
                usage: ServiceOutput::new(services.usage.info(), usage),
                metrics: ServiceOutput::new(services.metrics.info(), metrics),
                ledger: ServiceOutput::new(
                    services.ledger.info(),
                    ledger.map(|snapshot| LedgerOutput::from(&snapshot)),
                ),
            };
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(if all_failed {
        ExitCode::AllFailed
    } else {
        ExitCode::Success
    })
}

fn render<T>(
    formatter: &TextFormatter,
    name: &str,
    result: &Result<T, FetchError>,
    text: impl FnOnce(&T) -> String,
) -> String {
    match result {
        Ok(value) => text(value),
        Err(e) => formatter.format_error(name, &e.to_string()),
    }
}
