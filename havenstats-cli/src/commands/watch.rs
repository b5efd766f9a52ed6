//! Watch command - keep polling and redraw on change.

use anyhow::Result;
use clap::Args;
use havenstats_core::{ExecutionMetrics, ServiceKind, TokenLedgerSnapshot, UsageSeries};
use havenstats_fetch::StatsService;
use havenstats_store::{FetchState, PollerOptions, StatsConfig, StatsPoller};
use serde::Serialize;
use std::io::{Write, stdout};
use std::time::Duration;
use tracing::info;

use super::load_config;
use crate::output::{JsonFormatter, TextFormatter, format_clock};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds for every service.
    /// Defaults to each service's configured interval.
    #[arg(long, short)]
    pub interval: Option<u64>,

    /// Minimum interval to use.
    #[arg(long, default_value = "10")]
    pub min_interval: u64,
}

impl WatchArgs {
    fn options(&self, config: &StatsConfig, kind: ServiceKind) -> PollerOptions {
        let options = config.poller_options(kind);
        match self.interval {
            Some(secs) => options.with_interval(Duration::from_secs(secs.max(self.min_interval))),
            None => {
                let floor = Duration::from_secs(self.min_interval);
                options.with_interval(options.poll_interval.max(floor))
            }
        }
    }
}

#[derive(Serialize)]
struct WatchFrame<'a, U, M, L> {
    usage: &'a FetchState<U>,
    metrics: &'a FetchState<M>,
    ledger: &'a FetchState<L>,
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli).await?;
    let services = config.service_set()?;

    let usage = StatsPoller::mount(
        services.usage.clone(),
        args.options(&config, ServiceKind::DataUsage),
    );
    let metrics = StatsPoller::mount(
        services.metrics.clone(),
        args.options(&config, ServiceKind::ExecutionMetrics),
    );
    let ledger = StatsPoller::mount(
        services.ledger.clone(),
        args.options(&config, ServiceKind::TokenLedger),
    );
    info!("Starting watch mode");

    let mut usage_rx = usage.subscribe();
    let mut metrics_rx = metrics.subscribe();
    let mut ledger_rx = ledger.subscribe();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        match cli.format {
            OutputFormat::Text => draw(cli, &usage, &metrics, &ledger)?,
            OutputFormat::Json => {
                let (u, m, l) = (usage.state(), metrics.state(), ledger.state());
                let frame = WatchFrame {
                    usage: &u,
                    metrics: &m,
                    ledger: &l,
                };
                // One frame per line regardless of --pretty.
                println!("{}", JsonFormatter::new(false).format(&frame)?);
            }
        }

        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = usage_rx.changed() => {}
            _ = metrics_rx.changed() => {}
            _ = ledger_rx.changed() => {}
        }
    }

    info!("Stopping watch mode");
    usage.unmount();
    metrics.unmount();
    ledger.unmount();

    Ok(ExitCode::Success)
}

fn draw<U, M, L>(
    cli: &Cli,
    usage: &StatsPoller<U>,
    metrics: &StatsPoller<M>,
    ledger: &StatsPoller<L>,
) -> Result<()>
where
    U: StatsService<Output = UsageSeries>,
    M: StatsService<Output = ExecutionMetrics>,
    L: StatsService<Output = TokenLedgerSnapshot>,
{
    let formatter = TextFormatter::new(!cli.no_color);

    print!("\x1b[2J\x1b[H");
    println!("HavenStats Watch Mode - {}", format_clock(chrono::Utc::now()));
    println!("{}", "─".repeat(50));
    println!();

    section(&formatter, usage, |series| formatter.format_usage(series));
    section(&formatter, metrics, |m| formatter.format_metrics(m));
    section(&formatter, ledger, |snapshot| formatter.format_ledger(snapshot, false));

    println!("Press Ctrl+C to exit");
    stdout().flush()?;
    Ok(())
}

fn section<S: StatsService>(
    formatter: &TextFormatter,
    poller: &StatsPoller<S>,
    body: impl FnOnce(&S::Output) -> String,
) {
    let state = poller.state();
    let fallback = poller.is_using_fallback();
    let name = poller.service().display_name();

    println!("{}", formatter.format_state_header(&name, &state, fallback));
    if !fallback {
        println!("{}", body(&state.data));
    }
    println!();
}
