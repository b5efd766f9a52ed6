//! Ledger command - token ledger totals.

use anyhow::Result;
use clap::Args;
use havenstats_fetch::{FetchRequest, StatsService};
use havenstats_providers::TokenLedgerService;
use tracing::{info, warn};

use super::{http_client, load_config, print_outcome};
use crate::output::LedgerOutput;
use crate::{Cli, ExitCode};

/// Arguments for the ledger command.
#[derive(Args, Default)]
pub struct LedgerArgs {
    /// Show base-unit integers next to the decimal amounts.
    #[arg(long)]
    pub raw: bool,
}

/// Runs the ledger command.
pub async fn run(args: &LedgerArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli).await?;
    let http = http_client(&config)?;
    let service = TokenLedgerService::new(config.filecoin_pay.service)?.with_http(http);

    info!(tokens = service.config().tokens.len(), "Fetching token ledger");
    let result = service.fetch(&FetchRequest::new()).await;
    if result.as_ref().is_ok_and(|snapshot| !snapshot.has_records()) {
        warn!("Subgraph has no record for any configured token");
    }

    print_outcome(
        cli,
        service.info(),
        result,
        |snapshot| LedgerOutput::from(&snapshot),
        |f, snapshot| f.format_ledger(snapshot, args.raw),
    )
}
