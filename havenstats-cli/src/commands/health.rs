//! Health command - ledger subgraph indexing status.

use anyhow::Result;
use havenstats_fetch::CancellationToken;
use havenstats_providers::TokenLedgerService;

use super::{http_client, load_config};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Runs the health command.
pub async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli).await?;
    let http = http_client(&config)?;
    let service = TokenLedgerService::new(config.filecoin_pay.service)?.with_http(http);
    let health = service.check_health(&CancellationToken::new()).await;

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_health(&health));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&health)?);
        }
    }

    Ok(if health.healthy {
        ExitCode::Success
    } else {
        ExitCode::Error
    })
}
