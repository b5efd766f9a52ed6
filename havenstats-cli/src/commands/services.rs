//! Services command - list services and their state.

use anyhow::Result;
use clap::Args;
use havenstats_core::ServiceKind;
use tracing::info;

use super::load_config;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for services command.
#[derive(Args)]
pub struct ServicesArgs {
    /// Show only this service (usage, metrics, ledger, arkiv, lit, filecoin).
    pub service: Option<ServiceKind>,
}

/// Runs the services command.
pub async fn run(args: &ServicesArgs, cli: &Cli) -> Result<ExitCode> {
    info!(service = ?args.service, "Listing services");

    let config = load_config(cli).await?;
    let services = config.service_set()?;
    let infos = match args.service {
        Some(kind) => vec![services.info(kind)],
        None => services.infos(),
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_services_header());
            println!("{}", "─".repeat(60));
            for info in &infos {
                println!("{}", formatter.format_service_line(info));
            }

            let path = cli
                .config
                .clone()
                .unwrap_or_else(havenstats_store::StatsConfig::default_path);
            println!();
            println!(
                "Total: {} services ({} configured)",
                infos.len(),
                infos.iter().filter(|i| i.configured).count()
            );
            println!("Config: {}", path.display());
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&infos)?);
        }
    }

    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::{Cli, Commands};

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("havenstats").chain(args.iter().copied()))
    }

    #[test]
    fn test_service_filter_accepts_aliases() {
        let cli = parse(&["services", "lit"]).unwrap();
        match cli.command {
            Some(Commands::Services(args)) => {
                assert_eq!(args.service, Some(ServiceKind::ExecutionMetrics));
            }
            _ => panic!("expected services command"),
        }
    }

    #[test]
    fn test_unknown_service_rejected() {
        let err = parse(&["services", "storage"]).err().unwrap();
        assert!(err.to_string().contains("Unknown service: storage"));
    }
}
