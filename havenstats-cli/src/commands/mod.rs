//! CLI command implementations.

pub mod health;
pub mod ledger;
pub mod metrics;
pub mod services;
pub mod summary;
pub mod usage;
pub mod watch;

use anyhow::{Context, Result};
use havenstats_fetch::{FetchError, HttpClient, ServiceInfo};
use havenstats_store::StatsConfig;
use serde::Serialize;
use tracing::debug;

use crate::output::{JsonFormatter, ServiceOutput, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Loads the config from `--config` or the default path.
pub async fn load_config(cli: &Cli) -> Result<StatsConfig> {
    let path = cli.config.clone().unwrap_or_else(StatsConfig::default_path);
    debug!(path = %path.display(), "Loading config");
    StatsConfig::load_from(&path)
        .await
        .with_context(|| format!("failed to load config from {}", path.display()))
}

/// HTTP client honouring the configured attempt count.
pub fn http_client(config: &StatsConfig) -> Result<HttpClient> {
    Ok(HttpClient::new()?.with_retry(config.retry_strategy()))
}

/// Exit code for a failed fetch.
pub fn exit_code_for(error: &FetchError) -> ExitCode {
    match error {
        FetchError::Configuration(_) => ExitCode::NotConfigured,
        _ => ExitCode::Error,
    }
}

/// Prints one service's outcome and picks the exit code.
///
/// `json` maps the fetched value to its JSON form; `text` renders it.
pub fn print_outcome<T, J>(
    cli: &Cli,
    info: ServiceInfo,
    result: Result<T, FetchError>,
    json: impl FnOnce(T) -> J,
    text: impl FnOnce(&TextFormatter, &T) -> String,
) -> Result<ExitCode>
where
    J: Serialize,
{
    let code = result.as_ref().err().map_or(ExitCode::Success, exit_code_for);

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            match &result {
                Ok(value) => println!("{}", text(&formatter, value)),
                Err(e) => println!("{}", formatter.format_error(&info.name, &e.to_string())),
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = ServiceOutput::new(info, result.map(json));
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(code)
}
