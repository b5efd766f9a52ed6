//! Text output formatting with bars, sparklines and colors.

use chrono::{DateTime, Local, Utc};
use havenstats_core::{
    DISPLAY_FRACTION_DIGITS, ExecutionMetrics, TokenAmount, TokenLedger, TokenLedgerSnapshot,
    UsageSeries,
};
use havenstats_fetch::{CacheState, ServiceInfo};
use havenstats_providers::SubgraphHealth;
use havenstats_store::{FetchState, FetchStatus};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

// Sparkline levels, lowest first
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Formats a data usage series.
    pub fn format_usage(&self, series: &UsageSeries) -> String {
        let mut lines = vec![self.bold("Data Usage (Arkiv Network)")];

        if series.is_empty() {
            lines.push(self.dim("No data points in range"));
            return lines.join("\n");
        }

        lines.push(format!("Total:    {}", self.cyan(&format!("{:.2} GB", series.total_gb))));
        lines.push(format!(
            "Growth:   {:.2} GB over {} days",
            series.total_growth_gb,
            series.len().saturating_sub(1)
        ));
        lines.push(format!("Avg/day:  {:.4} GB", series.average_daily_growth_gb));

        let growth = series.daily_growth_gb();
        if !growth.is_empty() {
            lines.push(format!("Daily:    {}", self.sparkline(&growth)));
        }
        if let (Some(first), Some(last)) = (series.points.first(), series.latest()) {
            lines.push(self.dim(&format!(
                "          {} to {}",
                first.period_start, last.period_end
            )));
        }

        lines.join("\n")
    }

    /// Formats execution metrics.
    pub fn format_metrics(&self, metrics: &ExecutionMetrics) -> String {
        let rate = metrics.success_rate_percent;
        [
            self.bold("Execution Metrics (Lit Protocol)"),
            format!(
                "Success:  {} {}",
                self.progress_bar(rate),
                self.color_for_rate(rate, &format!("{rate:.2}%"))
            ),
            format!(
                "Runs:     {} total, {} ok, {} failed",
                self.format_number(metrics.total_executions),
                self.format_number(metrics.successful_executions()),
                self.format_number(metrics.failed_executions)
            ),
            format!("Latency:  {:.0} ms avg", metrics.average_response_time_ms),
            format!("Uptime:   {:.2}%", metrics.uptime_percent),
        ]
        .join("\n")
    }

    /// Formats a token ledger snapshot.
    ///
    /// With `raw`, base-unit integers are shown next to the decimals.
    pub fn format_ledger(&self, snapshot: &TokenLedgerSnapshot, raw: bool) -> String {
        let mut lines = vec![self.bold("Token Ledger (Filecoin Pay)")];

        if snapshot.tokens.is_empty() {
            lines.push(self.dim("No tokens configured"));
        }
        for token in &snapshot.tokens {
            lines.push(self.format_token(token, raw));
        }

        lines.join("\n")
    }

    fn format_token(&self, token: &TokenLedger, raw: bool) -> String {
        if !token.found {
            return format!("{:<8} {}", token.symbol, self.dim("no ledger record"));
        }

        let amount = |value: &TokenAmount| {
            let shown = value
                .format(token.decimals, DISPLAY_FRACTION_DIGITS)
                .unwrap_or_else(|_| value.to_string());
            if raw {
                format!("{shown} ({value})")
            } else {
                shown
            }
        };

        let mut line = format!(
            "{:<8} transacted {}  locked {}  funds {}",
            self.bold(&token.symbol),
            self.cyan(&amount(&token.total_transacted)),
            amount(&token.locked_amount),
            amount(&token.user_funds)
        );
        if let Some(percent) = locked_share_percent(token) {
            line.push_str(&format!("  {} {percent:.1}% locked", self.share_bar(percent)));
        }
        line
    }

    /// Formats a subgraph health check.
    pub fn format_health(&self, health: &SubgraphHealth) -> String {
        let mark = if health.healthy {
            self.green("✓")
        } else {
            self.red("✗")
        };
        format!("{} {} {}", self.bold("Filecoin Pay subgraph"), mark, health.message)
    }

    // ========================================================================
    // Services
    // ========================================================================

    /// Formats the service list header.
    pub fn format_services_header(&self) -> String {
        format!(
            "{:<22} {:<8} {:<12} {}",
            self.bold("Service"),
            self.bold("CLI"),
            self.bold("Configured"),
            self.bold("Cache")
        )
    }

    /// Formats one service line.
    pub fn format_service_line(&self, info: &ServiceInfo) -> String {
        let configured = if info.configured {
            self.green("✓")
        } else {
            self.red("✗")
        };
        let cache = match (info.cache.state, info.cache.age_secs) {
            (CacheState::Empty, _) => self.dim("empty"),
            (state, Some(age)) => format!("{} ({age}s old, ttl {}s)", cache_label(state), info.cache.ttl_secs),
            (state, None) => cache_label(state).to_string(),
        };

        format!(
            "{:<22} {:<8} {:<12} {}",
            info.name,
            info.kind.cli_name(),
            configured,
            cache
        )
    }

    // ========================================================================
    // Poller State
    // ========================================================================

    /// Formats the status line of a poller.
    pub fn format_state_header<T>(&self, name: &str, state: &FetchState<T>, fallback: bool) -> String {
        let status = match state.status {
            FetchStatus::Idle => self.dim("idle"),
            FetchStatus::Loading => self.yellow("loading"),
            FetchStatus::Ready if fallback => self.dim("no data"),
            FetchStatus::Ready => self.green("ready"),
            FetchStatus::Failed => self.red("failed"),
        };
        let fetched = state
            .last_fetch_time
            .map_or_else(|| "never".to_string(), format_clock);

        let mut line = format!("{} [{}] {}", self.bold(name), status, self.dim(&format!("at {fetched}")));
        if let Some(error) = &state.error {
            line.push('\n');
            line.push_str(&format!("  {} {}", self.red("!"), error));
        }
        line
    }

    /// Formats an error message.
    pub fn format_error(&self, service: &str, error: &str) -> String {
        format!("{}: {} - {}", self.bold(service), self.red("Error"), error)
    }

    // ========================================================================
    // Bars
    // ========================================================================

    /// Formats a progress bar for a 0-100 value, colored by rate.
    pub fn progress_bar(&self, percent: f64) -> String {
        let clamped = percent.clamp(0.0, 100.0);
        self.color_for_rate(clamped, &self.share_bar(clamped))
    }

    /// Uncolored bar for a 0-100 share.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn share_bar(&self, percent: f64) -> String {
        let filled = ((percent.clamp(0.0, 100.0) / 100.0) * self.bar_width as f64).round() as usize;
        format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(self.bar_width.saturating_sub(filled))
        )
    }

    /// Renders values as a one-line sparkline scaled to their range.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn sparkline(&self, values: &[f64]) -> String {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let span = max - min;

        values
            .iter()
            .map(|v| {
                if !v.is_finite() || span <= 0.0 {
                    return SPARKS[0];
                }
                let level = ((v - min) / span * 7.0).round() as usize;
                SPARKS[level.min(SPARKS.len() - 1)]
            })
            .collect()
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn color_for_rate(&self, percent: f64, text: &str) -> String {
        if percent >= 99.0 {
            self.green(text)
        } else if percent >= 95.0 {
            self.yellow(text)
        } else {
            self.red(text)
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_number(&self, n: u64) -> String {
        let n = n as f64;
        if n >= 1_000_000.0 {
            format!("{:.1}M", n / 1_000_000.0)
        } else if n >= 1_000.0 {
            format!("{:.1}K", n / 1_000.0)
        } else {
            format!("{n:.0}")
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Locked amount as a share of deposited funds; `None` without funds.
fn locked_share_percent(token: &TokenLedger) -> Option<f64> {
    let funds = token.user_funds.to_f64(token.decimals);
    if funds <= 0.0 {
        return None;
    }
    Some((token.locked_amount.to_f64(token.decimals) / funds * 100.0).clamp(0.0, 100.0))
}

fn cache_label(state: CacheState) -> &'static str {
    match state {
        CacheState::Empty => "empty",
        CacheState::Fresh => "fresh",
        CacheState::Stale => "stale",
    }
}

/// Local wall-clock time of day.
pub fn format_clock(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}
