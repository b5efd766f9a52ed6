//! Output formatting for CLI.

mod json;
mod text;

pub use json::{JsonFormatter, LedgerOutput, ServiceOutput};
pub use text::{TextFormatter, format_clock};
