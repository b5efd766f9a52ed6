//! Per-poller fetch state.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A foreground fetch is running.
    Loading,
    /// The last fetch succeeded.
    Ready,
    /// The last fetch failed.
    Failed,
}

/// What a consumer renders: data plus loading and error flags.
///
/// `data` starts as `T::default()` and is only ever replaced by a
/// successful fetch; a failure leaves it untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FetchState<T> {
    /// Latest successful result, or the placeholder.
    pub data: T,
    /// True while a foreground fetch is running.
    pub is_loading: bool,
    /// Message of the last failure, cleared on success.
    pub error: Option<String>,
    /// When the last fetch finished, successful or not.
    pub last_fetch_time: Option<DateTime<Utc>>,
    /// Current lifecycle state.
    pub status: FetchStatus,
}

