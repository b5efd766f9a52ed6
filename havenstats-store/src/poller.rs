//! Polling hook.
//!
//! A [`StatsPoller`] owns the request lifecycle for one consumer of one
//! service: it fetches on mount, refreshes on an interval, and exposes a
//! [`FetchState`] that only its own fetches mutate.
//!
//! ## Ordering
//!
//! Every fetch takes the next generation number and replaces the
//! in-flight cancellation token. A result is committed only while the
//! poller is mounted and its generation is still the latest, so a slow
//! superseded request can never overwrite a newer one.

use havenstats_core::ServiceKind;
use havenstats_fetch::{
    CancellationToken, Clock, FetchError, FetchRequest, StatsService, system_clock,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::schedule::{ScheduledTask, sleep_or_cancel};
use crate::state::{FetchState, FetchStatus};

// ============================================================================
// Options
// ============================================================================

/// How a poller fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerOptions {
    /// Let scheduled and initial fetches use the service cache.
    pub use_cache: bool,
    /// Delay between background refreshes.
    pub poll_interval: Duration,
    /// Refresh on `poll_interval` after the initial fetch.
    pub enable_polling: bool,
}

impl PollerOptions {
    /// Defaults for a service: cache on, polling at its default interval.
    pub fn for_service(kind: ServiceKind) -> Self {
        Self {
            use_cache: true,
            poll_interval: kind.default_poll_interval(),
            enable_polling: true,
        }
    }

    /// Sets whether the cache may be used.
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Sets the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Enables or disables background polling.
    pub fn with_polling(mut self, enabled: bool) -> Self {
        self.enable_polling = enabled;
        self
    }
}

/// What triggered a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    /// First fetch after mount.
    Initial,
    /// Timer tick; keeps the loading flag off.
    Background,
    /// Manual refetch.
    Refetch,
    /// Manual retry; bypasses the cache and clears the error.
    Retry,
}

impl FetchMode {
    fn shows_loading(self) -> bool {
        self != Self::Background
    }

    fn use_cache(self, options: &PollerOptions) -> bool {
        self != Self::Retry && options.use_cache
    }
}

// ============================================================================
// Shared State
// ============================================================================

struct PollerInner<T> {
    state: FetchState<T>,
    mounted: bool,
    generation: u64,
    in_flight: Option<CancellationToken>,
    has_succeeded: bool,
}

struct Shared<S: StatsService> {
    service: Arc<S>,
    options: PollerOptions,
    clock: Arc<dyn Clock>,
    inner: Mutex<PollerInner<S::Output>>,
    notify: watch::Sender<u64>,
}

impl<S: StatsService> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, PollerInner<S::Output>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify_change(&self) {
        self.notify.send_modify(|version| *version = version.wrapping_add(1));
    }

    /// Starts a fetch, cancelling the previous one. `None` once unmounted.
    fn begin(&self, mode: FetchMode) -> Option<(u64, CancellationToken)> {
        let mut inner = self.lock();
        if !inner.mounted {
            return None;
        }

        if let Some(previous) = inner.in_flight.take() {
            debug!(service = self.service.id(), "Cancelling superseded fetch");
            previous.cancel();
        }

        inner.generation += 1;
        let token = CancellationToken::new();
        inner.in_flight = Some(token.clone());

        if mode.shows_loading() {
            inner.state.is_loading = true;
            inner.state.status = FetchStatus::Loading;
        }
        if mode == FetchMode::Retry {
            inner.state.error = None;
        }
        let generation = inner.generation;
        drop(inner);

        self.notify_change();
        Some((generation, token))
    }

    /// Applies a result if it is still current.
    fn commit(&self, generation: u64, result: Result<S::Output, FetchError>) -> bool {
        let mut inner = self.lock();
        if !inner.mounted {
            debug!(service = self.service.id(), "Discarding result after unmount");
            return false;
        }
        if inner.generation != generation {
            warn!(
                service = self.service.id(),
                generation,
                latest = inner.generation,
                "Discarding superseded result"
            );
            return false;
        }

        inner.in_flight = None;
        inner.state.is_loading = false;
        inner.state.last_fetch_time = Some(self.clock.now());
        match result {
            Ok(data) => {
                inner.state.data = data;
                inner.state.error = None;
                inner.state.status = FetchStatus::Ready;
                inner.has_succeeded = true;
            }
            Err(e) => {
                warn!(service = self.service.id(), error = %e, "Fetch failed");
                inner.state.error = Some(e.to_string());
                inner.state.status = FetchStatus::Failed;
            }
        }
        drop(inner);

        self.notify_change();
        true
    }

    async fn run(&self, mode: FetchMode) {
        let Some((generation, cancel)) = self.begin(mode) else {
            return;
        };
        debug!(service = self.service.id(), ?mode, generation, "Fetching");

        let request = FetchRequest::new()
            .with_cache(mode.use_cache(&self.options))
            .with_cancel(cancel);
        let result = self.service.fetch(&request).await;

        if self.commit(generation, result) {
            info!(service = self.service.id(), ?mode, generation, "Fetch settled");
        }
    }

    fn unmount(&self) -> bool {
        let mut inner = self.lock();
        if !inner.mounted {
            return false;
        }
        inner.mounted = false;
        if let Some(token) = inner.in_flight.take() {
            token.cancel();
        }
        true
    }
}

async fn drive<S: StatsService>(shared: Arc<Shared<S>>, cancel: CancellationToken) {
    shared.run(FetchMode::Initial).await;
    if !shared.options.enable_polling {
        return;
    }
    while sleep_or_cancel(shared.options.poll_interval, &cancel).await {
        shared.run(FetchMode::Background).await;
    }
}

// ============================================================================
// Poller
// ============================================================================

/// Polling hook for one service.
///
/// Mounting fetches immediately and then every `poll_interval`. Background
/// refreshes keep `is_loading` off and keep the displayed data on failure.
/// Dropping the poller unmounts it.
///
/// ## Example
///
/// ```ignore
/// let poller = StatsPoller::mount(services.metrics.clone(), PollerOptions::for_service(kind));
/// let mut changes = poller.subscribe();
/// while changes.changed().await.is_ok() {
///     render(&poller.state());
/// }
/// ```
pub struct StatsPoller<S: StatsService> {
    shared: Arc<Shared<S>>,
    timer: Mutex<Option<ScheduledTask>>,
}

impl<S: StatsService> StatsPoller<S> {
    /// Mounts a poller using the system clock.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn mount(service: Arc<S>, options: PollerOptions) -> Self {
        Self::mount_with_clock(service, options, system_clock())
    }

    /// Mounts a poller stamping fetch times from `clock`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn mount_with_clock(service: Arc<S>, options: PollerOptions, clock: Arc<dyn Clock>) -> Self {
        let (notify, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            service,
            options,
            clock,
            inner: Mutex::new(PollerInner {
                state: FetchState {
                    is_loading: true,
                    status: FetchStatus::Loading,
                    ..FetchState::default()
                },
                mounted: true,
                generation: 0,
                in_flight: None,
                has_succeeded: false,
            }),
            notify,
        });

        debug!(
            service = shared.service.id(),
            interval_secs = options.poll_interval.as_secs(),
            polling = options.enable_polling,
            "Mounting poller"
        );

        let driver = Arc::clone(&shared);
        let timer = ScheduledTask::spawn(move |cancel| drive(driver, cancel));

        Self {
            shared,
            timer: Mutex::new(Some(timer)),
        }
    }

    // ========================================================================
    // State Access
    // ========================================================================

    /// Returns a copy of the current state.
    pub fn state(&self) -> FetchState<S::Output> {
        self.shared.lock().state.clone()
    }

    /// Returns the current data.
    pub fn data(&self) -> S::Output {
        self.shared.lock().state.data.clone()
    }

    /// Returns true while a foreground fetch is running.
    pub fn is_loading(&self) -> bool {
        self.shared.lock().state.is_loading
    }

    /// Returns the last failure message.
    pub fn error(&self) -> Option<String> {
        self.shared.lock().state.error.clone()
    }

    /// Returns when the last fetch finished.
    pub fn last_fetch_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.shared.lock().state.last_fetch_time
    }

    /// Whether the underlying service has its required settings.
    pub fn is_configured(&self) -> bool {
        self.shared.service.is_configured()
    }

    /// True until the first successful fetch; `data` is the placeholder.
    pub fn is_using_fallback(&self) -> bool {
        !self.shared.lock().has_succeeded
    }

    /// Returns true until [`unmount`](Self::unmount) is called.
    pub fn is_mounted(&self) -> bool {
        self.shared.lock().mounted
    }

    /// The service behind this poller.
    pub fn service(&self) -> &Arc<S> {
        &self.shared.service
    }

    /// Receives a new version number on every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.notify.subscribe()
    }

    /// Waits until the current foreground fetch has finished.
    ///
    /// Returns immediately if nothing is loading or the poller is
    /// unmounted.
    pub async fn settled(&self) -> FetchState<S::Output> {
        let mut changes = self.subscribe();
        loop {
            {
                let inner = self.shared.lock();
                if !inner.state.is_loading || !inner.mounted {
                    return inner.state.clone();
                }
            }
            if changes.changed().await.is_err() {
                return self.state();
            }
        }
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Fetches again with loading shown, honouring the cache setting.
    ///
    /// Cancels a fetch that is still running. Completes when this fetch
    /// has been committed or discarded.
    pub async fn refetch(&self) {
        self.shared.run(FetchMode::Refetch).await;
    }

    /// Clears the error and fetches again, bypassing the cache.
    pub async fn retry(&self) {
        self.shared.run(FetchMode::Retry).await;
    }

    /// Stops the timer and cancels any in-flight fetch.
    ///
    /// No state changes after this returns. Idempotent.
    pub fn unmount(&self) {
        let timer = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(timer);

        if self.shared.unmount() {
            debug!(service = self.shared.service.id(), "Unmounted poller");
            // Wakes `settled` waiters; the state itself is frozen.
            self.shared.notify_change();
        }
    }
}

impl<S: StatsService> Drop for StatsPoller<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<S: StatsService> std::fmt::Debug for StatsPoller<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("StatsPoller")
            .field("service", &self.shared.service.id())
            .field("options", &self.shared.options)
            .field("mounted", &inner.mounted)
            .field("generation", &inner.generation)
            .field("status", &inner.state.status)
            .finish_non_exhaustive()
    }
}
