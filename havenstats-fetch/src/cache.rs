//! Single-slot response cache with a time-to-live.
//!
//! Each service owns one [`ResponseCache`]. It holds the latest successful
//! result and serves it while `now - captured_at < ttl`.
//!
//! Writes carry a ticket taken when the request started. A request that
//! finishes late never replaces an entry committed by a request that
//! started after it.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::FetchError;

// ============================================================================
// Cache Entry & Status
// ============================================================================

/// A cached payload and when it was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// The cached value.
    pub payload: T,
    /// When the value was stored.
    pub captured_at: DateTime<Utc>,
    ticket: u64,
}

/// Freshness of a cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    /// Nothing stored.
    Empty,
    /// Stored and within TTL.
    Fresh,
    /// Stored but past TTL.
    Stale,
}

/// Snapshot of a cache slot for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    /// Whether an entry is stored.
    pub has_entry: bool,
    /// Age of the entry in whole seconds.
    pub age_secs: Option<u64>,
    /// Configured TTL in seconds.
    pub ttl_secs: u64,
    /// Current freshness.
    pub state: CacheState,
}

// ============================================================================
// Response Cache
// ============================================================================

/// Process-wide cache slot for one service.
#[derive(Debug)]
pub struct ResponseCache<T> {
    slot: RwLock<Option<CacheEntry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    next_ticket: AtomicU64,
}

impl<T: Clone> ResponseCache<T> {
    /// Creates an empty cache using the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
            clock,
            next_ticket: AtomicU64::new(0),
        }
    }

    /// Returns the configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the payload if the entry is fresh.
    pub fn get(&self) -> Option<T> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.payload.clone())
    }

    /// Returns the stored entry regardless of freshness.
    pub fn entry(&self) -> Option<CacheEntry<T>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reserves a ticket for a write that will happen later.
    pub fn ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Stores `payload` as the freshest entry.
    pub fn put(&self, payload: T) {
        let ticket = self.ticket();
        self.put_with(ticket, payload);
    }

    /// Stores `payload` unless a later-started write already landed.
    ///
    /// Returns whether the payload was stored.
    pub fn put_with(&self, ticket: u64, payload: T) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|entry| entry.ticket > ticket) {
            return false;
        }
        *slot = Some(CacheEntry {
            payload,
            captured_at: self.clock.now(),
            ticket,
        });
        true
    }

    /// Empties the slot.
    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Returns the current freshness.
    pub fn state(&self) -> CacheState {
        self.status().state
    }

    /// Describes the slot.
    pub fn status(&self) -> CacheStatus {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        let ttl_secs = self.ttl.as_secs();
        match slot.as_ref() {
            None => CacheStatus {
                has_entry: false,
                age_secs: None,
                ttl_secs,
                state: CacheState::Empty,
            },
            Some(entry) => CacheStatus {
                has_entry: true,
                age_secs: Some(u64::try_from(self.age(entry).num_seconds()).unwrap_or(0)),
                ttl_secs,
                state: if self.is_fresh(entry) {
                    CacheState::Fresh
                } else {
                    CacheState::Stale
                },
            },
        }
    }

    /// Serves a fresh entry when allowed, otherwise runs `load` and stores
    /// its result.
    ///
    /// # Errors
    ///
    /// Propagates whatever `load` returns. Failures leave the slot as is.
    pub async fn get_or_fetch<F, Fut>(&self, use_cache: bool, load: F) -> Result<T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        if use_cache {
            if let Some(hit) = self.get() {
                debug!("Cache hit");
                return Ok(hit);
            }
            debug!("Cache miss");
        }

        let ticket = self.ticket();
        let value = load().await?;
        if !self.put_with(ticket, value.clone()) {
            debug!(ticket, "Newer result already cached, keeping it");
        }
        Ok(value)
    }

    fn age(&self, entry: &CacheEntry<T>) -> TimeDelta {
        self.clock.now() - entry.captured_at
    }

    fn is_fresh(&self, entry: &CacheEntry<T>) -> bool {
        let ttl = TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX);
        self.age(entry) < ttl
    }
}

// ============================================================================
// Tests
// ============================================================================
