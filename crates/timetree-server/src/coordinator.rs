//! Per-connection refresh coordinator.
//!
//! A [`CalendarCoordinator`] owns everything one configured calendar needs:
//! the provider, the calendar id and the shared [`EventCache`]. Each refresh
//! signs in when the provider has no session, fetches, normalizes and
//! replaces the cache. Failures are mapped to a [`RefreshError`]:
//!
//! - auth-class provider errors become [`RefreshError::NeedsReauth`]
//! - everything else becomes [`RefreshError::Transient`], and the cache keeps
//!   serving the previous events
//!
//! [`EventCache`]: crate::EventCache

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use timetree_core::NormalizedEvent;
use timetree_providers::{CalendarProvider, ProviderError, normalize_events};
use tracing::{debug, info, warn};

use crate::cache::{SharedCache, new_shared_cache};
use crate::setup::ConnectionEntry;

/// Why a refresh failed.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The credentials were rejected; polling cannot recover on its own.
    #[error("authorization required: {0}")]
    NeedsReauth(#[source] ProviderError),

    /// The service was unreachable or misbehaved; the next poll may succeed.
    #[error("transient failure: {0}")]
    Transient(#[source] ProviderError),
}

impl RefreshError {
    /// Returns true if user action is needed before polling can succeed.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, Self::NeedsReauth(_))
    }

    /// Returns the underlying provider error.
    pub fn provider_error(&self) -> &ProviderError {
        match self {
            Self::NeedsReauth(e) | Self::Transient(e) => e,
        }
    }
}

impl From<ProviderError> for RefreshError {
    fn from(e: ProviderError) -> Self {
        if e.is_auth_error() {
            Self::NeedsReauth(e)
        } else {
            Self::Transient(e)
        }
    }
}

/// Summary of a successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Number of events now cached.
    pub events: usize,
    /// Records dropped because they could not be normalized.
    pub skipped: usize,
    /// Sync pages received.
    pub pages: usize,
    /// False when a continuation page failed.
    pub complete: bool,
}

/// Presentation view of one calendar connection.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarSnapshot {
    /// Display name, `TimeTree <calendar name>`.
    pub name: String,
    /// Stable identifier, `timetree_<calendar id>`.
    pub unique_id: String,
    pub calendar_id: i64,
    pub calendar_name: String,
    /// True if the last refresh succeeded.
    pub available: bool,
    pub event_count: usize,
    pub next_event: Option<NormalizedEvent>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Refresh context of one configured calendar.
pub struct CalendarCoordinator {
    provider: Arc<dyn CalendarProvider>,
    calendar_id: i64,
    calendar_name: String,
    cache: SharedCache,
}

impl CalendarCoordinator {
    /// Creates a coordinator with an empty cache.
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        calendar_id: i64,
        calendar_name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            calendar_id,
            calendar_name: calendar_name.into(),
            cache: new_shared_cache(),
        }
    }

    /// Creates a coordinator for a configured connection.
    pub fn from_entry(provider: Arc<dyn CalendarProvider>, entry: &ConnectionEntry) -> Self {
        Self::new(provider, entry.calendar_id, entry.calendar_name.clone())
    }

    /// Returns the calendar id.
    pub fn calendar_id(&self) -> i64 {
        self.calendar_id
    }

    /// Returns the provider.
    pub fn provider(&self) -> &Arc<dyn CalendarProvider> {
        &self.provider
    }

    /// Returns a handle to the shared cache.
    pub fn cache(&self) -> SharedCache {
        self.cache.clone()
    }

    /// Runs one refresh cycle.
    ///
    /// On success the cache holds exactly the freshly fetched events, sorted
    /// by start. On failure the cached events are kept.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        if !self.provider.is_authenticated() {
            debug!(calendar_id = self.calendar_id, "no session, signing in");
            if let Err(e) = self.provider.authenticate().await {
                return Err(self.fail(e).await);
            }
        }

        let result = match self.provider.fetch_events(self.calendar_id).await {
            Ok(result) => result,
            Err(e) => return Err(self.fail(e).await),
        };

        let events = normalize_events(&result.events);
        let outcome = RefreshOutcome {
            events: events.len(),
            skipped: result.events.len() - events.len(),
            pages: result.pages,
            complete: result.complete,
        };

        if !result.complete {
            warn!(
                calendar_id = self.calendar_id,
                events = outcome.events,
                pages = outcome.pages,
                "sync ended early, cached events may be incomplete"
            );
        }

        self.cache.write().await.replace(events, result.complete);

        info!(
            calendar_id = self.calendar_id,
            events = outcome.events,
            skipped = outcome.skipped,
            "refresh done"
        );
        Ok(outcome)
    }

    /// Builds the presentation view at `now`.
    pub async fn snapshot(&self, now: DateTime<Utc>) -> CalendarSnapshot {
        let cache = self.cache.read().await;
        CalendarSnapshot {
            name: format!("TimeTree {}", self.calendar_name),
            unique_id: format!("timetree_{}", self.calendar_id),
            calendar_id: self.calendar_id,
            calendar_name: self.calendar_name.clone(),
            available: cache.last_update_success(),
            event_count: cache.event_count(),
            next_event: cache.next_event(now).cloned(),
            updated_at: cache.updated_at(),
        }
    }

    async fn fail(&self, e: ProviderError) -> RefreshError {
        let err = RefreshError::from(e);
        warn!(
            calendar_id = self.calendar_id,
            needs_reauth = err.needs_reauth(),
            error = %err.provider_error(),
            "refresh failed"
        );
        self.cache.write().await.record_failure(err.to_string());
        err
    }
}
