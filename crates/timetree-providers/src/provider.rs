//! CalendarProvider trait definition.
//!
//! This module defines the [`CalendarProvider`] trait, the seam between the
//! polling side and a calendar backend. Providers are responsible for:
//! - Establishing and holding a session
//! - Listing the calendars of the account
//! - Fetching the raw events of one calendar, draining pagination internally

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::RawEvent;

/// Summary of a calendar of the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarInfo {
    /// Numeric calendar identifier.
    pub id: i64,
    /// Human-readable name of the calendar.
    pub name: String,
    /// When the calendar was deactivated, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deactivated_at: Option<i64>,
}

impl CalendarInfo {
    /// Creates an active calendar summary.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            deactivated_at: None,
        }
    }

    /// Builder method to mark the calendar as deactivated.
    pub fn with_deactivated_at(mut self, deactivated_at: i64) -> Self {
        self.deactivated_at = Some(deactivated_at);
        self
    }

    /// Returns true unless the calendar carries a deactivation timestamp.
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }
}

/// Result of draining the event sync of one calendar.
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    /// The fetched events, in arrival order.
    pub events: Vec<RawEvent>,
    /// Number of pages that were received successfully.
    pub pages: usize,
    /// False when a continuation page failed and `events` is partial.
    pub complete: bool,
}

impl FetchResult {
    /// Creates a complete result.
    pub fn with_events(events: Vec<RawEvent>) -> Self {
        Self {
            events,
            pages: 1,
            complete: true,
        }
    }

    /// Creates a partial result.
    pub fn partial(events: Vec<RawEvent>, pages: usize) -> Self {
        Self {
            events,
            pages,
            complete: false,
        }
    }

    /// Builder method to set the page count.
    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }
}

/// Status information about a provider.
#[derive(Debug, Clone)]
pub struct ProviderStatus {
    /// The provider name/type.
    pub provider_type: String,
    /// Whether the provider currently holds a session.
    pub is_authenticated: bool,
    /// The last successful fetch, if any.
    pub last_sync: Option<DateTime<Utc>>,
    /// Any current error state.
    pub error: Option<String>,
    /// Number of active calendars seen by the last listing.
    pub calendar_count: usize,
}

impl ProviderStatus {
    /// Creates a new provider status.
    pub fn new(provider_type: impl Into<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            is_authenticated: false,
            last_sync: None,
            error: None,
            calendar_count: 0,
        }
    }
}

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The core abstraction for calendar providers.
///
/// # Implementation Notes
///
/// - Implementations must be `Send + Sync`; the scheduler shares them
///   across tasks behind an `Arc`
/// - Session state is managed internally; `authenticate` replaces it
/// - Pagination is drained inside `fetch_events`
///
/// # Example Implementation
///
/// ```ignore
/// impl CalendarProvider for MyProvider {
///     fn name(&self) -> &str { "mine" }
///
///     fn fetch_events(&self, calendar_id: i64) -> BoxFuture<'_, ProviderResult<FetchResult>> {
///         Box::pin(async move {
///             let events = self.client.lock().await.sync(calendar_id).await?;
///             Ok(FetchResult::with_events(events))
///         })
///     }
///     // ... other methods
/// }
/// ```
pub trait CalendarProvider: Send + Sync {
    /// Returns the name/type of this provider (e.g., "timetree").
    fn name(&self) -> &str;

    /// Signs in with the stored credentials, replacing any existing session.
    ///
    /// # Errors
    ///
    /// Auth-class errors when the credentials are rejected, connection-class
    /// errors when the service cannot be reached.
    fn authenticate(&self) -> BoxFuture<'_, ProviderResult<()>>;

    /// Lists the active calendars of the account.
    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>>;

    /// Fetches the raw events of one calendar.
    ///
    /// A failure of the first page is returned as an error. A failure on a
    /// continuation page yields a partial [`FetchResult`].
    fn fetch_events(&self, calendar_id: i64) -> BoxFuture<'_, ProviderResult<FetchResult>>;

    /// Returns the current status of the provider.
    fn status(&self) -> BoxFuture<'_, ProviderStatus>;

    /// Checks if the provider currently holds a session.
    fn is_authenticated(&self) -> bool;

    /// Returns the provider's polling hint for the scheduler.
    fn suggested_poll_interval(&self) -> Duration {
        Duration::from_secs(30 * 60)
    }
}

/// A provider that always returns an error.
///
/// Useful for testing or as a placeholder when a provider fails to
/// initialize.
#[derive(Debug)]
pub struct ErrorProvider {
    name: String,
    error: ProviderError,
}

impl ErrorProvider {
    /// Creates a new error provider.
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    fn error(&self) -> ProviderError {
        ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name)
    }
}

impl CalendarProvider for ErrorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn authenticate(&self) -> BoxFuture<'_, ProviderResult<()>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn fetch_events(&self, _calendar_id: i64) -> BoxFuture<'_, ProviderResult<FetchResult>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn status(&self) -> BoxFuture<'_, ProviderStatus> {
        let mut status = ProviderStatus::new(&self.name);
        status.error = Some(self.error.message().to_string());
        Box::pin(async move { status })
    }

    fn is_authenticated(&self) -> bool {
        false
    }
}
