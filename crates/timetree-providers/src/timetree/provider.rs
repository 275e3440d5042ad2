//! TimeTree implementation of [`CalendarProvider`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ProviderResult;
use crate::provider::{BoxFuture, CalendarInfo, CalendarProvider, FetchResult, ProviderStatus};

use super::PROVIDER_NAME;
use super::client::TimeTreeClient;
use super::config::TimeTreeConfig;
use super::credentials::Credentials;

/// TimeTree calendar provider.
///
/// Owns the account credentials and a single [`TimeTreeClient`]. All calls
/// go through the client mutex, so a re-authentication never interleaves
/// with a fetch.
pub struct TimeTreeProvider {
    client: Mutex<TimeTreeClient>,
    credentials: Credentials,
    /// Mirrors the client session for the synchronous `is_authenticated`.
    authenticated: AtomicBool,
    calendar_count: AtomicUsize,
    last_sync: Mutex<Option<DateTime<Utc>>>,
}

impl TimeTreeProvider {
    /// Creates an unauthenticated provider.
    pub fn new(config: TimeTreeConfig, credentials: Credentials) -> ProviderResult<Self> {
        let client = TimeTreeClient::new(config)?;

        Ok(Self {
            client: Mutex::new(client),
            credentials,
            authenticated: AtomicBool::new(false),
            calendar_count: AtomicUsize::new(0),
            last_sync: Mutex::new(None),
        })
    }

    /// Returns the account email.
    pub fn email(&self) -> &str {
        self.credentials.email()
    }

    fn sync_flag(&self, client: &TimeTreeClient) {
        self.authenticated
            .store(client.is_authenticated(), Ordering::SeqCst);
    }
}

impl CalendarProvider for TimeTreeProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn authenticate(&self) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move {
            let mut client = self.client.lock().await;
            let result = client.authenticate(&self.credentials).await;
            self.sync_flag(&client);
            result
        })
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        Box::pin(async move {
            let mut client = self.client.lock().await;
            let result = client.list_calendars().await;
            self.sync_flag(&client);

            let calendars = result?;
            self.calendar_count
                .store(calendars.len(), Ordering::SeqCst);
            Ok(calendars)
        })
    }

    fn fetch_events(&self, calendar_id: i64) -> BoxFuture<'_, ProviderResult<FetchResult>> {
        Box::pin(async move {
            let result = {
                let mut client = self.client.lock().await;
                let result = client.fetch_events(calendar_id).await;
                self.sync_flag(&client);
                result
            }?;

            debug!(
                calendar_id,
                events = result.events.len(),
                complete = result.complete,
                "provider fetch done"
            );

            *self.last_sync.lock().await = Some(Utc::now());
            Ok(result)
        })
    }

    fn status(&self) -> BoxFuture<'_, ProviderStatus> {
        Box::pin(async move {
            let mut status = ProviderStatus::new(PROVIDER_NAME);
            status.is_authenticated = self.authenticated.load(Ordering::SeqCst);
            status.last_sync = *self.last_sync.lock().await;
            status.calendar_count = self.calendar_count.load(Ordering::SeqCst);
            status
        })
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> TimeTreeProvider {
        TimeTreeProvider::new(
            TimeTreeConfig::default(),
            Credentials::new("me@example.com", "hunter2"),
        )
        .unwrap()
    }

    #[test]
    fn provider_name() {
        assert_eq!(provider().name(), "timetree");
    }

    #[test]
    fn initial_status() {
        let provider = provider();
        assert!(!provider.is_authenticated());
        assert_eq!(provider.email(), "me@example.com");
    }

    #[tokio::test]
    async fn fetch_without_session_fails_fast() {
        let provider = provider();
        let err = provider.fetch_events(1).await.unwrap_err();
        assert!(err.is_auth_error());

        let status = provider.status().await;
        assert!(!status.is_authenticated);
        assert!(status.last_sync.is_none());
    }
}
