//! Scripted provider for orchestrator tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use timetree_providers::{
    BoxFuture, CalendarInfo, CalendarProvider, FetchResult, ProviderError, ProviderErrorCode,
    ProviderResult, ProviderStatus, RawEvent,
};

/// A one-hour event starting at `start_ms`.
pub(crate) fn raw(title: &str, start_ms: i64) -> RawEvent {
    RawEvent::new(start_ms, start_ms + 3_600_000).with_title(title)
}

/// Provider whose answers are queued by the test.
///
/// An empty fetch queue answers with an empty complete result.
pub(crate) struct FakeProvider {
    authenticated: AtomicBool,
    auth_failure: Option<ProviderErrorCode>,
    calendars: Result<Vec<CalendarInfo>, ProviderErrorCode>,
    fetches: Mutex<VecDeque<Result<FetchResult, ProviderErrorCode>>>,
    auth_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self {
            authenticated: AtomicBool::new(false),
            auth_failure: None,
            calendars: Ok(Vec::new()),
            fetches: Mutex::new(VecDeque::new()),
            auth_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing_auth(mut self, code: ProviderErrorCode) -> Self {
        self.auth_failure = Some(code);
        self
    }

    pub(crate) fn with_calendars(mut self, calendars: Vec<CalendarInfo>) -> Self {
        self.calendars = Ok(calendars);
        self
    }

    pub(crate) fn failing_calendars(mut self, code: ProviderErrorCode) -> Self {
        self.calendars = Err(code);
        self
    }

    pub(crate) fn push_fetch(&self, result: Result<FetchResult, ProviderErrorCode>) {
        self.fetches.lock().unwrap().push_back(result);
    }

    pub(crate) fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    fn scripted(code: ProviderErrorCode) -> ProviderError {
        ProviderError::new(code, "scripted failure").with_provider("fake")
    }
}

impl CalendarProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn authenticate(&self) -> BoxFuture<'_, ProviderResult<()>> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        let result = match self.auth_failure {
            Some(code) => {
                if code == ProviderErrorCode::AuthenticationFailed {
                    self.authenticated.store(false, Ordering::SeqCst);
                }
                Err(Self::scripted(code))
            }
            None => {
                self.authenticated.store(true, Ordering::SeqCst);
                Ok(())
            }
        };
        Box::pin(async move { result })
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        let result = self.calendars.clone().map_err(Self::scripted);
        Box::pin(async move { result })
    }

    fn fetch_events(&self, _calendar_id: i64) -> BoxFuture<'_, ProviderResult<FetchResult>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .fetches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(FetchResult::with_events(Vec::new())));
        if matches!(next, Err(ProviderErrorCode::SessionExpired)) {
            self.authenticated.store(false, Ordering::SeqCst);
        }
        let result = next.map_err(Self::scripted);
        Box::pin(async move { result })
    }

    fn status(&self) -> BoxFuture<'_, ProviderStatus> {
        let mut status = ProviderStatus::new("fake");
        status.is_authenticated = self.is_authenticated();
        Box::pin(async move { status })
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }
}
