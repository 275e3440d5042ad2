//! Wire types of the TimeTree web API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::provider::CalendarInfo;
use crate::raw_event::RawEvent;

/// Body of `PUT /auth/email/signin`.
#[derive(Debug, Serialize)]
pub(crate) struct SignInRequest<'a> {
    pub uid: &'a str,
    pub password: &'a str,
    /// Correlation token: a v4 UUID without dashes.
    pub uuid: String,
}

impl<'a> SignInRequest<'a> {
    pub fn new(uid: &'a str, password: &'a str) -> Self {
        Self {
            uid,
            password,
            uuid: uuid::Uuid::new_v4().simple().to_string(),
        }
    }
}

/// Response of `GET /calendars?since=0`.
#[derive(Debug, Deserialize)]
pub(crate) struct CalendarsResponse {
    #[serde(default)]
    pub calendars: Vec<ApiCalendar>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCalendar {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    /// Any non-null value marks the calendar as deactivated.
    #[serde(default)]
    pub deactivated_at: Option<Value>,
}

impl ApiCalendar {
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }
}

impl From<ApiCalendar> for CalendarInfo {
    fn from(api: ApiCalendar) -> Self {
        let deactivated_at = api
            .deactivated_at
            .map(|value| value.as_i64().unwrap_or_default());
        Self {
            id: api.id,
            name: api.name.unwrap_or_else(|| "Unnamed Calendar".to_string()),
            deactivated_at,
        }
    }
}

/// One page of `GET /calendar/{id}/events/sync`.
#[derive(Debug, Deserialize)]
pub(crate) struct SyncResponse {
    /// Records stay untyped until [`decode_records`] so one bad record
    /// cannot fail the page.
    #[serde(default)]
    pub events: Vec<Value>,
    /// Set when more pages follow.
    #[serde(default)]
    pub chunk: Option<bool>,
    /// Continuation cursor for the next page.
    #[serde(default)]
    pub since: Option<i64>,
}

/// What follows a sync page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Continuation {
    /// Last page.
    Done,
    /// More pages, starting at this cursor.
    Next(i64),
    /// More data announced without a cursor.
    MissingCursor,
}

impl SyncResponse {
    pub fn continuation(&self) -> Continuation {
        match (self.chunk.unwrap_or(false), self.since) {
            (false, _) => Continuation::Done,
            (true, Some(since)) => Continuation::Next(since),
            (true, None) => Continuation::MissingCursor,
        }
    }
}

/// Decodes sync records, dropping the ones that do not fit [`RawEvent`].
pub(crate) fn decode_records(records: Vec<Value>) -> Vec<RawEvent> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<RawEvent>(record) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(error = %e, "skipping undecodable sync record");
                None
            }
        })
        .collect()
}
