//! Raw event type returned by the TimeTree sync endpoint.
//!
//! Every field is optional: the sync payload is server-defined and records
//! in the wild omit fields freely. Unknown fields are ignored. The record is
//! converted to a [`timetree_core::NormalizedEvent`] by
//! [`crate::normalize_event`].

use serde::{Deserialize, Serialize};

/// A TimeTree event record as it comes off the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Server-side event identifier.
    #[serde(default)]
    pub uuid: Option<String>,
    /// Event title.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-form note attached to the event.
    #[serde(default)]
    pub note: Option<String>,
    /// Location text.
    #[serde(default)]
    pub location: Option<String>,
    /// Link attached to the event.
    #[serde(default)]
    pub url: Option<String>,
    /// Start, in milliseconds since the Unix epoch. Negative before 1970.
    #[serde(default)]
    pub start_at: Option<i64>,
    /// End, in milliseconds since the Unix epoch. Negative before 1970.
    #[serde(default)]
    pub end_at: Option<i64>,
    /// IANA timezone of the start moment.
    #[serde(default)]
    pub start_timezone: Option<String>,
    /// IANA timezone of the end moment.
    #[serde(default)]
    pub end_timezone: Option<String>,
    /// Whether the event spans whole days.
    #[serde(default)]
    pub all_day: Option<bool>,
}

impl RawEvent {
    /// Creates a record with the given bounds, in UTC.
    pub fn new(start_at: i64, end_at: i64) -> Self {
        Self {
            start_at: Some(start_at),
            end_at: Some(end_at),
            ..Self::default()
        }
    }

    /// Returns true if the record is flagged as an all-day event.
    pub fn is_all_day(&self) -> bool {
        self.all_day.unwrap_or(false)
    }

    /// Returns the URL only when it is present and non-empty.
    pub fn effective_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    /// Builder method to set the uuid.
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    /// Builder method to set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to set the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the url.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Builder method to set both timezones.
    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        let tz = tz.into();
        self.start_timezone = Some(tz.clone());
        self.end_timezone = Some(tz);
        self
    }

    /// Builder method to set the all-day flag.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = Some(all_day);
        self
    }
}
