//! The normalized calendar event handed to the host application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{EventTime, TimeWindow};

/// A normalized calendar event.
///
/// Built from a TimeTree record by the providers crate. Field values are
/// passed through from the server: an end before the start, or an empty
/// summary, are kept as they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Server-side event identifier, when the record carries one.
    pub uid: Option<String>,
    /// The event title.
    pub summary: String,
    /// The event note.
    pub description: String,
    /// The event location.
    pub location: String,
    /// When the event starts.
    pub start: EventTime,
    /// When the event ends.
    pub end: EventTime,
    /// Link attached to the event. Absent rather than empty when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// IANA name of the timezone the start moment was computed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_timezone: Option<String>,
}

impl NormalizedEvent {
    /// Creates an event with empty text fields.
    pub fn new(summary: impl Into<String>, start: EventTime, end: EventTime) -> Self {
        Self {
            uid: None,
            summary: summary.into(),
            description: String::new(),
            location: String::new(),
            start,
            end,
            url: None,
            source_timezone: None,
        }
    }

    /// Returns true if this is an all-day event.
    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    /// Returns true if the event has not finished at `now`.
    ///
    /// All-day events last until the end of their final day.
    pub fn is_upcoming_at(&self, now: DateTime<Utc>) -> bool {
        self.end.to_utc_end() >= now
    }

    /// Checks if the event is currently ongoing at the given time.
    pub fn is_ongoing_at(&self, now: DateTime<Utc>) -> bool {
        self.start.to_utc_datetime() <= now && now <= self.end.to_utc_end()
    }

    /// Returns true if the event touches `window`.
    pub fn overlaps(&self, window: &TimeWindow) -> bool {
        window.overlaps_event(&self.start, &self.end)
    }

    /// Returns the duration of the event in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end.to_utc_datetime() - self.start.to_utc_datetime()).num_minutes()
    }

    /// Builder method to set the uid.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the url.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Builder method to set the source timezone.
    pub fn with_source_timezone(mut self, tz: impl Into<String>) -> Self {
        self.source_timezone = Some(tz.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn meeting() -> NormalizedEvent {
        NormalizedEvent::new(
            "Standup",
            EventTime::from_moment(utc(2025, 2, 5, 10, 0)),
            EventTime::from_moment(utc(2025, 2, 5, 10, 30)),
        )
    }

    #[test]
    fn new_event_has_empty_text_fields() {
        let event = meeting();
        assert_eq!(event.summary, "Standup");
        assert!(event.uid.is_none());
        assert!(event.description.is_empty());
        assert!(event.location.is_empty());
        assert!(event.url.is_none());
        assert!(!event.is_all_day());
        assert_eq!(event.duration_minutes(), 30);
    }

    #[test]
    fn builder_sets_fields() {
        let event = meeting()
            .with_uid("abc")
            .with_description("daily")
            .with_location("Room 1")
            .with_url("https://example.com")
            .with_source_timezone("Asia/Tokyo");

        assert_eq!(event.uid.as_deref(), Some("abc"));
        assert_eq!(event.description, "daily");
        assert_eq!(event.location, "Room 1");
        assert_eq!(event.url.as_deref(), Some("https://example.com"));
        assert_eq!(event.source_timezone.as_deref(), Some("Asia/Tokyo"));
    }

    #[test]
    fn upcoming_and_ongoing() {
        let event = meeting();
        assert!(event.is_upcoming_at(utc(2025, 2, 5, 9, 0)));
        assert!(event.is_upcoming_at(utc(2025, 2, 5, 10, 30)));
        assert!(!event.is_upcoming_at(utc(2025, 2, 5, 10, 31)));

        assert!(!event.is_ongoing_at(utc(2025, 2, 5, 9, 59)));
        assert!(event.is_ongoing_at(utc(2025, 2, 5, 10, 15)));
    }

    #[test]
    fn all_day_event_is_upcoming_until_end_of_day() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 5).unwrap();
        let event = NormalizedEvent::new(
            "Holiday",
            EventTime::from_date(day),
            EventTime::from_date(day),
        );
        assert!(event.is_all_day());
        assert!(event.is_upcoming_at(utc(2025, 2, 5, 23, 0)));
        assert!(!event.is_upcoming_at(utc(2025, 2, 6, 0, 0)));
    }

    #[test]
    fn url_is_omitted_from_json_when_absent() {
        let json = serde_json::to_value(meeting()).unwrap();
        assert!(json.get("url").is_none());

        let json = serde_json::to_value(meeting().with_url("")).unwrap();
        assert_eq!(json.get("url").and_then(|v| v.as_str()), Some(""));
    }
}
