//! Cache of the last successful refresh.
//!
//! Every successful refresh replaces the whole event list. A failed refresh
//! keeps the previous events and only flips `last_update_success`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use timetree_core::{NormalizedEvent, TimeWindow};
use tokio::sync::RwLock;
use tracing::debug;

/// Last known events of one calendar, sorted by start.
#[derive(Debug, Clone, Default)]
pub struct EventCache {
    events: Vec<NormalizedEvent>,
    /// When the events were last replaced.
    updated_at: Option<DateTime<Utc>>,
    last_update_success: bool,
    /// False when the last replacement came from a partial fetch.
    complete: bool,
    last_error: Option<String>,
}

impl EventCache {
    /// Creates an empty cache that has never been updated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached events.
    ///
    /// `events` must already be sorted by start.
    pub fn replace(&mut self, events: Vec<NormalizedEvent>, complete: bool) {
        debug!(
            previous = self.events.len(),
            count = events.len(),
            complete,
            "replacing cached events"
        );
        self.events = events;
        self.updated_at = Some(Utc::now());
        self.last_update_success = true;
        self.complete = complete;
        self.last_error = None;
    }

    /// Records a failed refresh, keeping the cached events.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.last_update_success = false;
        self.last_error = Some(error.into());
    }

    /// Returns the cached events.
    pub fn events(&self) -> &[NormalizedEvent] {
        &self.events
    }

    /// Returns the next event that has not ended at `now`.
    ///
    /// Ongoing events count; all-day events last until the end of their
    /// final day.
    pub fn next_event(&self, now: DateTime<Utc>) -> Option<&NormalizedEvent> {
        self.events.iter().find(|event| event.is_upcoming_at(now))
    }

    /// Returns the events overlapping `[start, end]`, sorted by start.
    pub fn events_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&NormalizedEvent> {
        let Some(window) = TimeWindow::new(start, end) else {
            return Vec::new();
        };
        self.events
            .iter()
            .filter(|event| event.overlaps(&window))
            .collect()
    }

    /// Returns true if the last refresh succeeded.
    pub fn last_update_success(&self) -> bool {
        self.last_update_success
    }

    /// Returns when the events were last replaced.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns false when the cached events came from a partial fetch.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Returns the error of the last failed refresh, if the last refresh failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns the number of cached events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events are cached.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Cache shared between the coordinator and readers.
pub type SharedCache = Arc<RwLock<EventCache>>;

/// Creates a new shared cache.
pub fn new_shared_cache() -> SharedCache {
    Arc::new(RwLock::new(EventCache::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use timetree_core::EventTime;

    fn utc(d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, d, h, min, 0).unwrap()
    }

    fn meeting(title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> NormalizedEvent {
        NormalizedEvent::new(title, EventTime::from_moment(start), EventTime::from_moment(end))
    }

    fn all_day(title: &str, d: u32) -> NormalizedEvent {
        let day = NaiveDate::from_ymd_opt(2025, 2, d).unwrap();
        NormalizedEvent::new(title, EventTime::from_date(day), EventTime::from_date(day))
    }

    fn sample() -> EventCache {
        let mut cache = EventCache::new();
        cache.replace(
            vec![
                all_day("holiday", 5),
                meeting("standup", utc(5, 9, 0), utc(5, 9, 15)),
                meeting("review", utc(5, 14, 0), utc(5, 15, 0)),
                meeting("retro", utc(6, 10, 0), utc(6, 11, 0)),
            ],
            true,
        );
        cache
    }

    #[test]
    fn new_cache_is_empty() {
        let cache = EventCache::new();
        assert!(cache.is_empty());
        assert!(cache.updated_at().is_none());
        assert!(!cache.last_update_success());
        assert!(cache.next_event(utc(5, 0, 0)).is_none());
    }

    #[test]
    fn replace_marks_success() {
        let cache = sample();
        assert_eq!(cache.event_count(), 4);
        assert!(cache.last_update_success());
        assert!(cache.is_complete());
        assert!(cache.updated_at().is_some());
    }

    #[test]
    fn failure_keeps_events() {
        let mut cache = sample();
        cache.record_failure("network_error: timed out");

        assert!(!cache.last_update_success());
        assert_eq!(cache.event_count(), 4);
        assert_eq!(cache.last_error(), Some("network_error: timed out"));

        cache.replace(vec![], false);
        assert!(cache.last_update_success());
        assert!(!cache.is_complete());
        assert!(cache.last_error().is_none());
    }

    mod next_event {
        use super::*;

        #[test]
        fn all_day_event_is_next_during_its_day() {
            let cache = sample();
            assert_eq!(cache.next_event(utc(5, 8, 0)).unwrap().summary, "holiday");
            assert_eq!(cache.next_event(utc(5, 20, 0)).unwrap().summary, "holiday");
        }

        #[test]
        fn ongoing_event_counts() {
            let mut cache = sample();
            cache.replace(cache.events()[1..].to_vec(), true);
            assert_eq!(cache.next_event(utc(5, 9, 10)).unwrap().summary, "standup");
            assert_eq!(cache.next_event(utc(5, 9, 16)).unwrap().summary, "review");
        }

        #[test]
        fn nothing_after_last_event() {
            let cache = sample();
            assert_eq!(cache.next_event(utc(6, 0, 0)).unwrap().summary, "retro");
            assert!(cache.next_event(utc(6, 12, 0)).is_none());
        }
    }

    mod events_between {
        use super::*;

        #[test]
        fn returns_overlapping_events_in_order() {
            let cache = sample();
            let titles: Vec<_> = cache
                .events_between(utc(5, 9, 10), utc(5, 14, 30))
                .iter()
                .map(|e| e.summary.as_str())
                .collect();
            assert_eq!(titles, ["holiday", "standup", "review"]);
        }

        #[test]
        fn boundaries_are_inclusive() {
            let cache = sample();
            let events = cache.events_between(utc(6, 11, 0), utc(6, 12, 0));
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].summary, "retro");
        }

        #[test]
        fn empty_range() {
            let cache = sample();
            assert!(cache.events_between(utc(7, 0, 0), utc(8, 0, 0)).is_empty());
            assert!(cache.events_between(utc(6, 0, 0), utc(5, 0, 0)).is_empty());
        }
    }

    #[tokio::test]
    async fn shared_cache() {
        let cache = new_shared_cache();
        cache.write().await.replace(vec![all_day("x", 1)], true);
        assert_eq!(cache.read().await.event_count(), 1);
    }
}
