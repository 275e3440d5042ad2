//! Time types for calendar events.
//!
//! This module provides [`EventTime`] for representing event start/end times
//! (either a timezone-aware moment or an all-day date), [`TimeWindow`] for
//! range queries, and the epoch conversion helpers used when normalizing
//! TimeTree records.
//!
//! TimeTree stores timestamps as signed milliseconds since the Unix epoch,
//! together with an IANA timezone name per endpoint.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Converts a millisecond epoch timestamp into a moment in `tz`.
///
/// The millisecond value is floored to whole seconds. Pre-epoch values are
/// computed as the epoch moment plus a signed second offset instead of going
/// through a direct timestamp conversion.
///
/// Returns `None` when the value is outside the representable range.
pub fn to_moment<Z: TimeZone>(timestamp_millis: i64, tz: &Z) -> Option<DateTime<Z>> {
    let seconds = timestamp_millis.div_euclid(1000);

    if seconds >= 0 {
        return DateTime::from_timestamp(seconds, 0).map(|dt| dt.with_timezone(tz));
    }

    let epoch = DateTime::from_timestamp(0, 0)?.with_timezone(tz);
    epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

/// Resolves an IANA timezone name, falling back to UTC.
///
/// Missing, blank and unknown names all resolve to UTC.
pub fn resolve_timezone(name: Option<&str>) -> Tz {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Tz::UTC;
    };

    name.parse::<Tz>().unwrap_or_else(|_| {
        debug!(timezone = %name, "unknown timezone, using UTC");
        Tz::UTC
    })
}

/// Represents the time of a calendar event.
///
/// - **DateTime**: a specific moment, keeping the offset of its source timezone
/// - **AllDay**: a calendar date without time of day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A timezone-aware moment.
    DateTime(DateTime<FixedOffset>),
    /// An all-day event date.
    AllDay(NaiveDate),
}

impl EventTime {
    /// Creates an `EventTime::DateTime` from a moment in any timezone.
    pub fn from_moment<Z: TimeZone>(dt: DateTime<Z>) -> Self {
        Self::DateTime(dt.fixed_offset())
    }

    /// Creates an `EventTime::AllDay` from a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Returns `true` if this is an all-day event time.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Returns `true` if this is a specific moment.
    pub fn is_datetime(&self) -> bool {
        matches!(self, Self::DateTime(_))
    }

    /// Returns the moment if this is a `DateTime` variant.
    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            Self::AllDay(_) => None,
        }
    }

    /// Returns the date if this is an `AllDay` variant.
    pub fn as_date(&self) -> Option<&NaiveDate> {
        match self {
            Self::AllDay(d) => Some(d),
            Self::DateTime(_) => None,
        }
    }

    /// Returns the calendar date, local to the moment's own offset.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DateTime(dt) => dt.date_naive(),
            Self::AllDay(date) => *date,
        }
    }

    /// Converts to UTC for comparisons.
    ///
    /// All-day dates map to midnight UTC.
    pub fn to_utc_datetime(&self) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => dt.with_timezone(&Utc),
            Self::AllDay(date) => date.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    /// Converts to UTC when used as the end of a range.
    ///
    /// All-day dates cover the whole day, so they map to the last instant of
    /// that day.
    pub fn to_utc_end(&self) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => dt.with_timezone(&Utc),
            Self::AllDay(date) => date
                .and_hms_micro_opt(23, 59, 59, 999_999)
                .map(|dt| dt.and_utc())
                .unwrap_or_else(|| self.to_utc_datetime()),
        }
    }
}

impl PartialOrd for EventTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_utc_datetime().cmp(&other.to_utc_datetime())
    }
}

/// A time window for range queries.
///
/// Both bounds are inclusive, matching how the host queries events for a
/// visible range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window.
    pub start: DateTime<Utc>,
    /// End of the window.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window, or `None` if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Creates a window starting at `now` and spanning `days` days.
    ///
    /// The end saturates at the latest representable moment.
    pub fn upcoming_days(now: DateTime<Utc>, days: u32) -> Self {
        let end = TimeDelta::try_days(i64::from(days))
            .and_then(|span| now.checked_add_signed(span))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start: now, end }
    }

    /// Returns the length of the window.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Checks whether an event spanning `start..end` touches the window.
    pub fn overlaps_event(&self, start: &EventTime, end: &EventTime) -> bool {
        end.to_utc_end() >= self.start && start.to_utc_datetime() <= self.end
    }
}
