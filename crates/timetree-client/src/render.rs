//! Terminal rendering of events and calendars.

use chrono::{DateTime, Utc};
use timetree_core::{EventTime, NormalizedEvent};
use timetree_providers::CalendarInfo;

/// One line describing `event`, in the event's own timezone.
///
/// ```text
/// Wed 2025-02-05 10:00-11:00  Standup @ Room 4
/// Thu 2025-02-06 all day      Holiday
/// ```
pub fn event_line(event: &NormalizedEvent) -> String {
    let mut line = format!("{:<27} {}", when(event), title(event));
    if !event.location.is_empty() {
        line.push_str(" @ ");
        line.push_str(&event.location);
    }
    line
}

/// The next event with how far away it is from `now`.
pub fn next_line(event: &NormalizedEvent, now: DateTime<Utc>) -> String {
    format!("{} ({})", event_line(event), relative(event, now))
}

/// Lines for a list of calendars.
pub fn calendar_lines(calendars: &[CalendarInfo]) -> Vec<String> {
    calendars
        .iter()
        .map(|calendar| format!("{:>10}  {}", calendar.id, calendar.name))
        .collect()
}

fn title(event: &NormalizedEvent) -> &str {
    if event.summary.is_empty() {
        "(untitled)"
    } else {
        &event.summary
    }
}

fn when(event: &NormalizedEvent) -> String {
    match (&event.start, &event.end) {
        (EventTime::AllDay(start), EventTime::AllDay(end)) if end > start => format!(
            "{}-{} all day",
            start.format("%a %Y-%m-%d"),
            end.format("%m-%d")
        ),
        (EventTime::AllDay(start), _) => format!("{} all day", start.format("%a %Y-%m-%d")),
        (EventTime::DateTime(start), end) => {
            let end = match end {
                EventTime::DateTime(end) if end.date_naive() == start.date_naive() => {
                    end.format("%H:%M").to_string()
                }
                EventTime::DateTime(end) => end.format("%m-%d %H:%M").to_string(),
                EventTime::AllDay(end) => end.format("%m-%d").to_string(),
            };
            format!("{}-{}", start.format("%a %Y-%m-%d %H:%M"), end)
        }
    }
}

/// How far `event` is from `now`: `in 1h 05m`, `now`, `today`.
pub fn relative(event: &NormalizedEvent, now: DateTime<Utc>) -> String {
    if event.is_ongoing_at(now) {
        return if event.is_all_day() {
            "today".to_string()
        } else {
            "now".to_string()
        };
    }

    let minutes = (event.start.to_utc_datetime() - now).num_minutes().max(0);
    match (minutes / (24 * 60), (minutes / 60) % 24, minutes % 60) {
        (0, 0, m) => format!("in {}m", m),
        (0, h, m) => format!("in {}h {:02}m", h, m),
        (d, h, _) => format!("in {}d {}h", d, h),
    }
}
