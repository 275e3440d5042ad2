//! RawEvent to NormalizedEvent conversion.
//!
//! The conversion:
//! 1. Resolves the start and end timezones (UTC when absent or unknown)
//! 2. Converts the millisecond timestamps to moments in those timezones
//! 3. Collapses all-day events to their local calendar dates
//! 4. Maps the text fields, keeping the URL only when it is non-empty

use chrono::DateTime;
use chrono_tz::Tz;
use timetree_core::{EventTime, NormalizedEvent, resolve_timezone, to_moment};
use tracing::warn;

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::RawEvent;

/// Converts a [`RawEvent`] to a [`NormalizedEvent`].
///
/// The conversion is pure. An end before the start and empty titles are
/// passed through untouched.
///
/// # Errors
///
/// Returns [`ProviderError::invalid_response`] when `start_at` or `end_at` is
/// missing or outside the representable date range.
pub fn normalize_event(raw: &RawEvent) -> ProviderResult<NormalizedEvent> {
    let start_tz = resolve_timezone(raw.start_timezone.as_deref());
    let end_tz = resolve_timezone(raw.end_timezone.as_deref());

    let start = moment(raw, "start_at", raw.start_at, &start_tz)?;
    let end = moment(raw, "end_at", raw.end_at, &end_tz)?;

    let (start, end) = if raw.is_all_day() {
        (
            EventTime::from_date(start.date_naive()),
            EventTime::from_date(end.date_naive()),
        )
    } else {
        (EventTime::from_moment(start), EventTime::from_moment(end))
    };

    let mut event = NormalizedEvent::new(raw.title.clone().unwrap_or_default(), start, end)
        .with_description(raw.note.clone().unwrap_or_default())
        .with_location(raw.location.clone().unwrap_or_default())
        .with_source_timezone(start_tz.name());

    if let Some(ref uuid) = raw.uuid {
        event = event.with_uid(uuid);
    }

    if let Some(url) = raw.effective_url() {
        event = event.with_url(url);
    }

    Ok(event)
}

/// Normalizes a batch of records, sorted by start time.
///
/// Records that cannot be converted are logged and skipped. The sort is
/// stable, so events starting at the same moment keep their arrival order.
pub fn normalize_events(raws: &[RawEvent]) -> Vec<NormalizedEvent> {
    let mut events: Vec<NormalizedEvent> = raws
        .iter()
        .filter_map(|raw| match normalize_event(raw) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(uid = ?raw.uuid, error = %e, "skipping event");
                None
            }
        })
        .collect();

    events.sort_by(|a, b| a.start.cmp(&b.start));
    events
}

fn moment(
    raw: &RawEvent,
    field: &str,
    millis: Option<i64>,
    tz: &Tz,
) -> ProviderResult<DateTime<Tz>> {
    let millis = millis.ok_or_else(|| {
        ProviderError::invalid_response(format!(
            "event {} has no {}",
            raw.uuid.as_deref().unwrap_or("<no uuid>"),
            field
        ))
    })?;

    to_moment(millis, tz).ok_or_else(|| {
        ProviderError::invalid_response(format!("{} out of range: {}", field, millis))
    })
}
