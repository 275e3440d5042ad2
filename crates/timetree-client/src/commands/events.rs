//! One-shot event queries.

use chrono::Utc;
use timetree_core::TimeWindow;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::render;

/// Refreshes once and prints the events of the next `days` days.
pub async fn list(config: &ClientConfig, json: bool, days: Option<u32>) -> ClientResult<()> {
    let (coordinator, _) = super::coordinator(config)?;
    coordinator.refresh().await?;

    let window = TimeWindow::upcoming_days(Utc::now(), days.unwrap_or(config.display.days));
    let cache = coordinator.cache();
    let cache = cache.read().await;
    let events = cache.events_between(window.start, window.end);

    if !cache.is_complete() {
        warn!("only part of the calendar could be fetched");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else if events.is_empty() {
        println!("{}", config.display.no_event_text);
    } else {
        for event in events {
            println!("{}", render::event_line(event));
        }
    }

    Ok(())
}

/// Refreshes once and prints the next event.
pub async fn next(config: &ClientConfig, json: bool) -> ClientResult<()> {
    let (coordinator, _) = super::coordinator(config)?;
    coordinator.refresh().await?;

    let now = Utc::now();
    let snapshot = coordinator.snapshot(now).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    match snapshot.next_event {
        Some(ref event) => println!("{}", render::next_line(event, now)),
        None => println!("{}", config.display.no_event_text),
    }
    Ok(())
}
