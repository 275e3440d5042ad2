//! Watch command: poll in the foreground until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use timetree_server::{Scheduler, SchedulerConfig};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::render;

/// Runs the scheduler for the configured calendar.
///
/// Blocks until Ctrl-C is received.
pub async fn run(config: &ClientConfig) -> ClientResult<()> {
    let (coordinator, entry) = super::coordinator(config)?;
    let coordinator = Arc::new(coordinator);
    let no_event_text = config.display.no_event_text.clone();

    let scheduler = Scheduler::new(SchedulerConfig::from_interval(entry.update_interval));
    let handle = scheduler.handle();

    let sync_coordinator = coordinator.clone();
    let scheduler_task = tokio::spawn(async move {
        scheduler
            .run(move || {
                let coordinator = sync_coordinator.clone();
                let no_event_text = no_event_text.clone();
                async move {
                    let outcome = coordinator.refresh().await?;
                    let now = Utc::now();
                    let next = coordinator
                        .snapshot(now)
                        .await
                        .next_event
                        .map(|event| render::next_line(&event, now))
                        .unwrap_or(no_event_text);
                    info!(events = outcome.events, complete = outcome.complete, "{}", next);
                    Ok(())
                }
            })
            .await
    });

    println!(
        "Watching {} every {}. Press Ctrl-C to stop.",
        entry.title, entry.update_interval
    );

    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    if let Err(e) = handle.stop().await {
        warn!(error = %e, "Failed to send stop command to scheduler");
    }

    match tokio::time::timeout(Duration::from_secs(5), scheduler_task).await {
        Ok(Ok(result)) => result.map_err(ClientError::from),
        Ok(Err(e)) => Err(ClientError::Config(format!("scheduler task failed: {}", e))),
        Err(_) => {
            warn!("Scheduler did not stop in time");
            Ok(())
        }
    }
}
