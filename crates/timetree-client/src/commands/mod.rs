//! Subcommand implementations.

use std::sync::Arc;

use timetree_providers::timetree::TimeTreeProvider;
use timetree_server::{CalendarCoordinator, ConnectionEntry};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

pub mod calendars;
pub mod config;
pub mod events;
pub mod setup;
pub mod watch;

/// Builds the provider for the configured account.
pub(crate) fn provider(config: &ClientConfig) -> ClientResult<TimeTreeProvider> {
    let settings = config.timetree().map_err(ClientError::Config)?;
    settings.build_provider().map_err(ClientError::Config)
}

/// Builds the coordinator of the configured calendar.
pub(crate) fn coordinator(
    config: &ClientConfig,
) -> ClientResult<(CalendarCoordinator, ConnectionEntry)> {
    let settings = config.timetree().map_err(ClientError::Config)?;
    let entry = settings.connection().map_err(ClientError::Config)?;
    let provider = settings.build_provider().map_err(ClientError::Config)?;
    Ok((
        CalendarCoordinator::from_entry(Arc::new(provider), &entry),
        entry,
    ))
}
