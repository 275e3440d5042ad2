//! Polling orchestrator: coordinator, cache, scheduler, setup flow.
//!
//! This crate drives a [`CalendarProvider`] on behalf of a host:
//! - [`setup`] validates credentials and builds a [`ConnectionEntry`]
//! - [`CalendarCoordinator`] refreshes one calendar into an [`EventCache`]
//! - [`Scheduler`] repeats the refresh at the configured interval
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use timetree_providers::timetree::{Credentials, TimeTreeConfig, TimeTreeProvider};
//! use timetree_server::{CalendarCoordinator, Scheduler, SchedulerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = TimeTreeProvider::new(
//!         TimeTreeConfig::default(),
//!         Credentials::new("me@example.com", "hunter2"),
//!     )?;
//!     let coordinator = Arc::new(CalendarCoordinator::new(Arc::new(provider), 42, "Family"));
//!
//!     let scheduler = Scheduler::new(SchedulerConfig::default());
//!     scheduler
//!         .run(move || {
//!             let coordinator = coordinator.clone();
//!             async move { coordinator.refresh().await.map(|_| ()) }
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! [`CalendarProvider`]: timetree_providers::CalendarProvider

mod cache;
mod coordinator;
mod error;
mod scheduler;
pub mod setup;

#[cfg(test)]
mod testing;

pub use cache::{EventCache, SharedCache, new_shared_cache};
pub use coordinator::{CalendarCoordinator, CalendarSnapshot, RefreshError, RefreshOutcome};
pub use error::{ServerError, ServerResult};
pub use scheduler::{
    Scheduler, SchedulerCommand, SchedulerConfig, SchedulerHandle, SchedulerState,
    SharedSchedulerState, new_scheduler_state,
};
pub use setup::{
    ConnectionEntry, SetupError, UpdateInterval, select_calendar, unique_id, validate_credentials,
};
