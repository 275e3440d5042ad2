//! CalendarProvider trait, TimeTree session client and event normalization.
//!
//! - [`CalendarProvider`] - The trait the polling side consumes
//! - [`RawEvent`] - A TimeTree event record as returned by the sync endpoint
//! - [`normalize_event`] - Conversion to [`timetree_core::NormalizedEvent`]
//! - [`ProviderError`] - Error types for provider operations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │   TimeTree web API   │
//! └──────────┬───────────┘
//!            │ cookie session
//!            ▼
//! ┌──────────────────────┐
//! │   TimeTreeClient     │  sign-in, calendars, chunked sync
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │  TimeTreeProvider    │  CalendarProvider
//! └──────────┬───────────┘
//!            │ RawEvent
//!            ▼ normalize_event()
//! ┌──────────────────────┐
//! │   NormalizedEvent    │
//! └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use timetree_providers::{CalendarProvider, normalize_events};
//! use timetree_providers::timetree::{Credentials, TimeTreeConfig, TimeTreeProvider};
//!
//! let provider = TimeTreeProvider::new(
//!     TimeTreeConfig::default(),
//!     Credentials::new("me@example.com", "hunter2"),
//! )?;
//! provider.authenticate().await?;
//! let result = provider.fetch_events(calendar_id).await?;
//! let events = normalize_events(&result.events);
//! ```

pub mod error;
pub mod normalize;
pub mod provider;
pub mod raw_event;
pub mod timetree;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use normalize::{normalize_event, normalize_events};
pub use provider::{
    BoxFuture, CalendarInfo, CalendarProvider, ErrorProvider, FetchResult, ProviderStatus,
};
pub use raw_event::RawEvent;
