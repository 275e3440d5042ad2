//! TimeTree calendar provider.
//!
//! Talks to the private web API used by the TimeTree web app.
//!
//! # Features
//!
//! - Email/password sign-in with a `_session_id` cookie session
//! - Calendar listing, deactivated calendars filtered out
//! - Chunked event sync drained with a bounded page loop
//! - Partial results when a continuation page fails
//!
//! # Example
//!
//! ```ignore
//! use timetree_providers::timetree::{Credentials, TimeTreeConfig, TimeTreeProvider};
//!
//! let config = TimeTreeConfig::default().with_max_pages(50);
//! let provider = TimeTreeProvider::new(config, Credentials::new("me@example.com", "pw"))?;
//!
//! provider.authenticate().await?;
//! let calendars = provider.list_calendars().await?;
//! let result = provider.fetch_events(calendars[0].id).await?;
//! ```

mod api;
mod client;
mod config;
mod credentials;
mod provider;

pub use client::TimeTreeClient;
pub use config::TimeTreeConfig;
pub use credentials::{Credentials, SessionToken};
pub use provider::TimeTreeProvider;

/// Provider name used in errors and status.
pub const PROVIDER_NAME: &str = "timetree";
