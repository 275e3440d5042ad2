//! Core types: event times, moments, normalized events, tracing

pub mod event;
pub mod time;
pub mod tracing;

pub use event::NormalizedEvent;
pub use time::{EventTime, TimeWindow, resolve_timezone, to_moment};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
