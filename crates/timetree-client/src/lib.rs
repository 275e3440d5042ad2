//! CLI host: setup flow, calendar listing, event queries and polling.
//!
//! This crate provides the `timetree` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
