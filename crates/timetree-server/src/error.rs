//! Server error types.

use thiserror::Error;
use timetree_providers::ProviderError;

use crate::coordinator::RefreshError;
use crate::setup::SetupError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the polling side.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Provider construction or call failed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A refresh failed.
    #[error("Refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    /// The setup flow ended with an error.
    #[error("Setup failed: {0}")]
    Setup(#[from] SetupError),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
