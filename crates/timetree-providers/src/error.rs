//! Error types for calendar provider operations.
//!
//! Every failure carries a [`ProviderErrorCode`]. Codes fall into two classes
//! that callers care about:
//!
//! - **auth**: the credentials were rejected, or a read was attempted without
//!   a session. Retrying without new credentials will not help.
//! - **connection**: the service was unreachable or answered with something
//!   unusable. The existing session stays valid (unless the server said it
//!   expired) and the next polling cycle may succeed.
//!
//! [`ProviderErrorCode::PaginationLimit`] belongs to neither class: it means
//! the server kept announcing more pages than the configured cap allows.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Credentials rejected, no session token received, or no session yet.
    AuthenticationFailed,
    /// Transport failure: timeout, DNS, refused connection, truncated body.
    NetworkError,
    /// The server answered an authenticated read with a non-success status.
    ServerError,
    /// The server rejected the session token; the client dropped it.
    SessionExpired,
    /// The response body could not be parsed or a record was unusable.
    InvalidResponse,
    /// The chunked sync announced more pages than the configured maximum.
    PaginationLimit,
    /// Configuration error, e.g. an unusable base URL.
    ConfigurationError,
    /// Internal provider error, e.g. the HTTP client could not be built.
    InternalError,
}

impl ProviderErrorCode {
    /// Returns true for failures that need new credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthenticationFailed)
    }

    /// Returns true if this error is transient and the next poll may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::ServerError | Self::SessionExpired | Self::InvalidResponse
        )
    }

    /// Returns a stable snake_case name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::NetworkError => "network_error",
            Self::ServerError => "server_error",
            Self::SessionExpired => "session_expired",
            Self::InvalidResponse => "invalid_response",
            Self::PaginationLimit => "pagination_limit",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to a calendar provider.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// The provider that generated this error (e.g. "timetree").
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    /// Creates a session expired error.
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::SessionExpired, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a pagination limit error.
    pub fn pagination_limit(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::PaginationLimit, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns true for failures that need new credentials.
    pub fn is_auth_error(&self) -> bool {
        self.code.is_auth_error()
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
