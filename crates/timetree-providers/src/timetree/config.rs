//! TimeTree client configuration.

use std::time::Duration;
use url::Url;

/// Configuration for the TimeTree session client.
#[derive(Debug, Clone)]
pub struct TimeTreeConfig {
    /// Base URL of the web API, without trailing slash semantics.
    pub base_url: Url,

    /// Value of the `X-Timetreea` client identification header.
    pub client_header: String,

    /// Timeout applied to every request, continuation pages included.
    pub timeout: Duration,

    /// Maximum number of sync pages drained per fetch.
    pub max_pages: usize,
}

impl TimeTreeConfig {
    /// Default base URL of the TimeTree web API.
    pub const DEFAULT_BASE_URL: &'static str = "https://timetreeapp.com/api/v1";

    /// Default client identification header value.
    pub const DEFAULT_CLIENT_HEADER: &'static str = "web/2.1.0/en";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Default page cap for the chunked sync.
    pub const DEFAULT_MAX_PAGES: usize = 100;

    /// Creates a configuration pointing at the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(base_url.as_ref())?;
        Ok(Self {
            base_url: parsed,
            client_header: Self::DEFAULT_CLIENT_HEADER.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            max_pages: Self::DEFAULT_MAX_PAGES,
        })
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the page cap. Values below one are raised to one.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Sets the client identification header value.
    pub fn with_client_header(mut self, value: impl Into<String>) -> Self {
        self.client_header = value.into();
        self
    }

    /// Builds the URL of an API path such as `/calendars`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for TimeTreeConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(Self::DEFAULT_BASE_URL).expect("default base URL is valid"),
            client_header: Self::DEFAULT_CLIENT_HEADER.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            max_pages: Self::DEFAULT_MAX_PAGES,
        }
    }
}
