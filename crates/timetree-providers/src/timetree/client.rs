//! HTTP session client for the TimeTree web API.
//!
//! The client owns at most one session token. It handles:
//! - Sign-in and session cookie capture
//! - The calendar listing
//! - The chunked event sync, drained with an explicit page loop

use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{CalendarInfo, FetchResult};

use super::PROVIDER_NAME;
use super::api::{CalendarsResponse, Continuation, SignInRequest, SyncResponse, decode_records};
use super::config::TimeTreeConfig;
use super::credentials::{Credentials, SessionToken};

/// Name of the client identification header (`X-Timetreea`).
const CLIENT_HEADER_NAME: HeaderName = HeaderName::from_static("x-timetreea");

/// Session client for one TimeTree account.
///
/// Methods that touch the session take `&mut self`; callers sharing a client
/// wrap it in a lock.
pub struct TimeTreeClient {
    http: Client,
    config: TimeTreeConfig,
    session: Option<SessionToken>,
}

impl TimeTreeClient {
    /// Creates an unauthenticated client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the client header value is not a
    /// valid header, or an internal error if the HTTP client cannot be built.
    pub fn new(config: TimeTreeConfig) -> ProviderResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client_header = HeaderValue::from_str(&config.client_header).map_err(|e| {
            ProviderError::configuration(format!("invalid client header value: {}", e))
        })?;
        headers.insert(CLIENT_HEADER_NAME, client_header);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http,
            config,
            session: None,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TimeTreeConfig {
        &self.config
    }

    /// Returns true once a sign-in succeeded and the server has not
    /// rejected the session since.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the current session token.
    pub fn session(&self) -> Option<&SessionToken> {
        self.session.as_ref()
    }

    /// Drops the current session.
    pub fn clear_session(&mut self) {
        self.session = None;
    }

    /// Signs in and stores the session token, replacing any previous one.
    ///
    /// A rejected sign-in drops the previous session. A transport failure
    /// leaves it in place.
    pub async fn authenticate(&mut self, credentials: &Credentials) -> ProviderResult<()> {
        let url = self.config.endpoint("/auth/email/signin");
        let body = SignInRequest::new(credentials.email(), credentials.password());

        debug!(url = %url, "signing in");

        let response = self
            .http
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("sign-in", e))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = %status, "sign-in rejected");
            self.session = None;
            return Err(auth_error("invalid credentials"));
        }

        let Some(token) = session_cookie(&response) else {
            self.session = None;
            return Err(auth_error("no session token received"));
        };

        self.session = Some(token);
        info!("signed in to TimeTree");
        Ok(())
    }

    /// Lists the active calendars of the account.
    ///
    /// Deactivated calendars are filtered out.
    pub async fn list_calendars(&mut self) -> ProviderResult<Vec<CalendarInfo>> {
        let url = self.config.endpoint("/calendars");
        let response: CalendarsResponse = self.get_json(&url, &[("since", 0)]).await?;

        let total = response.calendars.len();
        let calendars: Vec<CalendarInfo> = response
            .calendars
            .into_iter()
            .filter(|calendar| calendar.is_active())
            .map(CalendarInfo::from)
            .collect();

        info!(
            active = calendars.len(),
            deactivated = total - calendars.len(),
            "listed calendars"
        );
        Ok(calendars)
    }

    /// Fetches the raw events of a calendar, draining the chunked sync.
    ///
    /// The first page must succeed. Any failure on a continuation page ends
    /// the drain early and yields a partial result: transport errors, but
    /// also a rejected session, a non-200 status or an undecodable body.
    /// Needing more than `max_pages` pages fails with a pagination limit
    /// error. Records that do not decode are skipped, not fatal.
    pub async fn fetch_events(&mut self, calendar_id: i64) -> ProviderResult<FetchResult> {
        let first = self.sync_page(calendar_id, None).await?;
        let mut next = first.continuation();
        let mut events = decode_records(first.events);
        let mut pages = 1;

        loop {
            let since = match next {
                Continuation::Done => break,
                Continuation::Next(since) => since,
                Continuation::MissingCursor => {
                    warn!(
                        calendar_id,
                        pages, "sync announced more data without a cursor, keeping partial result"
                    );
                    return Ok(FetchResult::partial(events, pages));
                }
            };

            if pages >= self.config.max_pages {
                return Err(ProviderError::pagination_limit(format!(
                    "calendar {} needs more than {} sync pages",
                    calendar_id, self.config.max_pages
                ))
                .with_provider(PROVIDER_NAME));
            }

            match self.sync_page(calendar_id, Some(since)).await {
                Ok(page) => {
                    pages += 1;
                    next = page.continuation();
                    events.extend(decode_records(page.events));
                }
                Err(e) => {
                    warn!(
                        calendar_id,
                        since,
                        pages,
                        error = %e,
                        "continuation page failed, keeping partial result"
                    );
                    return Ok(FetchResult::partial(events, pages));
                }
            }
        }

        info!(calendar_id, count = events.len(), pages, "fetched events");
        Ok(FetchResult::with_events(events).with_pages(pages))
    }

    async fn sync_page(
        &mut self,
        calendar_id: i64,
        since: Option<i64>,
    ) -> ProviderResult<SyncResponse> {
        let url = self
            .config
            .endpoint(&format!("/calendar/{}/events/sync", calendar_id));

        debug!(calendar_id, ?since, "requesting sync page");

        match since {
            Some(since) => self.get_json(&url, &[("since", since)]).await,
            None => self.get_json(&url, &[]).await,
        }
    }

    /// Performs an authenticated GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &mut self,
        url: &str,
        query: &[(&str, i64)],
    ) -> ProviderResult<T> {
        let cookie = self
            .session
            .as_ref()
            .map(SessionToken::cookie_header)
            .ok_or_else(|| auth_error("not authenticated"))?;

        let mut request = self.http.get(url).header(COOKIE, cookie);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error("request", e))?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.session = None;
            return Err(ProviderError::session_expired(
                "session rejected by server, sign in again",
            )
            .with_provider(PROVIDER_NAME));
        }

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, body = %body, "unexpected response");
            return Err(
                ProviderError::server(format!("unexpected status {}", status))
                    .with_provider(PROVIDER_NAME),
            );
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error("response body", e))?;

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e))
                .with_provider(PROVIDER_NAME)
                .with_source(e)
        })
    }
}

impl std::fmt::Debug for TimeTreeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeTreeClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Extracts the session token from the sign-in response cookies.
fn session_cookie(response: &Response) -> Option<SessionToken> {
    response
        .cookies()
        .find(|c| c.name() == SessionToken::COOKIE_NAME && !c.value().is_empty())
        .map(|c| SessionToken::new(c.value()))
}

fn auth_error(message: &str) -> ProviderError {
    ProviderError::authentication(message).with_provider(PROVIDER_NAME)
}

fn transport_error(context: &str, e: reqwest::Error) -> ProviderError {
    let message = if e.is_timeout() {
        format!("{} timed out", context)
    } else if e.is_connect() {
        format!("{} failed to connect: {}", context, e)
    } else {
        format!("{} failed: {}", context, e)
    };
    ProviderError::network(message)
        .with_provider(PROVIDER_NAME)
        .with_source(e)
}
