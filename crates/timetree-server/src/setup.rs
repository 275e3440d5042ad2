//! Connection setup: credential validation and calendar selection.
//!
//! Setup runs in two steps. [`validate_credentials`] signs in and lists the
//! active calendars; [`select_calendar`] turns the user's choice into a
//! [`ConnectionEntry`]. Every failure maps to a distinct [`SetupError`] with
//! a stable code the host can show.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use timetree_providers::{CalendarInfo, CalendarProvider, ProviderError, ProviderErrorCode};
use tracing::{debug, info, warn};

/// Setup outcomes other than success.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("invalid email or password")]
    InvalidAuth,

    #[error("cannot connect to TimeTree")]
    CannotConnect,

    #[error("no active calendars found")]
    NoCalendars,

    #[error("calendar {0} not found")]
    CalendarNotFound(i64),

    #[error("calendar {0} is already configured")]
    AlreadyConfigured(String),

    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl SetupError {
    /// Returns the stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAuth => "authentication_failed",
            Self::CannotConnect => "cannot_connect",
            Self::NoCalendars => "no_calendars",
            Self::CalendarNotFound(_) => "calendar_not_found",
            Self::AlreadyConfigured(_) => "already_configured",
            Self::Unknown(_) => "unknown_error",
        }
    }
}

impl From<ProviderError> for SetupError {
    fn from(e: ProviderError) -> Self {
        match e.code() {
            ProviderErrorCode::AuthenticationFailed => Self::InvalidAuth,
            ProviderErrorCode::NetworkError
            | ProviderErrorCode::ServerError
            | ProviderErrorCode::SessionExpired
            | ProviderErrorCode::InvalidResponse => Self::CannotConnect,
            _ => Self::Unknown(e.to_string()),
        }
    }
}

/// Polling interval choices offered during setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum UpdateInterval {
    FiveMinutes,
    FifteenMinutes,
    #[default]
    ThirtyMinutes,
    OneHour,
}

impl UpdateInterval {
    /// All choices, shortest first.
    pub const ALL: [UpdateInterval; 4] = [
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
    ];

    /// Looks up the choice for a number of minutes.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.minutes() == minutes)
    }

    pub fn minutes(self) -> u32 {
        match self {
            Self::FiveMinutes => 5,
            Self::FifteenMinutes => 15,
            Self::ThirtyMinutes => 30,
            Self::OneHour => 60,
        }
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.minutes()) * 60)
    }
}

impl fmt::Display for UpdateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneHour => write!(f, "1 hour"),
            other => write!(f, "{} minutes", other.minutes()),
        }
    }
}

impl TryFrom<u32> for UpdateInterval {
    type Error = String;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::from_minutes(minutes).ok_or_else(|| {
            format!("unsupported update interval {minutes}, expected one of 5, 15, 30, 60")
        })
    }
}

impl From<UpdateInterval> for u32 {
    fn from(interval: UpdateInterval) -> Self {
        interval.minutes()
    }
}

/// A configured calendar connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEntry {
    /// `<email>_<calendar id>`, unique per account and calendar.
    pub unique_id: String,
    /// `TimeTree: <calendar name>`.
    pub title: String,
    pub email: String,
    pub calendar_id: i64,
    pub calendar_name: String,
    #[serde(default)]
    pub update_interval: UpdateInterval,
}

impl ConnectionEntry {
    /// Builds the entry for `calendar` of the account `email`.
    pub fn new(email: impl Into<String>, calendar: &CalendarInfo, update_interval: UpdateInterval) -> Self {
        let email = email.into();
        Self {
            unique_id: unique_id(&email, calendar.id),
            title: format!("TimeTree: {}", calendar.name),
            email,
            calendar_id: calendar.id,
            calendar_name: calendar.name.clone(),
            update_interval,
        }
    }
}

/// Returns the identifier of a connection.
pub fn unique_id(email: &str, calendar_id: i64) -> String {
    format!("{email}_{calendar_id}")
}

/// Signs in and returns the active calendars of the account.
///
/// # Errors
///
/// - [`SetupError::InvalidAuth`] when the credentials are rejected
/// - [`SetupError::CannotConnect`] when the service is unreachable or
///   answers with an error
/// - [`SetupError::NoCalendars`] when the account has no active calendar
/// - [`SetupError::Unknown`] for anything else
pub async fn validate_credentials(
    provider: &dyn CalendarProvider,
) -> Result<Vec<CalendarInfo>, SetupError> {
    debug!(provider = provider.name(), "validating credentials");

    let calendars = async {
        provider.authenticate().await?;
        provider.list_calendars().await
    }
    .await
    .map_err(|e| {
        warn!(error = %e, "credential validation failed");
        SetupError::from(e)
    })?;

    if calendars.is_empty() {
        return Err(SetupError::NoCalendars);
    }

    info!(count = calendars.len(), "credentials valid");
    Ok(calendars)
}

/// Builds the connection entry for the chosen calendar.
///
/// `configured` holds the unique ids of the existing connections.
pub fn select_calendar(
    email: &str,
    calendars: &[CalendarInfo],
    calendar_id: i64,
    update_interval: UpdateInterval,
    configured: &[String],
) -> Result<ConnectionEntry, SetupError> {
    let calendar = calendars
        .iter()
        .find(|c| c.id == calendar_id)
        .ok_or(SetupError::CalendarNotFound(calendar_id))?;

    let entry = ConnectionEntry::new(email, calendar, update_interval);
    if configured.contains(&entry.unique_id) {
        return Err(SetupError::AlreadyConfigured(entry.unique_id));
    }

    info!(calendar_id, interval = %update_interval, "calendar selected");
    Ok(entry)
}
