//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/timetree/config.toml` by default:
//!
//! ```toml
//! [timetree]
//! email = "me@example.com"
//! password = "pass::web/timetree"
//! calendar_id = 42
//! calendar_name = "Family"
//! update_interval = 30
//! ```
//!
//! The `password` supports secret references (see [`crate::secret`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use timetree_providers::CalendarInfo;
use timetree_providers::timetree::{Credentials, TimeTreeConfig, TimeTreeProvider};
use timetree_server::{ConnectionEntry, UpdateInterval, unique_id};

/// Name used when the config has an id but no calendar name.
const UNNAMED_CALENDAR: &str = "Unnamed Calendar";

/// Configuration for the timetree client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// TimeTree account and calendar.
    pub timetree: Option<TimeTreeSettings>,

    /// Debug mode.
    pub debug: bool,

    /// Display settings.
    #[serde(default)]
    pub display: DisplaySettings,
}

/// Display settings for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Days ahead listed by `timetree events`.
    pub days: u32,

    /// Text to show when there is no upcoming event.
    pub no_event_text: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            days: 7,
            no_event_text: "No upcoming event".to_string(),
        }
    }
}

/// The `[timetree]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeTreeSettings {
    pub email: Option<String>,

    /// Account password (supports `pass::` and `env::` prefixes).
    pub password: Option<String>,

    pub calendar_id: Option<i64>,

    pub calendar_name: Option<String>,

    /// Minutes between refreshes: 5, 15, 30 or 60.
    #[serde(default)]
    pub update_interval: UpdateInterval,

    /// API base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Maximum sync pages per refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,
}

impl TimeTreeSettings {
    /// Resolves the account credentials, expanding secret references.
    pub fn resolve_credentials(&self) -> Result<Credentials, String> {
        let email = self.email.as_deref().ok_or_else(|| {
            format!(
                "TimeTree account not configured. Run: timetree setup --email <EMAIL> --password <PASSWORD>\n  \
                 or add to {}:\n  \
                 [timetree]\n  \
                 email = \"me@example.com\"\n  \
                 password = \"env::TIMETREE_PASSWORD\"",
                ClientConfig::default_path().display()
            )
        })?;

        let raw_password = self
            .password
            .as_deref()
            .ok_or_else(|| "password is missing from [timetree] section in config.toml".to_string())?;

        let password = crate::secret::resolve(raw_password)
            .map_err(|e| format!("failed to resolve password: {}", e))?;

        Ok(Credentials::new(email, password))
    }

    /// Builds the session client configuration.
    pub fn to_provider_config(&self) -> Result<TimeTreeConfig, String> {
        let mut config = match self.base_url {
            Some(ref url) => {
                TimeTreeConfig::new(url).map_err(|e| format!("invalid base_url `{}`: {}", url, e))?
            }
            None => TimeTreeConfig::default(),
        };

        if let Some(secs) = self.timeout_secs {
            if secs == 0 {
                return Err("timeout_secs must be positive".to_string());
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }

        if let Some(max_pages) = self.max_pages {
            config = config.with_max_pages(max_pages);
        }

        Ok(config)
    }

    /// Builds a provider for the configured account.
    pub fn build_provider(&self) -> Result<TimeTreeProvider, String> {
        let credentials = self.resolve_credentials()?;
        TimeTreeProvider::new(self.to_provider_config()?, credentials).map_err(|e| e.to_string())
    }

    /// Returns the configured connection.
    pub fn connection(&self) -> Result<ConnectionEntry, String> {
        let email = self
            .email
            .as_deref()
            .ok_or_else(|| "email is missing from [timetree] section in config.toml".to_string())?;
        let calendar_id = self.calendar_id.ok_or_else(|| {
            "no calendar selected. Run: timetree setup --calendar-id <ID>".to_string()
        })?;
        let name = self.calendar_name.as_deref().unwrap_or(UNNAMED_CALENDAR);

        Ok(ConnectionEntry::new(
            email,
            &CalendarInfo::new(calendar_id, name),
            self.update_interval,
        ))
    }

    /// Returns the unique id of the configured connection, if complete.
    pub fn configured_id(&self) -> Option<String> {
        Some(unique_id(self.email.as_deref()?, self.calendar_id?))
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the `[timetree]` section.
    pub fn timetree(&self) -> Result<&TimeTreeSettings, String> {
        self.timetree.as_ref().ok_or_else(|| {
            "no [timetree] section in config.toml; run `timetree setup` first".to_string()
        })
    }

    /// Returns a copy safe to print, with a plain-text password masked.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(ref mut timetree) = config.timetree {
            timetree.password = timetree
                .password
                .as_deref()
                .map(crate::secret::display_value);
        }
        config
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("timetree")
    }
}

/// Writes a connection into the `[timetree]` section of `path`.
///
/// Keys and comments the user added are kept.
pub fn save_connection(path: &Path, entry: &ConnectionEntry, password: &str) -> Result<(), String> {
    let content = if path.exists() {
        std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| format!("could not parse {} for writing: {}", path.display(), e))?;

    if !doc.contains_key("timetree") {
        doc["timetree"] = toml_edit::Item::Table(toml_edit::Table::new());
    }

    let table = doc["timetree"]
        .as_table_mut()
        .ok_or_else(|| "`timetree` in config.toml is not a table".to_string())?;
    table["email"] = toml_edit::value(entry.email.as_str());
    table["password"] = toml_edit::value(password);
    table["calendar_id"] = toml_edit::value(entry.calendar_id);
    table["calendar_name"] = toml_edit::value(entry.calendar_name.as_str());
    table["update_interval"] = toml_edit::value(i64::from(entry.update_interval.minutes()));

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("could not create {}: {}", parent.display(), e))?;
    }

    std::fs::write(path, doc.to_string())
        .map_err(|e| format!("could not write {}: {}", path.display(), e))
}
