//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use timetree_core::TracingOutputFormat;
use timetree_server::UpdateInterval;

/// timetree - Your TimeTree calendar from the terminal
#[derive(Debug, Parser)]
#[command(name = "timetree")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "TIMETREE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormat> for TracingOutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
            LogFormat::Json => Self::Json,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate an account and select the calendar to follow
    Setup {
        /// Account email
        #[arg(long, env = "TIMETREE_EMAIL")]
        email: String,

        /// Account password, or a `pass::`/`env::` reference to it
        #[arg(long, env = "TIMETREE_PASSWORD", hide_env_values = true)]
        password: String,

        /// Calendar to follow (required when the account has several)
        #[arg(long)]
        calendar_id: Option<i64>,

        /// Minutes between refreshes: 5, 15, 30 or 60
        #[arg(long, value_parser = parse_update_interval)]
        update_interval: Option<UpdateInterval>,

        /// Replace the configured connection even if it is the same calendar
        #[arg(long, short)]
        force: bool,
    },

    /// List the active calendars of the account
    Calendars {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show upcoming events
    Events {
        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Number of days ahead to list (1 to 3650)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=3650))]
        days: Option<u32>,
    },

    /// Show the next event (default)
    Next {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Keep polling at the configured interval until interrupted
    Watch,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

fn parse_update_interval(value: &str) -> Result<UpdateInterval, String> {
    let minutes: u32 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number of minutes", value))?;
    UpdateInterval::try_from(minutes)
}
