//! Setup command: validate an account and save the chosen calendar.

use std::path::Path;

use tracing::info;

use timetree_server::{SetupError, UpdateInterval, select_calendar, validate_credentials};

use crate::config::{ClientConfig, save_connection};
use crate::error::{ClientError, ClientResult};
use crate::render;

/// Arguments of `timetree setup`.
#[derive(Debug, Clone)]
pub struct SetupArgs {
    pub email: String,
    /// Password as written to the config, possibly a secret reference.
    pub password: String,
    pub calendar_id: Option<i64>,
    pub update_interval: Option<UpdateInterval>,
    pub force: bool,
}

/// Runs the setup flow and writes the connection to `config_path`.
///
/// Settings already in the file (`base_url`, `timeout_secs`, ...) are used
/// to reach the service and kept.
pub async fn run(config_path: &Path, config: &ClientConfig, args: SetupArgs) -> ClientResult<()> {
    let mut settings = config.timetree.clone().unwrap_or_default();
    let previous = settings.configured_id();
    settings.email = Some(args.email.clone());
    settings.password = Some(args.password.clone());

    let provider = settings.build_provider().map_err(ClientError::Config)?;

    println!("Signing in to TimeTree as {}...", args.email);
    let calendars = validate_credentials(&provider)
        .await
        .inspect_err(|e| eprintln!("{}", hint(e)))?;

    let calendar_id = match (args.calendar_id, calendars.as_slice()) {
        (Some(id), _) => id,
        (None, [only]) => only.id,
        (None, _) => {
            println!("Found {} calendars:", calendars.len());
            for line in render::calendar_lines(&calendars) {
                println!("{}", line);
            }
            return Err(ClientError::Config(
                "several calendars found; choose one with --calendar-id".to_string(),
            ));
        }
    };

    let configured: Vec<String> = if args.force {
        Vec::new()
    } else {
        previous.into_iter().collect()
    };

    let entry = select_calendar(
        &args.email,
        &calendars,
        calendar_id,
        args.update_interval.unwrap_or(settings.update_interval),
        &configured,
    )
    .inspect_err(|e| eprintln!("{}", hint(e)))?;

    save_connection(config_path, &entry, &args.password).map_err(ClientError::Config)?;

    info!(unique_id = %entry.unique_id, "connection saved");
    println!(
        "{} (every {}) saved to {}",
        entry.title,
        entry.update_interval,
        config_path.display()
    );
    Ok(())
}

/// What the user can do about a setup failure.
fn hint(err: &SetupError) -> &'static str {
    match err {
        SetupError::InvalidAuth => "Check the email and password of your TimeTree account.",
        SetupError::CannotConnect => {
            "Could not reach TimeTree. Check your network connection and try again."
        }
        SetupError::NoCalendars => "This account has no active calendar.",
        SetupError::CalendarNotFound(_) => {
            "Run `timetree calendars` to list the calendar ids of this account."
        }
        SetupError::AlreadyConfigured(_) => {
            "This calendar is already set up; pass --force to save it again."
        }
        SetupError::Unknown(_) => "Unexpected error; rerun with --debug for details.",
    }
}
