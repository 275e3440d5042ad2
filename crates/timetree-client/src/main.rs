//! timetree CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use timetree_client::cli::{Cli, Command, ConfigAction};
use timetree_client::commands::setup::SetupArgs;
use timetree_client::config::ClientConfig;
use timetree_client::error::{ClientError, ClientResult};
use timetree_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing = if matches!(cli.command, Some(Command::Watch)) && !cli.debug {
        TracingConfig::poller()
    } else {
        TracingConfig::cli(cli.debug)
    };
    if let Err(e) = init_tracing(tracing.with_format(cli.log_format.into())) {
        eprintln!("warning: could not initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if config_path.exists() {
        ClientConfig::load_from(&config_path).map_err(ClientError::Config)?
    } else {
        ClientConfig::default()
    };

    match cli.command {
        Some(Command::Setup {
            email,
            password,
            calendar_id,
            update_interval,
            force,
        }) => {
            let args = SetupArgs {
                email,
                password,
                calendar_id,
                update_interval,
                force,
            };
            timetree_client::commands::setup::run(&config_path, &config, args).await
        }
        Some(Command::Calendars { json }) => {
            timetree_client::commands::calendars::run(&config, json).await
        }
        Some(Command::Events { json, days }) => {
            timetree_client::commands::events::list(&config, json, days).await
        }
        Some(Command::Next { json }) => timetree_client::commands::events::next(&config, json).await,
        Some(Command::Watch) => timetree_client::commands::watch::run(&config).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => timetree_client::commands::config::dump(&config_path, &config),
            ConfigAction::Validate => timetree_client::commands::config::validate(&config),
            ConfigAction::Path => timetree_client::commands::config::path(&config_path),
        },
        None => timetree_client::commands::events::next(&config, false).await,
    }
}
