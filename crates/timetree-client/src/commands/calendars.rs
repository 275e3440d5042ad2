//! Calendars command.

use timetree_providers::CalendarProvider;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::render;

/// Lists the active calendars of the configured account.
pub async fn run(config: &ClientConfig, json: bool) -> ClientResult<()> {
    let provider = super::provider(config)?;
    provider.authenticate().await?;
    let calendars = provider.list_calendars().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&calendars)?);
    } else if calendars.is_empty() {
        println!("No active calendars.");
    } else {
        for line in render::calendar_lines(&calendars) {
            println!("{}", line);
        }
    }

    Ok(())
}
