use anyhow::Result;
use owo_colors::OwoColorize;
use showup_core::config::ShowUpConfig;
use showup_core::dispatch::NotificationDispatcher;

use crate::commands::build_scheduler;
use crate::render::Render;

pub async fn run(config: ShowUpConfig) -> Result<()> {
    let tz = config.time_zone();
    let scheduler = build_scheduler(config)?;
    let reminders = scheduler.dispatcher().pending().await;

    if reminders.is_empty() {
        println!("{}", "No pending reminders".dimmed());
        return Ok(());
    }

    for reminder in &reminders {
        println!("{}", reminder.render(&tz));

        // Each reminder carries its event's link; show where it points.
        match reminder.payload.event() {
            Ok(event) => println!(
                "    {}",
                format!("{} · {}", event.formatted_date_time(&tz), event.address).dimmed()
            ),
            Err(e) => println!("    {}", format!("Unreadable event link: {}", e).red()),
        }
    }

    Ok(())
}
