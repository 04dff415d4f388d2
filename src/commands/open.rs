use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use showup_core::attendance::Attendance;
use showup_core::config::ShowUpConfig;

use crate::commands::{build_scheduler, parse_link};
use crate::render::{Render, render_event};

pub async fn run(link: &str, config: ShowUpConfig) -> Result<()> {
    let event = parse_link(link)?;
    let tz = config.time_zone();
    let now = Utc::now();

    for line in render_event(&event, &tz, now) {
        println!("{}", line);
    }

    // Only reads the store; the permission prompt is never reached
    let scheduler = build_scheduler(config)?;
    let reminders = scheduler.pending_for(&event).await;

    println!();
    if !reminders.is_empty() {
        println!("{}", "  You're confirmed! Reminders:".green());
        for reminder in &reminders {
            println!("    {}", reminder.render(&tz));
        }
    } else if Attendance::new(event).can_confirm(now) {
        println!("{}", "  Confirm with: showup confirm <link>".dimmed());
    } else {
        println!("{}", "  This event has already passed".red());
    }

    Ok(())
}
