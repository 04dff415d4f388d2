use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use showup_core::SchedulingError;
use showup_core::attendance::Attendance;
use showup_core::config::ShowUpConfig;

use crate::commands::{build_scheduler, parse_link};
use crate::render::Render;

pub async fn run(link: &str, config: ShowUpConfig) -> Result<()> {
    let event = parse_link(link)?;
    let tz = config.time_zone();
    let scheduler = build_scheduler(config)?;
    let now = Utc::now();

    let mut attendance = Attendance::new(event);
    let confirmation = attendance.confirm(&scheduler, now).await?;

    println!("{}", format!("  {}", attendance.status_message()).green());

    match confirmation.reminders {
        Ok(report) => {
            if report.scheduled_count() == 0 {
                println!("{}", "  The event is too close for any reminders".dimmed());
            }
            for reminder in scheduler.pending_for(&attendance.event).await {
                println!("    {}", reminder.render(&tz));
            }
            if !report.is_complete() {
                for (kind, error) in &report.failed {
                    eprintln!(
                        "  {}",
                        format!("Couldn't set the {} reminder: {}", kind.render(&tz), error).yellow()
                    );
                }
                eprintln!("{}", "  Run `showup confirm` again to retry".dimmed());
            }
        }
        Err(SchedulingError::PermissionDenied) => {
            println!(
                "{}",
                "  Couldn't schedule reminders, but you're confirmed!".yellow()
            );
            println!(
                "{}",
                "  Set reminders_allowed = true in your config to enable them".dimmed()
            );
        }
        Err(e) => {
            println!("{}", format!("  Couldn't schedule reminders: {}", e).yellow());
        }
    }

    Ok(())
}
