use anyhow::Result;
use owo_colors::OwoColorize;
use showup_core::attendance::Attendance;
use showup_core::config::ShowUpConfig;

use crate::commands::{build_scheduler, parse_link};

pub async fn run(link: &str, config: ShowUpConfig) -> Result<()> {
    let event = parse_link(link)?;
    let scheduler = build_scheduler(config)?;

    let mut attendance = Attendance::new(event);
    attendance.decline(&scheduler).await;

    println!(
        "{} {}",
        format!("  {}:", attendance.status_message()).red(),
        attendance.event.title
    );

    Ok(())
}
