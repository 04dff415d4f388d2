//! TUI rendering for showup types.
//!
//! Extension traits that add colored terminal rendering to showup-core
//! types using owo_colors.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use showup_core::reminder::ReminderKind;
use showup_core::{Event, ScheduledReminder};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self, tz: &Tz) -> String;
}

impl Render for ReminderKind {
    fn render(&self, _tz: &Tz) -> String {
        let label = match self {
            ReminderKind::DayBefore => "day before",
            ReminderKind::TwoHours => "2 hours before",
            ReminderKind::ThirtyMinutes => "30 minutes before",
        };
        label.cyan().to_string()
    }
}

impl Render for ScheduledReminder {
    fn render(&self, tz: &Tz) -> String {
        let when = self
            .fire_at
            .with_timezone(tz)
            .format("%a %b %-d %H:%M")
            .to_string();
        format!("{} {} {}", when.bold(), self.payload.title, format!("({})", self.kind.render(tz)).dimmed())
    }
}

/// Multi-line description of an event, as shown when a link is opened.
pub fn render_event(event: &Event, tz: &Tz, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = Vec::new();

    let heading = match event.event_type {
        Some(event_type) => format!("{} {}", event.title.bold(), format!("[{}]", event_type).dimmed()),
        None => event.title.bold().to_string(),
    };
    lines.push(heading);

    let countdown = event.time_until(now);
    let countdown = if event.is_upcoming(now) {
        countdown.green().to_string()
    } else {
        countdown.red().to_string()
    };
    lines.push(format!("  📅 {}", event.formatted_date(tz)));
    lines.push(format!("  🕒 {} ({})", event.formatted_time(tz), countdown));
    lines.push(format!("  📍 {}", event.address));

    if let Some((lat, lng)) = event.coordinates() {
        lines.push(format!("     {}", format!("{lat}, {lng}").dimmed()));
    }

    match (&event.host_name, &event.host_contact) {
        (Some(name), Some(contact)) => lines.push(format!("  👤 {} {}", name, contact.dimmed())),
        (Some(name), None) => lines.push(format!("  👤 {}", name)),
        (None, Some(contact)) => lines.push(format!("  👤 {}", contact)),
        (None, None) => {}
    }

    if let Some(ref notes) = event.additional_notes {
        lines.push(format!("  📝 {}", notes));
    }

    lines
}
