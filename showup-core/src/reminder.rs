//! Reminder kinds and the notification payloads built for them.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ShowUpResult;
use crate::event::Event;
use crate::link;

/// Notification category shared by all event reminders.
pub const REMINDER_CATEGORY: &str = "EVENT_REMINDER";

/// When, relative to the event start, a reminder fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReminderKind {
    DayBefore,
    #[serde(rename = "2-hours")]
    TwoHours,
    #[serde(rename = "30-minutes")]
    ThirtyMinutes,
}

impl ReminderKind {
    /// Every kind, in scheduling order (earliest fire time first).
    pub const ALL: [ReminderKind; 3] = [
        ReminderKind::DayBefore,
        ReminderKind::TwoHours,
        ReminderKind::ThirtyMinutes,
    ];

    pub fn lead_time(&self) -> Duration {
        match self {
            ReminderKind::DayBefore => Duration::seconds(86_400),
            ReminderKind::TwoHours => Duration::seconds(7_200),
            ReminderKind::ThirtyMinutes => Duration::seconds(1_800),
        }
    }

    /// Tag used as the last segment of a notification identifier
    pub fn tag(&self) -> &'static str {
        match self {
            ReminderKind::DayBefore => "day-before",
            ReminderKind::TwoHours => "2-hours",
            ReminderKind::ThirtyMinutes => "30-minutes",
        }
    }

    pub fn fire_time(&self, event: &Event) -> DateTime<Utc> {
        event.date_time - self.lead_time()
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Notification identifier: `<namespace>.<event-id>.<tag>`.
pub fn notification_id(namespace: &str, event_id: &Uuid, kind: ReminderKind) -> String {
    format!("{}.{}.{}", namespace, event_id, kind.tag())
}

/// All identifiers a single event can occupy.
pub fn notification_ids(namespace: &str, event_id: &Uuid) -> Vec<String> {
    ReminderKind::ALL
        .iter()
        .map(|kind| notification_id(namespace, event_id, *kind))
        .collect()
}

/// Title and body shown for a reminder. Times are printed in `tz`.
pub fn reminder_content(kind: ReminderKind, event: &Event, tz: &Tz) -> (String, String) {
    match kind {
        ReminderKind::DayBefore => (
            format!("Tomorrow: {}", event.title),
            format!(
                "Don't forget! Your event is tomorrow at {}",
                event.formatted_time(tz)
            ),
        ),
        ReminderKind::TwoHours => (
            format!("In 2 Hours: {}", event.title),
            format!(
                "Time to get ready! Your event starts at {} - {}",
                event.formatted_time(tz),
                event.address
            ),
        ),
        ReminderKind::ThirtyMinutes => (
            format!("Soon: {}", event.title),
            format!(
                "Heads up! Your event starts in 30 minutes at {}",
                event.address
            ),
        ),
    }
}

/// Metadata attached to a notification, enough to rebuild the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderUserInfo {
    pub event_id: String,
    pub event_title: String,
    pub event_location: String,
    pub event_time: String,
    #[serde(rename = "eventURL")]
    pub event_url: String,
}

/// What the dispatcher shows when the reminder fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    pub title: String,
    pub body: String,
    pub category: String,
    pub user_info: ReminderUserInfo,
}

impl ReminderPayload {
    pub fn new(kind: ReminderKind, event: &Event, link_base: &url::Url, tz: &Tz) -> Self {
        let (title, body) = reminder_content(kind, event, tz);
        ReminderPayload {
            title,
            body,
            category: REMINDER_CATEGORY.to_string(),
            user_info: ReminderUserInfo {
                event_id: event.id.to_string(),
                event_title: event.title.clone(),
                event_location: event.address.clone(),
                event_time: link::format_date_time(&event.date_time),
                event_url: link::to_url(link_base, event).to_string(),
            },
        }
    }

    /// Rebuild the event from the embedded link (what a tap on the
    /// notification opens).
    pub fn event(&self) -> ShowUpResult<Event> {
        link::parse_link(&self.user_info.event_url)
    }
}

/// A reminder handed to a dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledReminder {
    pub id: String,
    pub event_id: Uuid,
    pub kind: ReminderKind,
    pub fire_at: DateTime<Utc>,
    pub payload: ReminderPayload,
}
