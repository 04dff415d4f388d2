//! The event a host invites people to.
//!
//! An `Event` is an immutable value: everything a recipient needs to show up
//! (what, where, when, who to contact). It travels inside a link, so nothing
//! here refers to storage of any kind.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event invitation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub address: String,
    pub date_time: DateTime<Utc>,
    pub host_name: Option<String>,
    pub host_contact: Option<String>,
    pub event_type: Option<EventType>,
    pub additional_notes: Option<String>,
    /// Latitude and longitude are independently optional; nothing pairs them.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// What kind of gathering this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "Open House")]
    OpenHouse,
    #[serde(rename = "Appointment")]
    Appointment,
    #[serde(rename = "Property Showing")]
    Showing,
    #[serde(rename = "Reservation")]
    Reservation,
    #[serde(rename = "Meeting")]
    Meeting,
    #[serde(rename = "Event")]
    Other,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::OpenHouse,
        EventType::Appointment,
        EventType::Showing,
        EventType::Reservation,
        EventType::Meeting,
        EventType::Other,
    ];

    /// Name used on the wire (link query parameters)
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::OpenHouse => "Open House",
            EventType::Appointment => "Appointment",
            EventType::Showing => "Property Showing",
            EventType::Reservation => "Reservation",
            EventType::Meeting => "Meeting",
            EventType::Other => "Event",
        }
    }

    /// Parse a wire name, ignoring ASCII case. Unknown names yield `None`.
    pub fn from_wire(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blank strings mean "not provided".
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Event {
    /// Create an event with a fresh random id.
    ///
    /// `title` and `address` must not be blank: the link decoder rejects an
    /// event without them.
    pub fn new(title: impl Into<String>, address: impl Into<String>, date_time: DateTime<Utc>) -> Self {
        let title = title.into();
        let address = address.into();
        debug_assert!(!title.trim().is_empty(), "event title must not be blank");
        debug_assert!(!address.trim().is_empty(), "event address must not be blank");

        Event {
            id: Uuid::new_v4(),
            title,
            address,
            date_time,
            host_name: None,
            host_contact: None,
            event_type: None,
            additional_notes: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_host_name(mut self, host_name: Option<String>) -> Self {
        self.host_name = non_blank(host_name);
        self
    }

    pub fn with_host_contact(mut self, host_contact: Option<String>) -> Self {
        self.host_contact = non_blank(host_contact);
        self
    }

    pub fn with_event_type(mut self, event_type: Option<EventType>) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.additional_notes = non_blank(notes);
        self
    }

    pub fn with_coordinates(mut self, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.date_time > now
    }

    /// Both coordinates, when the event carries a full pair.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Human-readable countdown (e.g. "Tomorrow", "In 3 hours").
    pub fn time_until(&self, now: DateTime<Utc>) -> String {
        let seconds = (self.date_time - now).num_seconds();
        if seconds < 0 {
            return "Event has passed".to_string();
        }

        let hours = seconds / 3600;
        let days = hours / 24;

        if days > 0 {
            if days == 1 {
                "Tomorrow".to_string()
            } else {
                format!("In {} days", days)
            }
        } else if hours > 0 {
            format!("In {} hour{}", hours, if hours == 1 { "" } else { "s" })
        } else {
            let minutes = seconds / 60;
            format!("In {} minute{}", minutes, if minutes == 1 { "" } else { "s" })
        }
    }

    /// Start time in the given zone (e.g. "3:00 PM")
    pub fn formatted_time(&self, tz: &Tz) -> String {
        self.date_time.with_timezone(tz).format("%-I:%M %p").to_string()
    }

    /// Full date in the given zone (e.g. "Thursday, March 20, 2025")
    pub fn formatted_date(&self, tz: &Tz) -> String {
        self.date_time.with_timezone(tz).format("%A, %B %-d, %Y").to_string()
    }

    /// Date and time in the given zone (e.g. "Mar 20, 2025 at 3:00 PM")
    pub fn formatted_date_time(&self, tz: &Tz) -> String {
        self.date_time
            .with_timezone(tz)
            .format("%b %-d, %Y at %-I:%M %p")
            .to_string()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
