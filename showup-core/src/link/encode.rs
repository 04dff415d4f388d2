//! Event -> query parameters.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::event::Event;

/// Wire form of a timestamp: UTC, whole seconds, `Z` suffix.
pub fn format_date_time(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Encode an event as canonical (short-form) query parameters.
///
/// Required fields are always present; optional ones only when set.
pub fn encode(event: &Event) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("id", event.id.to_string()),
        ("title", event.title.clone()),
        ("address", event.address.clone()),
        ("datetime", format_date_time(&event.date_time)),
    ];

    if let Some(ref host) = event.host_name {
        params.push(("host", host.clone()));
    }

    if let Some(ref contact) = event.host_contact {
        params.push(("contact", contact.clone()));
    }

    if let Some(event_type) = event.event_type {
        params.push(("type", event_type.as_str().to_string()));
    }

    if let Some(ref notes) = event.additional_notes {
        params.push(("notes", notes.clone()));
    }

    // f64 Display is the shortest string that parses back to the same value
    if let Some(lat) = event.latitude {
        params.push(("lat", lat.to_string()));
    }

    if let Some(lng) = event.longitude {
        params.push(("lng", lng.to_string()));
    }

    params
}
