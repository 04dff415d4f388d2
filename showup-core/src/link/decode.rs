//! Query parameters -> Event.
//!
//! Links have been produced with two naming schemes over time (e.g. `host`
//! and `hostName`). Each field lists its accepted keys in priority order and
//! the first one carrying a usable value wins.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::error::DecodeError;
use crate::event::{Event, EventType};
use crate::link::encode::encode;

const ID_KEYS: &[&str] = &["id", "eventId"];
const TITLE_KEYS: &[&str] = &["title"];
const ADDRESS_KEYS: &[&str] = &["address", "location"];
const DATE_TIME_KEYS: &[&str] = &["dateTime", "datetime"];
const HOST_NAME_KEYS: &[&str] = &["hostName", "host"];
const HOST_CONTACT_KEYS: &[&str] = &["hostContact", "contact"];
const EVENT_TYPE_KEYS: &[&str] = &["eventType", "type"];
const NOTES_KEYS: &[&str] = &["additionalNotes", "notes"];
const LATITUDE_KEYS: &[&str] = &["latitude", "lat"];
const LONGITUDE_KEYS: &[&str] = &["longitude", "lng", "lon"];

/// Query parameters with repeated keys resolved to their first occurrence.
struct Params(Vec<(String, String)>);

impl Params {
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    /// First candidate key with a non-empty value.
    fn first(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// First candidate key whose value parses; unparseable values are skipped.
    fn first_parsed<T>(&self, keys: &[&str], parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        keys.iter().filter_map(|key| self.get(key)).find_map(parse)
    }
}

/// Decode an event from query parameters.
pub fn decode<I, K, V>(query: I) -> Result<Event, DecodeError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let params = Params(
        query
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect(),
    );

    // Required fields
    let title = params
        .first(TITLE_KEYS)
        .ok_or(DecodeError::MissingRequiredField("title"))?;
    let address = params
        .first(ADDRESS_KEYS)
        .ok_or(DecodeError::MissingRequiredField("address"))?;
    let raw_date_time = params
        .first(DATE_TIME_KEYS)
        .ok_or(DecodeError::MissingRequiredField("datetime"))?;
    let date_time = parse_date_time(raw_date_time)
        .ok_or_else(|| DecodeError::MalformedDateTime(raw_date_time.to_string()))?;

    // Optional fields
    let host_name = params.first(HOST_NAME_KEYS).map(str::to_string);
    let host_contact = params.first(HOST_CONTACT_KEYS).map(str::to_string);
    let event_type = params.first(EVENT_TYPE_KEYS).and_then(EventType::from_wire);
    let notes = params.first(NOTES_KEYS).map(str::to_string);
    let latitude = params.first_parsed(LATITUDE_KEYS, parse_coordinate);
    let longitude = params.first_parsed(LONGITUDE_KEYS, parse_coordinate);

    let event = Event::new(title, address, date_time)
        .with_id(Uuid::nil())
        .with_host_name(host_name)
        .with_host_contact(host_contact)
        .with_event_type(event_type)
        .with_notes(notes)
        .with_coordinates(latitude, longitude);

    let id = params
        .first_parsed(ID_KEYS, |v| Uuid::parse_str(v.trim()).ok())
        .unwrap_or_else(|| derive_id(&event));

    Ok(event.with_id(id))
}

/// Stable id for links that don't carry one, so the same link always maps
/// to the same event (and the same reminder identifiers).
fn derive_id(event: &Event) -> Uuid {
    let canonical = encode(event)
        .into_iter()
        .filter(|(k, _)| *k != "id")
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    Uuid::new_v5(&Uuid::NAMESPACE_URL, canonical.as_bytes())
}

/// Parse an ISO-8601 timestamp, normalized to UTC with whole seconds.
///
/// Accepts RFC 3339, `+HHMM` offsets, and offset-less times (read as UTC).
fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    parse_date_time_strict(value)
        // An unescaped `+` in a query string arrives as a space
        .or_else(|| parse_date_time_strict(&value.replace(' ', "+")))
        .map(|dt| dt.trunc_subsecs(0))
}

fn parse_date_time_strict(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_coordinate(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
