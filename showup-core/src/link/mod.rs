//! Shareable event links.
//!
//! An event is carried entirely in a URL's query string, so a link (or a
//! notification holding one) is enough to rebuild the event with no lookup.

mod decode;
mod encode;

use url::Url;

use crate::error::{DecodeError, ShowUpError, ShowUpResult};
use crate::event::Event;

pub use decode::decode;
pub use encode::{encode, format_date_time};

/// Build a link to `event` on top of `base`, replacing any existing query.
pub fn to_url(base: &Url, event: &Event) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.query_pairs_mut().extend_pairs(encode(event));
    url
}

/// Rebuild the event carried by `url`'s query string.
pub fn from_url(url: &Url) -> Result<Event, DecodeError> {
    decode(url.query_pairs())
}

/// Parse a link string and rebuild its event.
pub fn parse_link(link: &str) -> ShowUpResult<Event> {
    let url = Url::parse(link.trim()).map_err(|e| ShowUpError::InvalidLink(e.to_string()))?;
    Ok(from_url(&url)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use chrono::{TimeZone, Utc};

    fn base() -> Url {
        Url::parse("https://imentos.github.io/ShowUpBooster/").unwrap()
    }

    #[test]
    fn url_roundtrip_survives_percent_encoding() {
        let event = Event::new(
            "Dinner & Drinks",
            "Bay Area Dental, 456 Market St #200",
            Utc.with_ymd_and_hms(2025, 3, 21, 1, 30, 0).unwrap(),
        )
        .with_host_name(Some("Dr. Michael Chen".to_string()))
        .with_host_contact(Some("+1 (555) 987-6543".to_string()))
        .with_event_type(Some(EventType::Appointment))
        .with_notes(Some("Parking = free? yes/no".to_string()));

        let url = to_url(&base(), &event);
        assert!(url.as_str().starts_with("https://imentos.github.io/ShowUpBooster/?"));

        let reparsed = parse_link(url.as_str()).expect("Should parse generated link");
        assert_eq!(reparsed, event);
    }

    #[test]
    fn to_url_replaces_existing_query() {
        let event = Event::new("Standup", "Room 4", Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap());
        let base = Url::parse("https://example.com/invite?title=Old&ref=qr").unwrap();

        let url = to_url(&base, &event);
        let titles: Vec<_> = url.query_pairs().filter(|(k, _)| k == "title").collect();

        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].1, "Standup");
        assert!(!url.query_pairs().any(|(k, _)| k == "ref"));
    }

    #[test]
    fn parse_link_reports_invalid_urls() {
        let err = parse_link("not a url").unwrap_err();
        assert!(matches!(err, ShowUpError::InvalidLink(_)));
    }

    #[test]
    fn parse_link_reports_missing_fields() {
        let err = parse_link("https://example.com/?address=Here&datetime=2025-03-20T15:00:00Z").unwrap_err();
        assert!(matches!(
            err,
            ShowUpError::Decode(DecodeError::MissingRequiredField("title"))
        ));
    }
}
