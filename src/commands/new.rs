use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use clap::Args;
use dialoguer::Input;
use owo_colors::OwoColorize;
use showup_core::config::ShowUpConfig;
use showup_core::{Event, EventType, link};

use crate::render::render_event;

#[derive(Args)]
pub struct NewArgs {
    /// What the event is called
    #[arg(short, long)]
    title: Option<String>,

    /// Where it takes place
    #[arg(short, long)]
    address: Option<String>,

    /// When it starts (e.g. "2025-03-20T15:00:00Z", "tomorrow 3pm", "fri at 10:30")
    #[arg(long)]
    at: Option<String>,

    /// Host name
    #[arg(long)]
    host: Option<String>,

    /// How to reach the host (phone, email)
    #[arg(long)]
    contact: Option<String>,

    /// open-house, appointment, showing, reservation, meeting or other
    #[arg(long = "type", value_parser = parse_event_type)]
    event_type: Option<EventType>,

    /// Anything attendees should know
    #[arg(long)]
    notes: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,
}

pub fn run(args: NewArgs, config: &ShowUpConfig) -> Result<()> {
    let tz = config.time_zone();
    let interactive = args.title.is_none() || args.address.is_none() || args.at.is_none();

    let title = value_or_prompt(args.title, "  Title", required_text)?;
    let address = value_or_prompt(args.address, "  Where?", required_text)?;
    let date_time = value_or_prompt(args.at, "  When?", |input| parse_datetime(input, &tz))?;

    let now = Utc::now();
    if date_time <= now {
        anyhow::bail!("Event time {} is in the past", date_time.with_timezone(&tz));
    }

    let event = Event::new(title, address, date_time)
        .with_host_name(args.host)
        .with_host_contact(args.contact)
        .with_event_type(args.event_type)
        .with_notes(args.notes)
        .with_coordinates(args.lat, args.lng);

    let url = link::to_url(&config.link_base_url()?, &event);

    if interactive {
        eprintln!();
    }
    for line in render_event(&event, &tz, now) {
        eprintln!("{}", line);
    }
    eprintln!();
    eprintln!("{}", "  Share this link:".green());
    println!("{}", url);

    Ok(())
}

/// Parse a value given on the command line, or keep prompting until the
/// answer parses. A bad flag value is an error; a bad answer is asked again.
fn value_or_prompt<T>(
    given: Option<String>,
    prompt: &str,
    parse: impl Fn(&str) -> Result<T>,
) -> Result<T> {
    if let Some(value) = given {
        return parse(&value);
    }

    loop {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        match parse(&answer) {
            Ok(value) => return Ok(value),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}

/// Title and address end up as required link fields, so blanks are refused.
fn required_text(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        anyhow::bail!("This can't be empty");
    }
    Ok(trimmed.to_string())
}

/// Accept wire names ("Open House") as well as kebab-case ("open-house").
fn parse_event_type(input: &str) -> Result<EventType, String> {
    let kebab = match input.trim().to_lowercase().as_str() {
        "open-house" | "openhouse" => Some(EventType::OpenHouse),
        "appointment" => Some(EventType::Appointment),
        "showing" => Some(EventType::Showing),
        "reservation" => Some(EventType::Reservation),
        "meeting" => Some(EventType::Meeting),
        "other" => Some(EventType::Other),
        _ => None,
    };

    kebab
        .or_else(|| EventType::from_wire(input))
        .ok_or_else(|| {
            format!(
                "Unknown event type '{}'. Expected open-house, appointment, showing, reservation, meeting or other",
                input
            )
        })
}

const DAY_AND_MONTH_NAMES: [&str; 19] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Spell out shortened day and month names ("fri", "sept") for fuzzydate.
fn expand_short_names(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .map(|word| {
            let full = DAY_AND_MONTH_NAMES
                .iter()
                .copied()
                .find(|name| word.len() >= 3 && name.starts_with(word.as_str()));
            match full {
                Some(name) => name.to_string(),
                None => word,
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the input names a time of day: "3pm", "11 am", "15:30",
/// "at 10", "noon" or "midnight".
fn mentions_time_of_day(input: &str) -> bool {
    let words: Vec<String> = input.split_whitespace().map(str::to_lowercase).collect();

    words.iter().enumerate().any(|(i, word)| {
        let previous = i.checked_sub(1).map(|p| words[p].as_str());
        is_clock_word(word, previous)
    })
}

fn is_clock_word(word: &str, previous: Option<&str>) -> bool {
    if matches!(word, "noon" | "midnight") {
        return true;
    }

    let numeric = word.starts_with(|c: char| c.is_ascii_digit());
    if numeric && (word.ends_with("am") || word.ends_with("pm") || word.contains(':')) {
        return true;
    }

    match previous {
        Some(number) if matches!(word, "am" | "pm") => {
            !number.is_empty() && number.chars().all(|c| c.is_ascii_digit())
        }
        Some("at") => numeric,
        _ => false,
    }
}

/// Parse a start time: ISO-8601 first, then natural language read in `tz`.
///
/// An invitation needs a time of day; a bare date is refused rather than
/// silently meaning midnight.
fn parse_datetime(input: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if !mentions_time_of_day(input) {
        anyhow::bail!("Please include a time, e.g. \"{} at 3pm\"", input);
    }

    let naive = fuzzydate::parse(&expand_short_names(input))
        .map_err(|_| anyhow::anyhow!("Could not parse date/time: \"{}\"", input))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("\"{}\" doesn't exist in {}", input, tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    // --- mentions_time_of_day ---

    #[test]
    fn clock_times_are_recognized() {
        assert!(mentions_time_of_day("tomorrow 3pm"));
        assert!(mentions_time_of_day("friday 11 am"));
        assert!(mentions_time_of_day("march 20 15:30"));
        assert!(mentions_time_of_day("tomorrow noon"));
        assert!(mentions_time_of_day("friday at 10"));
    }

    #[test]
    fn dates_alone_have_no_time() {
        assert!(!mentions_time_of_day("tomorrow"));
        assert!(!mentions_time_of_day("next friday"));
        assert!(!mentions_time_of_day("2025-03-20"));
    }

    #[test]
    fn am_inside_words_is_not_a_time() {
        assert!(!mentions_time_of_day("amsterdam trip"));
        assert!(!mentions_time_of_day("spam"));
        assert!(!mentions_time_of_day("meet at am"));
    }

    // --- expand_short_names ---

    #[test]
    fn short_day_and_month_names_are_spelled_out() {
        assert_eq!(expand_short_names("Fri 3pm"), "friday 3pm");
        assert_eq!(expand_short_names("sept 5 at 10:00"), "september 5 at 10:00");
        assert_eq!(expand_short_names("thurs noon"), "thursday noon");
    }

    #[test]
    fn other_words_pass_through() {
        assert_eq!(expand_short_names("tomorrow at 5pm"), "tomorrow at 5pm");
    }

    // --- required_text ---

    #[test]
    fn required_text_trims_and_refuses_blanks() {
        assert_eq!(required_text("  123 Oak Street ").unwrap(), "123 Oak Street");
        assert!(required_text("   ").is_err());
    }

    // --- parse_datetime ---

    #[test]
    fn parse_datetime_rfc3339_normalizes_to_utc() {
        let dt = parse_datetime("2025-03-20T17:00:00+02:00", &Tz::UTC).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap());
    }

    #[test]
    fn parse_datetime_natural_language_uses_zone() {
        let tz: Tz = "Asia/Tokyo".parse().unwrap();
        let dt = parse_datetime("tomorrow 3pm", &tz).unwrap();
        let local = dt.with_timezone(&tz);

        assert_eq!(local.hour(), 15);
        assert_eq!(local.minute(), 0);
        assert!(local.year() >= 2025);
    }

    #[test]
    fn parse_datetime_requires_time() {
        let err = parse_datetime("tomorrow", &Tz::UTC).unwrap_err();
        assert!(err.to_string().contains("include a time"));
    }

    #[test]
    fn parse_datetime_invalid_input() {
        assert!(parse_datetime("not a date at all xyz 3pm", &Tz::UTC).is_err());
    }

    // --- parse_event_type ---

    #[test]
    fn event_type_accepts_kebab_and_wire_names() {
        assert_eq!(parse_event_type("open-house"), Ok(EventType::OpenHouse));
        assert_eq!(parse_event_type("Property Showing"), Ok(EventType::Showing));
        assert_eq!(parse_event_type("other"), Ok(EventType::Other));
        assert!(parse_event_type("party").is_err());
    }
}
