//! ICS export.
//!
//! Output is built line by line and joined with CRLF; there is no trailing
//! line break after `END:VCALENDAR`.

use chrono::{DateTime, Utc};

use crate::constants::{PRODUCT_ID, UID_DOMAIN_SUFFIX};
use crate::date::{format_basic_date_utc, format_date_time_utc};
use crate::event::{Event, EventTime};

const CRLF: &str = "\r\n";

/// Serialize entities into a `VCALENDAR`, stamped with the current time.
pub fn serialize<'a, I>(entities: I) -> String
where
    I: IntoIterator<Item = &'a Event>,
{
    serialize_at(entities, Utc::now())
}

/// Serialize entities using `dtstamp` as the shared `DTSTAMP` of every block.
///
/// Entities missing a start or end are skipped.
pub fn serialize_at<'a, I>(entities: I, dtstamp: DateTime<Utc>) -> String
where
    I: IntoIterator<Item = &'a Event>,
{
    let stamp = format_date_time_utc(&dtstamp);

    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".into(),
        "VERSION:2.0".into(),
        format!("PRODID:{PRODUCT_ID}"),
        "CALSCALE:GREGORIAN".into(),
        "METHOD:PUBLISH".into(),
    ];

    for event in entities {
        let (Some(start), Some(end)) = (event.start(), event.end()) else {
            continue;
        };
        let all_day = event.is_all_day();

        lines.push("BEGIN:VEVENT".into());
        lines.push(format!("UID:{}{}", event.id(), UID_DOMAIN_SUFFIX));
        lines.push(format!("DTSTAMP:{stamp}"));
        lines.push(time_line("DTSTART", start, all_day));
        lines.push(time_line("DTEND", end, all_day));
        lines.push(format!("SUMMARY:{}", summary(event)));
        lines.push("END:VEVENT".into());
    }

    lines.push("END:VCALENDAR".into());
    lines.join(CRLF)
}

fn summary(event: &Event) -> String {
    if event.title().trim().is_empty() {
        "Event".to_string()
    } else {
        escape_text(event.title())
    }
}

fn time_line(name: &str, time: &EventTime, all_day: bool) -> String {
    if all_day {
        return format!("{name};VALUE=DATE:{}", format_basic_date_utc(time));
    }
    match time {
        EventTime::DateTime(dt) => format!("{name}:{}", format_date_time_utc(dt)),
        // A date inside a timed entity: midnight UTC of that day
        EventTime::Date(d) => format!("{name}:{}T000000Z", d.format("%Y%m%d")),
    }
}

/// Escape a TEXT value. Backslash goes first so later escapes are not doubled.
pub fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace(['\n', '\r'], "\\n")
}
