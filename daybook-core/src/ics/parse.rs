//! ICS import using the icalendar crate's parser.

use chrono::Duration;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};

use crate::constants::DEFAULT_CREATOR;
use crate::date::local_to_utc;
use crate::error::{DaybookError, DaybookResult};
use crate::event::{Event, EventDetails, EventStatus, EventTime, Kind, TodoStatus};

/// Parse every `VEVENT` and `VTODO` in `content` into fresh entities.
///
/// Components without a usable `DTSTART` are skipped. A missing end becomes
/// start + 1 day (all-day) or start + 1 hour (timed).
pub fn parse_calendar(content: &str) -> DaybookResult<Vec<Event>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| DaybookError::IcsParse(e.to_string()))?;

    let events = calendar
        .components
        .iter()
        .flat_map(|c| {
            // Accept both a bare component list and a wrapping VCALENDAR
            if c.name == "VCALENDAR" {
                c.components.iter().collect::<Vec<_>>()
            } else {
                vec![c]
            }
        })
        .filter_map(|c| {
            let kind = match c.name.as_ref() {
                "VEVENT" => Kind::Event,
                "VTODO" => Kind::Todo,
                _ => return None,
            };
            let event = parse_component(kind, c);
            if event.is_none() {
                tracing::warn!(kind = %kind, "skipping component without a usable DTSTART");
            }
            event
        })
        .collect();

    Ok(events)
}

fn parse_component(kind: Kind, component: &Component) -> Option<Event> {
    let start = to_event_time(DatePerhapsTime::try_from(component.find_prop("DTSTART")?).ok()?)?;

    let end_prop = match kind {
        Kind::Event => component.find_prop("DTEND"),
        Kind::Todo => component.find_prop("DUE").or_else(|| component.find_prop("DTEND")),
    };
    let end = end_prop
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .and_then(to_event_time)
        .unwrap_or_else(|| default_end(&start));

    let text = |name: &str| {
        component
            .find_prop(name)
            .map(|p| unescape_text(p.val.as_ref()))
            .filter(|s| !s.trim().is_empty())
    };

    let title = text("SUMMARY").unwrap_or_default();
    let creator = component
        .find_prop("ORGANIZER")
        .map(attendee_name)
        .unwrap_or_else(|| DEFAULT_CREATOR.to_string());

    let raw_status = component.find_prop("STATUS").map(|p| p.val.to_string());
    let (status, todo_status) = match kind {
        Kind::Event => (raw_status.as_deref().and_then(EventStatus::from_ics_str), None),
        Kind::Todo => (None, raw_status.as_deref().and_then(TodoStatus::from_ics_str)),
    };

    let category = text("CATEGORIES").and_then(|c| {
        c.split(',')
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_lowercase)
    });

    let details = EventDetails {
        description: text("DESCRIPTION"),
        location: text("LOCATION"),
        category,
        status,
        todo_status,
        priority: component
            .find_prop("PRIORITY")
            .and_then(|p| p.val.as_ref().trim().parse().ok())
            .unwrap_or(0),
        recurrence_rule: component.find_prop("RRULE").map(|p| p.val.to_string()),
        attendees: component
            .properties
            .iter()
            .filter(|p| p.name == "ATTENDEE")
            .map(attendee_name)
            .collect(),
    };

    Some(Event::create(kind, start, end, title, creator, details))
}

/// Map a parsed value onto our two flavours. `TZID` values are read as
/// local wall-clock time.
fn to_event_time(dpt: DatePerhapsTime) -> Option<EventTime> {
    match dpt {
        DatePerhapsTime::Date(d) => Some(EventTime::Date(d)),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => Some(EventTime::DateTime(dt)),
            CalendarDateTime::Floating(naive) => local_to_utc(naive).ok().map(EventTime::DateTime),
            CalendarDateTime::WithTimezone { date_time, tzid } => {
                tracing::debug!(%tzid, "treating zoned time as local");
                local_to_utc(date_time).ok().map(EventTime::DateTime)
            }
        },
    }
}

fn default_end(start: &EventTime) -> EventTime {
    match start {
        EventTime::Date(d) => EventTime::Date(*d + Duration::days(1)),
        EventTime::DateTime(dt) => EventTime::DateTime(*dt + Duration::hours(1)),
    }
}

/// ATTENDEE/ORGANIZER: prefer the CN parameter, else the address.
fn attendee_name(prop: &Property) -> String {
    prop.params
        .iter()
        .find(|p| p.key == "CN")
        .and_then(|p| p.val.as_ref().map(|v| v.to_string()))
        .unwrap_or_else(|| {
            let val = prop.val.as_ref();
            val.strip_prefix("mailto:").unwrap_or(val).to_string()
        })
}

/// Reverse of [`super::escape_text`].
pub fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
