//! Date/time parsing and formatting helpers.
//!
//! All functions here are pure. Formatting of ICS values always uses UTC
//! fields with fixed-width zero padding.

use std::fmt::Display;

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{DaybookError, DaybookResult};
use crate::event::EventTime;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
const BASIC_DATE_FORMAT: &str = "%Y%m%d";
const BASIC_DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const UTC_DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Format a calendar date as a store key (`YYYY-MM-DD`).
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// The store key for an entity starting at `start` (its local calendar date).
pub fn date_key_for(start: &EventTime) -> String {
    date_key(start.local_date())
}

/// Parse a `YYYY-MM-DD` store key, rejecting anything malformed.
pub fn parse_date_key(key: &str) -> DaybookResult<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT)
        .map_err(|_| DaybookError::InvalidDateKey(key.to_string()))
}

/// Lenient `YYYY-MM-DD` parser kept for date keys already on disk.
///
/// Missing or unparsable month/day segments default to `1`, which silently
/// turns `"2025"` into January 1st. New input goes through [`parse_date_key`];
/// this variant logs whenever it has to guess. Returns `None` only when the
/// year is unusable or the resulting date does not exist.
pub fn parse_local_calendar_date(key: &str) -> Option<NaiveDate> {
    let mut parts = key.trim().split('-');
    let year: i32 = parts.next()?.parse().ok()?;

    let mut defaulted = false;
    let mut segment = |part: Option<&str>| {
        part.and_then(|p| p.parse::<u32>().ok()).unwrap_or_else(|| {
            defaulted = true;
            1
        })
    };
    let month = segment(parts.next());
    let day = segment(parts.next());

    if defaulted {
        tracing::warn!(key, "malformed date key, defaulting missing month/day to 1");
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// `YYYYMMDD` of the local calendar date, for sorting and showing due dates.
pub fn format_basic_date_local(time: &EventTime) -> String {
    time.local_date().format(BASIC_DATE_FORMAT).to_string()
}

/// `YYYYMMDD` from the UTC calendar fields.
pub fn format_basic_date_utc(time: &EventTime) -> String {
    time.utc_date().format(BASIC_DATE_FORMAT).to_string()
}

/// `YYYYMMDDTHHMMSSZ` for a UTC instant.
pub fn format_date_time_utc(dt: &DateTime<Utc>) -> String {
    dt.format(UTC_DATE_TIME_FORMAT).to_string()
}

/// Time-of-day for display, honoring the 12h/24h preference.
pub fn format_display_time<Tz>(dt: &DateTime<Tz>, use_24_hour: bool) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if use_24_hour {
        dt.format("%H:%M").to_string()
    } else {
        dt.format("%-I:%M %p").to_string()
    }
}

/// Resolve a wall-clock time in the local zone to a UTC instant.
pub fn local_to_utc(naive: NaiveDateTime) -> DaybookResult<DateTime<Utc>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(dt, _) => {
            tracing::warn!(?naive, "ambiguous local time, picking earliest");
            Ok(dt.with_timezone(&Utc))
        }
        LocalResult::None => Err(DaybookError::InvalidDateTime(naive.to_string())),
    }
}

/// Parse a start/end value typed into the form.
///
/// - `YYYYMMDD` or `YYYY-MM-DD` → all-day date
/// - `YYYYMMDDTHHMMSS` or `YYYY-MM-DDTHH:MM` → local wall-clock time
/// - `YYYYMMDDTHHMMSSZ` → UTC instant
pub fn parse_form_time(input: &str) -> DaybookResult<EventTime> {
    let s = input.trim();
    let invalid = || DaybookError::InvalidDateTime(input.to_string());

    if let Some(utc) = s.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, BASIC_DATE_TIME_FORMAT)
            .map_err(|_| invalid())?;
        return Ok(EventTime::DateTime(naive.and_utc()));
    }

    if s.contains('T') {
        let naive = NaiveDateTime::parse_from_str(s, BASIC_DATE_TIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
            .map_err(|_| invalid())?;
        return local_to_utc(naive).map(EventTime::DateTime);
    }

    NaiveDate::parse_from_str(s, BASIC_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(s, DATE_KEY_FORMAT))
        .map(EventTime::Date)
        .map_err(|_| invalid())
}

/// Inverse of [`parse_form_time`], used to pre-fill the form.
pub fn format_form_time(time: &EventTime) -> String {
    match time {
        EventTime::Date(d) => d.format(BASIC_DATE_FORMAT).to_string(),
        EventTime::DateTime(dt) => dt
            .with_timezone(&Local)
            .format(BASIC_DATE_TIME_FORMAT)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_key_is_zero_padded() {
        assert_eq!(date_key(ymd(2025, 3, 7)), "2025-03-07");
    }

    #[test]
    fn strict_date_key_rejects_malformed_input() {
        assert_eq!(parse_date_key("2025-01-10").unwrap(), ymd(2025, 1, 10));
        assert!(matches!(
            parse_date_key("2025-13-01"),
            Err(DaybookError::InvalidDateKey(_))
        ));
        assert!(parse_date_key("2025").is_err());
        assert!(parse_date_key("").is_err());
    }

    #[test]
    fn lenient_date_defaults_missing_segments_to_one() {
        assert_eq!(parse_local_calendar_date("2025-04-09"), Some(ymd(2025, 4, 9)));
        assert_eq!(parse_local_calendar_date("2025"), Some(ymd(2025, 1, 1)));
        assert_eq!(parse_local_calendar_date("2025-06"), Some(ymd(2025, 6, 1)));
        assert_eq!(parse_local_calendar_date("2025-xx-yy"), Some(ymd(2025, 1, 1)));
        assert_eq!(parse_local_calendar_date("year-01-01"), None);
        assert_eq!(parse_local_calendar_date("2025-02-30"), None);
    }

    #[test]
    fn local_basic_date_follows_the_wall_clock() {
        let late = local_to_utc(ymd(2025, 1, 15).and_hms_opt(23, 0, 0).unwrap()).unwrap();
        assert_eq!(format_basic_date_local(&EventTime::DateTime(late)), "20250115");
        assert_eq!(format_basic_date_local(&EventTime::Date(ymd(2025, 1, 15))), "20250115");
    }

    #[test]
    fn basic_date_formats() {
        assert_eq!(format_basic_date_utc(&EventTime::Date(ymd(2025, 1, 10))), "20250110");

        let dt = ymd(2025, 3, 5).and_hms_opt(23, 4, 5).unwrap().and_utc();
        assert_eq!(format_basic_date_utc(&EventTime::DateTime(dt)), "20250305");
        assert_eq!(format_date_time_utc(&dt), "20250305T230405Z");
    }

    #[test]
    fn display_time_honors_preference() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let dt = offset.with_ymd_and_hms(2025, 3, 20, 15, 5, 0).unwrap();

        assert_eq!(format_display_time(&dt, true), "15:05");
        assert_eq!(format_display_time(&dt, false), "3:05 PM");

        let morning = Utc.with_ymd_and_hms(2025, 3, 20, 0, 30, 0).unwrap();
        assert_eq!(format_display_time(&morning, false), "12:30 AM");
    }

    #[test]
    fn form_time_accepts_dates_and_utc_instants() {
        assert_eq!(parse_form_time("20250110").unwrap(), EventTime::Date(ymd(2025, 1, 10)));
        assert_eq!(parse_form_time("2025-01-10").unwrap(), EventTime::Date(ymd(2025, 1, 10)));

        let utc = parse_form_time("20251108T100000Z").unwrap();
        assert_eq!(
            utc,
            EventTime::DateTime(Utc.with_ymd_and_hms(2025, 11, 8, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn form_time_local_round_trips() {
        let parsed = parse_form_time("20251108T100000").unwrap();
        assert!(!parsed.is_all_day());
        assert_eq!(format_form_time(&parsed), "20251108T100000");
    }

    #[test]
    fn form_time_rejects_garbage() {
        for input in ["", "tomorrow", "2025110", "20251108T25"] {
            assert!(
                matches!(parse_form_time(input), Err(DaybookError::InvalidDateTime(_))),
                "{input:?} should be rejected"
            );
        }
    }
}
