//! Day, week and month views over the event store.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};
use daybook_core::date::{date_key, parse_date_key};
use daybook_core::{DayMarkers, DaybookConfig, EventStore, KeyValueStore, Session};
use owo_colors::OwoColorize;

use crate::render::{Render, day_label, hex_rgb};

fn resolve_date(input: Option<&str>) -> Result<NaiveDate> {
    match input {
        Some(s) => Ok(parse_date_key(s)?),
        None => Ok(Local::now().date_naive()),
    }
}

fn print_day(store: &EventStore, date: NaiveDate, use_24_hour: bool) {
    println!("{}", format!("{} {}", day_label(date), date_key(date).dimmed()).bold());

    let entities = store.entities_for(&date_key(date));
    if entities.is_empty() {
        println!("  {}", "Nothing scheduled".dimmed());
        return;
    }
    for entity in entities {
        println!("  {}", entity.render(use_24_hour));
    }
}

pub fn day<S: KeyValueStore>(session: &Session<S>, date: Option<&str>) -> Result<()> {
    let date = resolve_date(date)?;
    print_day(session.store(), date, session.preferences().use_24_hour);
    Ok(())
}

/// The seven days (Monday first) of the week containing `date`.
pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (0..7).map(|i| monday + Duration::days(i)).collect()
}

pub fn week<S: KeyValueStore>(session: &Session<S>, date: Option<&str>) -> Result<()> {
    let date = resolve_date(date)?;
    let use_24_hour = session.preferences().use_24_hour;

    for (i, day) in week_days(date).into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_day(session.store(), day, use_24_hour);
    }
    Ok(())
}

/// First day of the month given as `YYYY-MM`, or of the current month.
pub fn resolve_month(input: Option<&str>) -> Result<NaiveDate> {
    match input {
        Some(s) => NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .with_context(|| format!("Invalid month '{s}'. Expected YYYY-MM")),
        None => {
            let today = Local::now().date_naive();
            Ok(today - Duration::days(i64::from(today.day0())))
        }
    }
}

fn days_in_month(first: NaiveDate) -> Vec<NaiveDate> {
    first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .collect()
}

/// One grid cell: the day number followed by its marker dots.
fn render_cell(date: NaiveDate, markers: Option<&DayMarkers>, width: usize) -> String {
    let number = format!("{:>2}", date.day());
    let Some(markers) = markers else {
        return format!("{number}{}", " ".repeat(width - 2));
    };

    let number = match markers.selected_color.and_then(hex_rgb) {
        Some((r, g, b)) if markers.selected => number.on_truecolor(r, g, b).to_string(),
        _ => number,
    };
    let dots: String = markers
        .dots
        .iter()
        .map(|dot| match hex_rgb(dot.color) {
            Some((r, g, b)) => "•".truecolor(r, g, b).to_string(),
            None => "•".to_string(),
        })
        .collect();
    let padding = " ".repeat(width - 2 - markers.dots.len());

    format!("{number}{dots}{padding}")
}

pub fn month<S: KeyValueStore>(
    session: &Session<S>,
    config: &DaybookConfig,
    month: Option<&str>,
    json: bool,
) -> Result<()> {
    let first = resolve_month(month)?;
    let today = date_key(Local::now().date_naive());
    let markers = session
        .store()
        .marker_summary(config.max_dots_per_day, Some(&today));

    if json {
        let prefix = first.format("%Y-%m-").to_string();
        let in_month: std::collections::BTreeMap<_, _> = markers
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .collect();
        println!("{}", serde_json::to_string_pretty(&in_month)?);
        return Ok(());
    }

    let width = 2 + config.max_dots_per_day + 1;
    println!("{}", first.format("%B %Y").to_string().bold());
    let header: String = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"]
        .iter()
        .map(|d| format!("{d:<width$}"))
        .collect();
    println!("{}", header.dimmed());

    let offset = first.weekday().num_days_from_monday() as usize;
    let mut line = " ".repeat(offset * width);
    for date in days_in_month(first) {
        line.push_str(&render_cell(date, markers.get(&date_key(date)), width));
        if date.weekday().num_days_from_monday() == 6 {
            println!("{}", line.trim_end());
            line.clear();
        }
    }
    if !line.trim().is_empty() {
        println!("{}", line.trim_end());
    }

    let count: usize = days_in_month(first)
        .iter()
        .map(|d| session.store().entities_for(&date_key(*d)).len())
        .sum();
    println!();
    println!("{}", format!("{count} entries this month").dimmed());

    Ok(())
}
