//! Terminal rendering for daybook-core types.
//!
//! Extension traits that add colored output to core types using owo_colors.

use chrono::{Local, NaiveDate};
use daybook_core::date::format_display_time;
use daybook_core::{EventStatus, EventTime, Kind, TaskGroup, TodoStatus};
use owo_colors::OwoColorize;

/// Extension trait for colored one-line rendering.
pub trait Render {
    fn render(&self, use_24_hour: bool) -> String;
}

impl Render for daybook_core::Event {
    fn render(&self, use_24_hour: bool) -> String {
        let time = self
            .start()
            .map(|start| render_time(start, use_24_hour))
            .unwrap_or_default();

        let title = self.to_string();
        let title = match (self.status(), self.todo_status()) {
            (Some(EventStatus::Cancelled), _) | (_, Some(TodoStatus::Cancelled)) => {
                title.strikethrough().dimmed().to_string()
            }
            (_, Some(TodoStatus::Completed)) => title.dimmed().to_string(),
            (Some(EventStatus::Tentative), _) if self.kind() == Kind::Event => {
                title.italic().to_string()
            }
            _ => title,
        };

        let marker = match self.kind() {
            Kind::Event => "•".to_string(),
            Kind::Todo if self.is_completed() => "[x]".green().to_string(),
            Kind::Todo => "[ ]".to_string(),
        };

        let mut line = format!("{time:>8} {marker} {title}");
        if let Some(location) = self.location() {
            line.push_str(&format!(" {}", format!("@ {location}").dimmed()));
        }
        if let Some(category) = self.category() {
            line.push_str(&format!(" {}", format!("#{category}").cyan()));
        }
        line.push_str(&format!(" {}", self.id().dimmed()));
        line
    }
}

impl Render for TaskGroup {
    fn render(&self, _use_24_hour: bool) -> String {
        match self {
            TaskGroup::Due => self.label().yellow().bold().to_string(),
            TaskGroup::NoDueDate => self.label().bold().to_string(),
            TaskGroup::Completed => self.label().green().bold().to_string(),
        }
    }
}

/// Start time of an entry, or "all-day".
pub fn render_time(time: &EventTime, use_24_hour: bool) -> String {
    match time {
        EventTime::Date(_) => "all-day".to_string(),
        EventTime::DateTime(dt) => format_display_time(&dt.with_timezone(&Local), use_24_hour),
    }
}

/// Human-readable day label ("Today", "Tomorrow", "Wed Feb 25").
pub fn day_label(date: NaiveDate) -> String {
    let today = Local::now().date_naive();
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// Parse a `#rrggbb` color.
pub fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
