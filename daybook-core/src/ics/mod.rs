//! iCalendar (RFC 5545) export and import.

mod generate;
mod parse;

pub use generate::{escape_text, serialize, serialize_at};
pub use parse::{parse_calendar, unescape_text};
