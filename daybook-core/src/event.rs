//! Calendar event/task records.
//!
//! An [`Event`] is either a scheduled event (`VEVENT`) or an actionable task
//! (`VTODO`). Fields are private: every setter stamps `last_modified`, so the
//! record can only change through methods that keep that stamp honest.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Whether an entity is a scheduled event or a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "VEVENT")]
    Event,
    #[serde(rename = "VTODO")]
    Todo,
}

impl Kind {
    pub fn as_ics_str(&self) -> &'static str {
        match self {
            Kind::Event => "VEVENT",
            Kind::Todo => "VTODO",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ics_str())
    }
}

/// Status of a `VEVENT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    #[serde(rename = "CONFIRMED")]
    Confirmed,
    #[serde(rename = "CANCELLED")]
    Cancelled,
    #[serde(rename = "TENTATIVE")]
    Tentative,
}

impl EventStatus {
    pub fn as_ics_str(&self) -> &'static str {
        match self {
            EventStatus::Confirmed => "CONFIRMED",
            EventStatus::Cancelled => "CANCELLED",
            EventStatus::Tentative => "TENTATIVE",
        }
    }

    pub fn from_ics_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CONFIRMED" => Some(EventStatus::Confirmed),
            "CANCELLED" => Some(EventStatus::Cancelled),
            "TENTATIVE" => Some(EventStatus::Tentative),
            _ => None,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ics_str())
    }
}

/// Status of a `VTODO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoStatus {
    #[serde(rename = "NEEDS-ACTION")]
    NeedsAction,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "IN-PROCESS")]
    InProcess,
    #[serde(rename = "CANCELLED")]
    Cancelled,
}

impl TodoStatus {
    pub fn as_ics_str(&self) -> &'static str {
        match self {
            TodoStatus::NeedsAction => "NEEDS-ACTION",
            TodoStatus::Completed => "COMPLETED",
            TodoStatus::InProcess => "IN-PROCESS",
            TodoStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_ics_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEEDS-ACTION" => Some(TodoStatus::NeedsAction),
            "COMPLETED" => Some(TodoStatus::Completed),
            "IN-PROCESS" => Some(TodoStatus::InProcess),
            "CANCELLED" => Some(TodoStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ics_str())
    }
}

/// A start or end value: a whole calendar day, or a UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl EventTime {
    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// The local calendar date this value falls on.
    pub fn local_date(&self) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::DateTime(dt) => dt.with_timezone(&Local).date_naive(),
        }
    }

    /// The UTC calendar date (used for ICS all-day values).
    pub fn utc_date(&self) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::DateTime(dt) => dt.date_naive(),
        }
    }
}

/// Priority values outside 0..=9 mean "no preference".
pub fn normalize_priority(priority: i64) -> u8 {
    if (0..=9).contains(&priority) {
        priority as u8
    } else {
        0
    }
}

fn deserialize_priority<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(normalize_priority(raw))
}

/// Split comma-separated attendee input, trimming and dropping empties.
pub fn parse_attendees(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Optional fields accepted by [`Event::create`].
#[derive(Debug, Clone, Default)]
pub struct EventDetails {
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub status: Option<EventStatus>,
    pub todo_status: Option<TodoStatus>,
    pub priority: i64,
    pub recurrence_rule: Option<String>,
    pub attendees: Vec<String>,
}

/// A calendar event or task.
///
/// `status` and `todo_status` are both kept on every record even though only
/// one is meaningful for a given [`Kind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    kind: Kind,
    id: String,
    last_modified: DateTime<Utc>,
    title: String,
    // Absent in malformed persisted records; see `EventStore::flatten`.
    #[serde(default)]
    start: Option<EventTime>,
    #[serde(default)]
    end: Option<EventTime>,
    creator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<EventStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    todo_status: Option<TodoStatus>,
    #[serde(default, deserialize_with = "deserialize_priority")]
    priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recurrence_rule: Option<String>,
    #[serde(default)]
    attendees: Vec<String>,
}

impl Event {
    /// Create an entity with only the required fields.
    pub fn new(
        kind: Kind,
        start: EventTime,
        end: EventTime,
        title: impl Into<String>,
        creator: impl Into<String>,
    ) -> Self {
        Self::create(kind, start, end, title, creator, EventDetails::default())
    }

    /// Create an entity with a fresh id and `last_modified = now`.
    pub fn create(
        kind: Kind,
        start: EventTime,
        end: EventTime,
        title: impl Into<String>,
        creator: impl Into<String>,
        details: EventDetails,
    ) -> Self {
        Self::build(kind, start, Some(end), title, creator, details)
    }

    /// Create an entity with no `end`. For tasks this means "no due date".
    pub fn create_without_end(
        kind: Kind,
        start: EventTime,
        title: impl Into<String>,
        creator: impl Into<String>,
        details: EventDetails,
    ) -> Self {
        Self::build(kind, start, None, title, creator, details)
    }

    fn build(
        kind: Kind,
        start: EventTime,
        end: Option<EventTime>,
        title: impl Into<String>,
        creator: impl Into<String>,
        details: EventDetails,
    ) -> Self {
        Event {
            kind,
            id: Uuid::new_v4().simple().to_string(),
            last_modified: Utc::now(),
            title: title.into(),
            start: Some(start),
            end,
            creator: creator.into(),
            description: details.description,
            location: details.location,
            category: details.category,
            status: details.status,
            todo_status: details.todo_status,
            priority: normalize_priority(details.priority),
            recurrence_rule: details.recurrence_rule,
            attendees: details.attendees,
        }
    }

    fn touch(&mut self) {
        self.last_modified = Utc::now();
    }

    // GETTERS:

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> Option<&EventTime> {
        self.start.as_ref()
    }

    pub fn end(&self) -> Option<&EventTime> {
        self.end.as_ref()
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn status(&self) -> Option<EventStatus> {
        self.status
    }

    pub fn todo_status(&self) -> Option<TodoStatus> {
        self.todo_status
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn recurrence_rule(&self) -> Option<&str> {
        self.recurrence_rule.as_deref()
    }

    pub fn attendees(&self) -> &[String] {
        &self.attendees
    }

    /// All-day entities store calendar dates rather than instants.
    pub fn is_all_day(&self) -> bool {
        self.start.as_ref().is_some_and(EventTime::is_all_day)
    }

    /// Both endpoints are present.
    pub fn is_well_formed(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// The due value of a task is its `end`.
    pub fn due(&self) -> Option<&EventTime> {
        self.end.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.todo_status == Some(TodoStatus::Completed)
    }

    // SETTERS:

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_start(&mut self, start: EventTime) {
        self.start = Some(start);
        self.touch();
    }

    pub fn set_end(&mut self, end: EventTime) {
        self.end = Some(end);
        self.touch();
    }

    pub fn clear_end(&mut self) {
        self.end = None;
        self.touch();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    pub fn set_location(&mut self, location: Option<String>) {
        self.location = location;
        self.touch();
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
        self.touch();
    }

    pub fn set_status(&mut self, status: EventStatus) {
        self.status = Some(status);
        self.touch();
    }

    pub fn set_todo_status(&mut self, todo_status: TodoStatus) {
        self.todo_status = Some(todo_status);
        self.touch();
    }

    /// Out-of-range priorities are stored as 0.
    pub fn set_priority(&mut self, priority: i64) {
        self.priority = normalize_priority(priority);
        self.touch();
    }

    pub fn set_recurrence_rule(&mut self, rule: Option<String>) {
        self.recurrence_rule = rule;
        self.touch();
    }

    pub fn set_attendees(&mut self, attendees: Vec<String>) {
        self.attendees = attendees;
        self.touch();
    }

    pub fn set_creator(&mut self, creator: impl Into<String>) {
        self.creator = creator.into();
        self.touch();
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.trim().is_empty() {
            write!(f, "(No title)")
        } else {
            write!(f, "{}", self.title)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn timed(h_start: u32, h_end: u32) -> (EventTime, EventTime) {
        (
            EventTime::DateTime(Utc.with_ymd_and_hms(2025, 3, 20, h_start, 0, 0).unwrap()),
            EventTime::DateTime(Utc.with_ymd_and_hms(2025, 3, 20, h_end, 0, 0).unwrap()),
        )
    }

    fn make_event() -> Event {
        let (start, end) = timed(15, 16);
        Event::new(Kind::Event, start, end, "Standup", "Sam")
    }

    #[test]
    fn create_round_trips_start_and_end() {
        let (start, end) = timed(9, 17);
        let event = Event::new(Kind::Event, start, end, "Workday", "Sam");

        assert_eq!(event.start(), Some(&start));
        assert_eq!(event.end(), Some(&end));
        assert!(!event.is_all_day());
    }

    #[test]
    fn create_round_trips_all_day_dates() {
        let start = EventTime::Date(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        let end = EventTime::Date(NaiveDate::from_ymd_opt(2025, 1, 12).unwrap());
        let event = Event::new(Kind::Event, start, end, "Trip", "Sam");

        assert_eq!(event.start(), Some(&start));
        assert_eq!(event.end(), Some(&end));
        assert!(event.is_all_day());
    }

    #[test]
    fn ids_are_unique() {
        let a = make_event();
        let b = make_event();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn setters_keep_id_and_refresh_last_modified() {
        let mut event = make_event();
        let id = event.id().to_string();
        let before = event.last_modified();

        event.set_title("Look outside");
        event.set_description(Some("Make contact with the visitor".into()));
        event.set_location(Some("Montreal".into()));

        assert_eq!(event.id(), id);
        assert_eq!(event.title(), "Look outside");
        assert_eq!(event.description(), Some("Make contact with the visitor"));
        assert_eq!(event.location(), Some("Montreal"));
        assert!(event.last_modified() >= before);
    }

    #[test]
    fn set_status_accepts_every_variant() {
        let mut event = make_event();
        for status in [
            EventStatus::Tentative,
            EventStatus::Confirmed,
            EventStatus::Cancelled,
        ] {
            event.set_status(status);
            assert_eq!(event.status(), Some(status));
        }
    }

    #[test]
    fn set_priority_clamps_out_of_range_to_zero() {
        let mut event = make_event();
        for p in [-1, 10, 15] {
            event.set_priority(p);
            assert_eq!(event.priority(), 0, "priority {p} should normalize to 0");
        }
        for p in 0..=9 {
            event.set_priority(p);
            assert_eq!(i64::from(event.priority()), p);
        }
    }

    #[test]
    fn create_normalizes_priority() {
        let (start, end) = timed(9, 10);
        let event = Event::create(
            Kind::Todo,
            start,
            end,
            "Taxes",
            "Sam",
            EventDetails {
                priority: 42,
                ..Default::default()
            },
        );
        assert_eq!(event.priority(), 0);
    }

    #[test]
    fn setters_do_not_validate_ordering() {
        let mut event = make_event();
        let (early, _) = timed(1, 2);
        event.set_end(early);
        assert_eq!(event.end(), Some(&early));
    }

    #[test]
    fn parse_attendees_trims_and_drops_empties() {
        assert_eq!(
            parse_attendees(" Dan, Hellen ,, Phillipe ,"),
            vec!["Dan", "Hellen", "Phillipe"]
        );
        assert!(parse_attendees(" , ").is_empty());
    }

    #[test]
    fn json_shape_uses_ics_names() {
        let mut event = make_event();
        event.set_todo_status(TodoStatus::InProcess);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["kind"], "VEVENT");
        assert_eq!(json["todoStatus"], "IN-PROCESS");
        assert!(json.get("lastModified").is_some());
    }

    #[test]
    fn deserialize_tolerates_missing_end_and_bad_priority() {
        let json = r#"{
            "kind": "VTODO",
            "id": "abc",
            "lastModified": "2025-01-01T00:00:00Z",
            "title": "Broken",
            "start": {"Date": "2025-01-10"},
            "creator": "Sam",
            "priority": 12
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();

        assert!(event.end().is_none());
        assert!(!event.is_well_formed());
        assert_eq!(event.priority(), 0);
    }

    #[test]
    fn task_without_end_has_no_due_date() {
        let (start, end) = timed(9, 10);
        let mut task = Event::create_without_end(
            Kind::Todo,
            start,
            "Someday",
            "Sam",
            EventDetails::default(),
        );
        assert!(task.due().is_none());
        assert!(!task.is_well_formed());

        task.set_end(end);
        let stamped = task.last_modified();
        task.clear_end();
        assert!(task.due().is_none());
        assert!(task.last_modified() >= stamped);
    }
}
