//! Raw form input and the validation boundary.
//!
//! Entities themselves accept any value through their setters; this is the
//! one place where temporal ordering and required fields are enforced.

use std::cmp::Ordering;

use crate::constants::DEFAULT_CREATOR;
use crate::date::{format_form_time, parse_form_time};
use crate::error::{DaybookError, DaybookResult};
use crate::event::{
    Event, EventDetails, EventStatus, EventTime, Kind, TodoStatus, parse_attendees,
};

/// Form values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub start: String,
    pub end: String,
    pub creator: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub status: Option<EventStatus>,
    pub todo_status: Option<TodoStatus>,
    pub priority: String,
    pub recurrence_rule: String,
    /// Comma-separated names.
    pub attendees: String,
}

/// A draft that passed validation, ready to become or update an entity.
#[derive(Debug, Clone)]
pub struct ValidatedDraft {
    pub kind: Kind,
    pub title: String,
    pub start: EventTime,
    /// Only tasks may leave this empty (no due date).
    pub end: Option<EventTime>,
    pub creator: String,
    pub details: EventDetails,
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn compare(start: &EventTime, end: &EventTime) -> Option<Ordering> {
    match (start, end) {
        (EventTime::Date(a), EventTime::Date(b)) => Some(a.cmp(b)),
        (EventTime::DateTime(a), EventTime::DateTime(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Events must end strictly after they start. A task may be due on the
/// day (or at the moment) it starts, but not before.
fn check_order(kind: Kind, start: &EventTime, end: &EventTime) -> DaybookResult<()> {
    match (compare(start, end), kind) {
        (None, _) => Err(DaybookError::Validation(
            "Start and end must both be dates or both be date-times".into(),
        )),
        (Some(Ordering::Greater), Kind::Todo) => Err(DaybookError::Validation(
            "Due date cannot be before start date".into(),
        )),
        (Some(Ordering::Equal), Kind::Todo) | (Some(Ordering::Less), _) => Ok(()),
        (Some(Ordering::Greater | Ordering::Equal), Kind::Event) => Err(DaybookError::Validation(
            "End time must be after start time".into(),
        )),
    }
}

impl EventDraft {
    /// Pre-fill the form from an existing entity.
    pub fn from_event(event: &Event) -> Self {
        EventDraft {
            title: event.title().to_string(),
            start: event.start().map(format_form_time).unwrap_or_default(),
            end: event.end().map(format_form_time).unwrap_or_default(),
            creator: event.creator().to_string(),
            description: event.description().unwrap_or_default().to_string(),
            location: event.location().unwrap_or_default().to_string(),
            category: event.category().unwrap_or_default().to_string(),
            status: event.status(),
            todo_status: event.todo_status(),
            priority: event.priority().to_string(),
            recurrence_rule: event.recurrence_rule().unwrap_or_default().to_string(),
            attendees: event.attendees().join(", "),
        }
    }

    /// Check the draft and convert its strings into typed values.
    pub fn validate(&self, kind: Kind) -> DaybookResult<ValidatedDraft> {
        let title = non_empty(&self.title)
            .ok_or_else(|| DaybookError::Validation("Title is required".into()))?;

        let start = parse_form_time(&self.start)?;
        let end = match (kind, non_empty(&self.end)) {
            (_, Some(end)) => Some(parse_form_time(&end)?),
            (Kind::Todo, None) => None,
            (Kind::Event, None) => {
                return Err(DaybookError::Validation("End time is required".into()));
            }
        };

        if let Some(end) = &end {
            check_order(kind, &start, end)?;
        }

        let priority = match non_empty(&self.priority) {
            Some(p) => p
                .parse::<i64>()
                .map_err(|_| DaybookError::Validation(format!("Priority '{p}' is not a number")))?,
            None => 0,
        };

        let (status, todo_status) = match kind {
            Kind::Event => (
                Some(self.status.unwrap_or(EventStatus::Tentative)),
                self.todo_status,
            ),
            Kind::Todo => (
                self.status,
                Some(self.todo_status.unwrap_or(TodoStatus::NeedsAction)),
            ),
        };

        Ok(ValidatedDraft {
            kind,
            title,
            start,
            end,
            creator: non_empty(&self.creator).unwrap_or_else(|| DEFAULT_CREATOR.to_string()),
            details: EventDetails {
                description: non_empty(&self.description),
                location: non_empty(&self.location),
                category: non_empty(&self.category).map(|c| c.to_lowercase()),
                status,
                todo_status,
                priority,
                recurrence_rule: non_empty(&self.recurrence_rule),
                attendees: parse_attendees(&self.attendees),
            },
        })
    }
}

impl ValidatedDraft {
    pub fn into_event(self) -> Event {
        match self.end {
            Some(end) => Event::create(
                self.kind,
                self.start,
                end,
                self.title,
                self.creator,
                self.details,
            ),
            None => Event::create_without_end(
                self.kind,
                self.start,
                self.title,
                self.creator,
                self.details,
            ),
        }
    }

    /// Write the draft onto an existing entity. Only fields that differ go
    /// through their setter, so an untouched form leaves `last_modified` alone.
    pub fn apply_to(&self, event: &mut Event) {
        let d = &self.details;

        if event.title() != self.title {
            event.set_title(self.title.as_str());
        }
        if event.start() != Some(&self.start) {
            event.set_start(self.start);
        }
        match self.end {
            Some(end) if event.end() != Some(&end) => event.set_end(end),
            None if event.end().is_some() => event.clear_end(),
            _ => {}
        }
        if event.creator() != self.creator {
            event.set_creator(self.creator.as_str());
        }
        if event.description() != d.description.as_deref() {
            event.set_description(d.description.clone());
        }
        if event.location() != d.location.as_deref() {
            event.set_location(d.location.clone());
        }
        if event.category() != d.category.as_deref() {
            event.set_category(d.category.clone());
        }
        if let Some(status) = d.status.filter(|s| event.status() != Some(*s)) {
            event.set_status(status);
        }
        if let Some(status) = d.todo_status.filter(|s| event.todo_status() != Some(*s)) {
            event.set_todo_status(status);
        }
        if i64::from(event.priority()) != d.priority {
            event.set_priority(d.priority);
        }
        if event.recurrence_rule() != d.recurrence_rule.as_deref() {
            event.set_recurrence_rule(d.recurrence_rule.clone());
        }
        if event.attendees() != d.attendees.as_slice() {
            event.set_attendees(d.attendees.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(start: &str, end: &str) -> EventDraft {
        EventDraft {
            title: "  Dentist ".into(),
            start: start.into(),
            end: end.into(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_timed_draft_builds_event() {
        let mut d = draft("20251108T100000Z", "20251108T110000Z");
        d.attendees = "Dan, , Hellen".into();
        d.category = " Health ".into();
        d.priority = "4".into();

        let event = d.validate(Kind::Event).unwrap().into_event();

        assert_eq!(event.title(), "Dentist");
        assert_eq!(event.creator(), DEFAULT_CREATOR);
        assert_eq!(event.attendees(), &["Dan", "Hellen"]);
        assert_eq!(event.category(), Some("health"));
        assert_eq!(event.priority(), 4);
        assert_eq!(event.status(), Some(EventStatus::Tentative));
        assert!(event.description().is_none());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut d = draft("20251108", "20251109");
        d.title = "   ".into();
        assert!(matches!(d.validate(Kind::Event), Err(DaybookError::Validation(_))));
    }

    #[test]
    fn end_must_follow_start() {
        let d = draft("20251108T110000Z", "20251108T110000Z");
        let err = d.validate(Kind::Event).unwrap_err();
        assert_eq!(err.to_string(), "End time must be after start time");

        let all_day_same = draft("20251108", "20251108");
        assert!(all_day_same.validate(Kind::Event).is_err());
    }

    #[test]
    fn due_before_start_has_its_own_message() {
        let d = draft("20251110", "20251108");
        let err = d.validate(Kind::Todo).unwrap_err();
        assert_eq!(err.to_string(), "Due date cannot be before start date");
    }

    #[test]
    fn task_may_be_due_when_it_starts() {
        let same_day = draft("20251108", "20251108");
        let task = same_day.validate(Kind::Todo).unwrap();
        assert_eq!(task.end, Some(task.start));

        let same_instant = draft("20251108T110000Z", "20251108T110000Z");
        assert!(same_instant.validate(Kind::Todo).is_ok());
        assert!(same_instant.validate(Kind::Event).is_err());
    }

    #[test]
    fn task_without_due_date_validates() {
        let task = draft("20251108", "  ")
            .validate(Kind::Todo)
            .unwrap()
            .into_event();
        assert!(task.due().is_none());

        let err = draft("20251108", "").validate(Kind::Event).unwrap_err();
        assert_eq!(err.to_string(), "End time is required");
    }

    #[test]
    fn clearing_the_due_date_drops_end() {
        let mut task = draft("20251108", "20251110")
            .validate(Kind::Todo)
            .unwrap()
            .into_event();

        let mut edit = EventDraft::from_event(&task);
        edit.end.clear();
        edit.validate(Kind::Todo).unwrap().apply_to(&mut task);

        assert!(task.due().is_none());
    }

    #[test]
    fn mixed_flavours_are_rejected() {
        let d = draft("20251108", "20251108T110000Z");
        assert!(matches!(d.validate(Kind::Event), Err(DaybookError::Validation(_))));
    }

    #[test]
    fn unparsable_times_are_rejected() {
        let d = draft("soon", "20251108");
        assert!(matches!(d.validate(Kind::Event), Err(DaybookError::InvalidDateTime(_))));
    }

    #[test]
    fn non_numeric_priority_is_rejected() {
        let mut d = draft("20251108", "20251109");
        d.priority = "high".into();
        assert!(d.validate(Kind::Todo).is_err());
    }

    #[test]
    fn todo_defaults_to_needs_action() {
        let event = draft("20251108", "20251109")
            .validate(Kind::Todo)
            .unwrap()
            .into_event();
        assert_eq!(event.todo_status(), Some(TodoStatus::NeedsAction));
    }

    #[test]
    fn from_event_round_trips_through_validation() {
        let mut original = draft("20251108", "20251110");
        original.location = "Clinic".into();
        original.attendees = "Dan, Hellen".into();
        let event = original.validate(Kind::Event).unwrap().into_event();

        let refilled = EventDraft::from_event(&event);
        assert_eq!(refilled.start, "20251108");
        assert_eq!(refilled.attendees, "Dan, Hellen");

        let mut copy = event.clone();
        refilled.validate(Kind::Event).unwrap().apply_to(&mut copy);
        assert_eq!(copy, event, "re-applying an unchanged form must not restamp");
    }

    #[test]
    fn apply_to_updates_changed_fields_only() {
        let mut event = draft("20251108", "20251110")
            .validate(Kind::Event)
            .unwrap()
            .into_event();
        let id = event.id().to_string();

        let mut edit = EventDraft::from_event(&event);
        edit.title = "Orthodontist".into();
        edit.status = Some(EventStatus::Confirmed);
        edit.validate(Kind::Event).unwrap().apply_to(&mut event);

        assert_eq!(event.id(), id);
        assert_eq!(event.title(), "Orthodontist");
        assert_eq!(event.status(), Some(EventStatus::Confirmed));
        assert_eq!(event.location(), None);
    }
}
