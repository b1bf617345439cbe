//! Date-keyed collection of events and tasks.
//!
//! Each date key owns an `Arc<Vec<Event>>`. Mutations never touch a list in
//! place: they build a new list and swap the `Arc` for that key only, so a
//! caller holding the handle of an unrelated day keeps a pointer-equal value.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::constants::{MARKER_PALETTE, SELECTED_COLOR};
use crate::date::{date_key, parse_date_key, parse_local_calendar_date};
use crate::event::Event;

/// Serialized form of the store: date key to ordered entity records.
pub type EventRecords = BTreeMap<String, Vec<Event>>;

#[derive(Debug, Clone, Default)]
pub struct EventStore {
    days: BTreeMap<String, Arc<Vec<Event>>>,
}

/// One colored dot under a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dot {
    pub key: String,
    pub color: &'static str,
}

/// Everything a calendar widget needs to decorate a single day.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DayMarkers {
    pub dots: Vec<Dot>,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<&'static str>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted records.
    ///
    /// Keys that are not strict `YYYY-MM-DD` are recovered with the lenient
    /// parser; keys that cannot be recovered at all are dropped.
    pub fn from_records(records: EventRecords) -> Self {
        let mut store = EventStore::new();

        for (key, entities) in records {
            let key = if parse_date_key(&key).is_ok() {
                key
            } else if let Some(date) = parse_local_calendar_date(&key) {
                date_key(date)
            } else {
                tracing::warn!(key = %key, count = entities.len(), "dropping unreadable date key");
                continue;
            };

            for entity in entities {
                store.add_entity(&key, entity);
            }
        }

        store
    }

    pub fn to_records(&self) -> EventRecords {
        self.days
            .iter()
            .map(|(key, list)| (key.clone(), list.as_ref().clone()))
            .collect()
    }

    /// Append an entity to the list for `date_key`, creating the list if needed.
    pub fn add_entity(&mut self, date_key: &str, entity: Event) {
        tracing::debug!(date_key, id = entity.id(), "adding entity");

        let mut list = self
            .days
            .get(date_key)
            .map(|l| l.as_ref().clone())
            .unwrap_or_default();
        list.push(entity);
        self.days.insert(date_key.to_string(), Arc::new(list));
    }

    /// Remove the entity with `id` from `date_key`. No-op when absent.
    pub fn remove_entity(&mut self, date_key: &str, id: &str) -> Option<Event> {
        let current = self.days.get(date_key)?;
        let position = current.iter().position(|e| e.id() == id)?;

        tracing::debug!(date_key, id, "removing entity");

        let mut list = current.as_ref().clone();
        let removed = list.remove(position);
        self.days.insert(date_key.to_string(), Arc::new(list));
        Some(removed)
    }

    /// Mutate one entity in place of a fresh copy of its day list.
    /// Returns false when nothing matched.
    pub fn update_entity<F>(&mut self, date_key: &str, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Event),
    {
        let Some(current) = self.days.get(date_key) else {
            return false;
        };
        let Some(position) = current.iter().position(|e| e.id() == id) else {
            return false;
        };

        let mut list = current.as_ref().clone();
        f(&mut list[position]);
        self.days.insert(date_key.to_string(), Arc::new(list));
        true
    }

    /// Entities filed under `date_key`, empty when none.
    pub fn entities_for(&self, date_key: &str) -> &[Event] {
        self.days.get(date_key).map(|l| l.as_slice()).unwrap_or(&[])
    }

    /// Shared handle to a day's list, for identity comparisons.
    pub fn day(&self, date_key: &str) -> Option<&Arc<Vec<Event>>> {
        self.days.get(date_key)
    }

    /// Every stored entity in key order then insertion order, including
    /// records without a start or end.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.days.values().flat_map(|list| list.iter())
    }

    /// Locate an entity by id anywhere in the store.
    pub fn find(&self, id: &str) -> Option<(&str, &Event)> {
        self.days.iter().find_map(|(key, list)| {
            list.iter()
                .find(|e| e.id() == id)
                .map(|e| (key.as_str(), e))
        })
    }

    pub fn len(&self) -> usize {
        self.days.values().map(|l| l.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every entity in key order then insertion order, skipping records
    /// that lack a start or end.
    pub fn flatten(&self) -> Vec<&Event> {
        self.iter().filter(|e| e.is_well_formed()).collect()
    }

    /// Per-day markers: up to `max_dots_per_day` dots colored by position in
    /// the day, plus a merged "selected" flag for `selected_date`.
    pub fn marker_summary(
        &self,
        max_dots_per_day: usize,
        selected_date: Option<&str>,
    ) -> BTreeMap<String, DayMarkers> {
        let mut markers: BTreeMap<String, DayMarkers> = self
            .days
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(key, list)| {
                let dots = list
                    .iter()
                    .take(max_dots_per_day)
                    .enumerate()
                    .map(|(i, e)| Dot {
                        key: e.id().to_string(),
                        color: MARKER_PALETTE[i % MARKER_PALETTE.len()],
                    })
                    .collect();
                (
                    key.clone(),
                    DayMarkers {
                        dots,
                        ..Default::default()
                    },
                )
            })
            .collect();

        if let Some(selected) = selected_date {
            let day = markers.entry(selected.to_string()).or_default();
            day.selected = true;
            day.selected_color = Some(SELECTED_COLOR);
        }

        markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventTime, Kind};
    use chrono::NaiveDate;

    fn all_day(title: &str, day: u32) -> Event {
        let start = EventTime::Date(NaiveDate::from_ymd_opt(2025, 1, day).unwrap());
        let end = EventTime::Date(NaiveDate::from_ymd_opt(2025, 1, day + 1).unwrap());
        Event::new(Kind::Event, start, end, title, "Sam")
    }

    #[test]
    fn add_creates_and_appends_in_order() {
        let mut store = EventStore::new();
        store.add_entity("2025-01-10", all_day("first", 10));
        store.add_entity("2025-01-10", all_day("second", 10));

        let titles: Vec<_> = store
            .entities_for("2025-01-10")
            .iter()
            .map(|e| e.title())
            .collect();
        assert_eq!(titles, vec!["first", "second"]);
        assert!(store.entities_for("2025-01-11").is_empty());
    }

    #[test]
    fn add_leaves_other_days_pointer_equal() {
        let mut store = EventStore::new();
        store.add_entity("2025-01-10", all_day("a", 10));
        store.add_entity("2025-01-11", all_day("b", 11));
        let untouched = Arc::clone(store.day("2025-01-11").unwrap());
        let before = Arc::clone(store.day("2025-01-10").unwrap());

        store.add_entity("2025-01-10", all_day("c", 10));

        assert!(Arc::ptr_eq(&untouched, store.day("2025-01-11").unwrap()));
        assert!(!Arc::ptr_eq(&before, store.day("2025-01-10").unwrap()));
        // The old handle still sees the old contents
        assert_eq!(before.len(), 1);
    }

    #[test]
    fn remove_missing_id_is_a_no_op() {
        let mut store = EventStore::new();
        store.add_entity("2025-01-10", all_day("a", 10));
        let before = Arc::clone(store.day("2025-01-10").unwrap());

        assert!(store.remove_entity("2025-01-10", "nope").is_none());
        assert!(store.remove_entity("2025-02-01", "nope").is_none());

        assert!(Arc::ptr_eq(&before, store.day("2025-01-10").unwrap()));
        assert_eq!(store.entities_for("2025-01-10"), before.as_slice());
    }

    #[test]
    fn remove_filters_matching_id() {
        let mut store = EventStore::new();
        let keep = all_day("keep", 10);
        let drop = all_day("drop", 10);
        let drop_id = drop.id().to_string();
        store.add_entity("2025-01-10", keep.clone());
        store.add_entity("2025-01-10", drop);

        let removed = store.remove_entity("2025-01-10", &drop_id).unwrap();

        assert_eq!(removed.title(), "drop");
        assert_eq!(store.entities_for("2025-01-10"), &[keep]);
    }

    #[test]
    fn update_entity_swaps_only_that_day() {
        let mut store = EventStore::new();
        let event = all_day("old", 10);
        let id = event.id().to_string();
        store.add_entity("2025-01-10", event);
        store.add_entity("2025-01-11", all_day("other", 11));
        let other = Arc::clone(store.day("2025-01-11").unwrap());

        assert!(store.update_entity("2025-01-10", &id, |e| e.set_title("new")));
        assert!(!store.update_entity("2025-01-10", "missing", |e| e.set_title("x")));

        assert_eq!(store.entities_for("2025-01-10")[0].title(), "new");
        assert!(Arc::ptr_eq(&other, store.day("2025-01-11").unwrap()));
    }

    #[test]
    fn flatten_skips_entities_without_end() {
        let json = r#"{
            "2025-01-10": [
                {"kind": "VEVENT", "id": "broken", "lastModified": "2025-01-01T00:00:00Z",
                 "title": "No end", "start": {"Date": "2025-01-10"}, "creator": "Sam"}
            ]
        }"#;
        let records: EventRecords = serde_json::from_str(json).unwrap();
        let mut store = EventStore::from_records(records);
        store.add_entity("2025-01-10", all_day("ok", 10));

        let flat = store.flatten();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].title(), "ok");
        // The malformed record is still held, just not exported
        assert_eq!(store.len(), 2);
        let titles: Vec<_> = store.iter().map(Event::title).collect();
        assert_eq!(titles, vec!["No end", "ok"]);
    }

    #[test]
    fn from_records_recovers_legacy_keys() {
        let mut records = EventRecords::new();
        records.insert("2025".to_string(), vec![all_day("legacy", 1)]);
        records.insert("garbage".to_string(), vec![all_day("lost", 2)]);

        let store = EventStore::from_records(records);

        assert_eq!(store.entities_for("2025-01-01").len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn records_round_trip_through_json() {
        let mut store = EventStore::new();
        store.add_entity("2025-01-10", all_day("a", 10));
        store.add_entity("2025-01-12", all_day("b", 12));

        let json = serde_json::to_string(&store.to_records()).unwrap();
        let restored = EventStore::from_records(serde_json::from_str(&json).unwrap());

        assert_eq!(restored.to_records(), store.to_records());
    }

    #[test]
    fn markers_cap_dots_and_cycle_palette() {
        let mut store = EventStore::new();
        for i in 0..7 {
            store.add_entity("2025-01-10", all_day(&format!("e{i}"), 10));
        }

        let markers = store.marker_summary(6, None);
        let day = &markers["2025-01-10"];

        assert_eq!(day.dots.len(), 6);
        assert_eq!(day.dots[0].color, MARKER_PALETTE[0]);
        assert_eq!(day.dots[5].color, MARKER_PALETTE[0]);
        assert!(!day.selected);
    }

    #[test]
    fn selected_marker_merges_with_dots() {
        let mut store = EventStore::new();
        store.add_entity("2025-01-10", all_day("a", 10));

        let markers = store.marker_summary(3, Some("2025-01-10"));
        let day = &markers["2025-01-10"];
        assert!(day.selected);
        assert_eq!(day.dots.len(), 1);

        let empty_day = store.marker_summary(3, Some("2025-01-20"));
        assert!(empty_day["2025-01-20"].selected);
        assert!(empty_day["2025-01-20"].dots.is_empty());
    }

    #[test]
    fn find_locates_entity_and_key() {
        let mut store = EventStore::new();
        let event = all_day("needle", 12);
        let id = event.id().to_string();
        store.add_entity("2025-01-12", event);

        let (key, found) = store.find(&id).unwrap();
        assert_eq!(key, "2025-01-12");
        assert_eq!(found.title(), "needle");
        assert!(store.find("missing").is_none());
    }
}
