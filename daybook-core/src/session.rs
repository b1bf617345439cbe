//! A single user's working set: the event store, categories and display
//! preferences, plus the key-value store they are persisted to.
//!
//! Every committed change is written back immediately. Write failures never
//! surface to the caller (see [`crate::persist::save_json`]); the in-memory
//! state remains authoritative.
//!
//! Saved events that cannot be decoded are copied aside before anything can
//! overwrite them. If that copy fails, event changes stay in memory only.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;

use crate::categories::Categories;
use crate::date::date_key_for;
use crate::draft::EventDraft;
use crate::error::{DaybookError, DaybookResult};
use crate::event::{Event, Kind};
use crate::export::{ExportedFile, export_to_dir};
use crate::persist::{
    CATEGORIES_KEY, EVENTS_KEY, KeyValueStore, USE_24_HOUR_KEY, corrupt_backup_key, load_json,
    save_json, save_raw,
};
use crate::store::{EventRecords, EventStore};

/// Persisted display preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preferences {
    pub use_24_hour: bool,
}

pub struct Session<S: KeyValueStore> {
    kv: S,
    store: EventStore,
    categories: Categories,
    preferences: Preferences,
    /// False when the saved events could not be read or backed up.
    events_writable: bool,
}

impl<S: KeyValueStore> Session<S> {
    /// Load everything from `kv`. Missing or malformed values fall back to
    /// empty defaults; individual unreadable records are skipped.
    pub fn load(mut kv: S) -> Self {
        let (store, events_writable) = load_events(&mut kv);

        let categories = load_json::<_, Vec<String>>(&kv, CATEGORIES_KEY)
            .map(Categories::from_names)
            .unwrap_or_default();

        let preferences = Preferences {
            use_24_hour: load_json(&kv, USE_24_HOUR_KEY).unwrap_or(false),
        };

        tracing::debug!(
            entities = store.len(),
            categories = categories.len(),
            "loaded session"
        );

        Session {
            kv,
            store,
            categories,
            preferences,
            events_writable,
        }
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Validate `draft` and file a new entity under its start date.
    /// Nothing is mutated when validation fails. Returns the new id.
    pub fn save_draft(&mut self, draft: &EventDraft, kind: Kind) -> DaybookResult<String> {
        let validated = draft.validate(kind)?;
        let key = date_key_for(&validated.start);
        let category = validated.details.category.clone();
        let entity = validated.into_event();
        let id = entity.id().to_string();

        self.remember_category(category.as_deref());
        self.store.add_entity(&key, entity);
        self.persist_events();

        Ok(id)
    }

    /// Apply an edited form to an existing entity. If the start moved to a
    /// different day the entity is re-filed. Returns the date key it now
    /// lives under.
    pub fn update_from_draft(
        &mut self,
        date_key: &str,
        id: &str,
        draft: &EventDraft,
    ) -> DaybookResult<String> {
        let kind = self
            .store
            .entities_for(date_key)
            .iter()
            .find(|e| e.id() == id)
            .map(Event::kind)
            .ok_or_else(|| DaybookError::NotFound {
                date_key: date_key.to_string(),
                id: id.to_string(),
            })?;

        let validated = draft.validate(kind)?;
        let new_key = date_key_for(&validated.start);

        let updated = if new_key == date_key {
            self.store
                .update_entity(date_key, id, |e| validated.apply_to(e))
        } else if let Some(mut entity) = self.store.remove_entity(date_key, id) {
            validated.apply_to(&mut entity);
            self.store.add_entity(&new_key, entity);
            true
        } else {
            false
        };
        if !updated {
            return Err(DaybookError::NotFound {
                date_key: date_key.to_string(),
                id: id.to_string(),
            });
        }

        self.remember_category(validated.details.category.as_deref());
        self.persist_events();

        Ok(new_key)
    }

    /// Remove an entity. Unknown ids are a no-op and write nothing.
    pub fn remove(&mut self, date_key: &str, id: &str) -> Option<Event> {
        let removed = self.store.remove_entity(date_key, id)?;
        self.persist_events();
        Some(removed)
    }

    /// File already-built entities (e.g. from an ICS import) under their
    /// start dates. Entities without a start or end are skipped. Returns how
    /// many were added.
    pub fn import(&mut self, entities: Vec<Event>) -> usize {
        let mut added = 0;
        for entity in entities {
            let Some(start) = entity.start().filter(|_| entity.is_well_formed()) else {
                tracing::warn!(id = entity.id(), "skipping imported entry without start/end");
                continue;
            };
            let key = date_key_for(start);
            let category = entity.category().map(str::to_string);
            self.remember_category(category.as_deref());
            self.store.add_entity(&key, entity);
            added += 1;
        }

        if added > 0 {
            self.persist_events();
        }
        added
    }

    /// Add a category by name. Returns false for blanks and duplicates.
    pub fn add_category(&mut self, name: &str) -> bool {
        if !self.categories.add(name) {
            return false;
        }
        save_json(&mut self.kv, CATEGORIES_KEY, &self.categories);
        true
    }

    pub fn set_use_24_hour(&mut self, use_24_hour: bool) {
        self.preferences.use_24_hour = use_24_hour;
        save_json(&mut self.kv, USE_24_HOUR_KEY, &use_24_hour);
    }

    /// Serialize every well-formed entity and write it to a new file in `dir`.
    pub async fn export(&self, dir: &Path) -> DaybookResult<ExportedFile> {
        export_to_dir(self.store.flatten(), dir).await
    }

    fn remember_category(&mut self, category: Option<&str>) {
        let Some(category) = category else {
            return;
        };
        if self.categories.add(category) {
            save_json(&mut self.kv, CATEGORIES_KEY, &self.categories);
        }
    }

    fn persist_events(&mut self) {
        if !self.events_writable {
            tracing::warn!("saved events were unreadable at startup, not overwriting them");
            return;
        }
        save_json(&mut self.kv, EVENTS_KEY, &self.store.to_records());
    }
}

/// Read the events value. The flag says whether it is safe to overwrite.
fn load_events<S: KeyValueStore>(kv: &mut S) -> (EventStore, bool) {
    let raw = match kv.get(EVENTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return (EventStore::new(), true),
        Err(e) => {
            tracing::warn!(error = %e, "could not read saved events");
            return (EventStore::new(), false);
        }
    };

    match serde_json::from_str::<BTreeMap<String, Vec<serde_json::Value>>>(&raw) {
        Ok(records) => (EventStore::from_records(decode_records(records)), true),
        Err(e) => {
            let backup = corrupt_backup_key(EVENTS_KEY, Utc::now());
            tracing::warn!(
                error = %e,
                backup = %backup,
                "saved events are unreadable, copying them aside"
            );
            let saved = save_raw(kv, &backup, &raw);
            (EventStore::new(), saved)
        }
    }
}

fn decode_records(raw: BTreeMap<String, Vec<serde_json::Value>>) -> EventRecords {
    raw.into_iter()
        .map(|(key, values)| {
            let entities = values
                .into_iter()
                .filter_map(|value| match serde_json::from_value::<Event>(value) {
                    Ok(entity) => Some(entity),
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "skipping unreadable record");
                        None
                    }
                })
                .collect();
            (key, entities)
        })
        .collect()
}
