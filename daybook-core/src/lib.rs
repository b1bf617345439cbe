//! Core types for daybook.
//!
//! This crate holds everything the CLI composes:
//! - `Event` and its field types, plus the form `EventDraft` that validates input
//! - `EventStore`, a date-keyed copy-on-write collection of entities
//! - `ics` for calendar export (bit-exact) and import
//! - `Session`, which owns a store and writes it back through a `KeyValueStore`

pub mod categories;
pub mod config;
pub mod constants;
pub mod date;
pub mod draft;
pub mod error;
pub mod event;
pub mod export;
pub mod ics;
pub mod persist;
pub mod presenter;
pub mod session;
pub mod store;

pub use categories::Categories;
pub use config::DaybookConfig;
pub use draft::{EventDraft, ValidatedDraft};
pub use error::{DaybookError, DaybookResult};
pub use event::*;
pub use export::{ExportedFile, ShareTarget};
pub use persist::{FileStore, KeyValueStore, MemoryStore};
pub use presenter::{GroupToggles, TaskGroup, TaskGroups};
pub use session::{Preferences, Session};
pub use store::{DayMarkers, Dot, EventRecords, EventStore};
