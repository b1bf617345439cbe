pub mod entry;
pub mod export;
pub mod import;
pub mod prefs;
pub mod remove;
pub mod tasks;
pub mod view;
