use std::path::Path;

use anyhow::{Context, Result};
use daybook_core::ics::parse_calendar;
use daybook_core::{KeyValueStore, Session};
use owo_colors::OwoColorize;

pub async fn run<S: KeyValueStore>(session: &mut Session<S>, file: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Could not read {}", file.display()))?;

    let entities = parse_calendar(&content)?;
    let found = entities.len();
    let added = session.import(entities);

    println!("{}", format!("  Imported {added} of {found} entries").green());
    Ok(())
}
