use anyhow::{Result, bail};
use daybook_core::date::{date_key, parse_date_key};
use daybook_core::{KeyValueStore, Session};
use owo_colors::OwoColorize;

pub fn run<S: KeyValueStore>(session: &mut Session<S>, date: &str, id: &str) -> Result<()> {
    let key = date_key(parse_date_key(date)?);

    let Some(removed) = session.remove(&key, id) else {
        bail!("No entry '{id}' on {key}");
    };

    println!("{}", format!("  Removed: {removed}").red());
    Ok(())
}
