use anyhow::Result;
use daybook_core::{KeyValueStore, Session};
use owo_colors::OwoColorize;

pub fn run<S: KeyValueStore>(session: &mut Session<S>, use_24_hour: Option<bool>) -> Result<()> {
    if let Some(value) = use_24_hour {
        session.set_use_24_hour(value);
    }

    let clock = if session.preferences().use_24_hour {
        "24-hour"
    } else {
        "12-hour"
    };
    println!("  Time format: {}", clock.bold());
    Ok(())
}

pub fn categories<S: KeyValueStore>(session: &mut Session<S>, name: Option<&str>) -> Result<()> {
    if let Some(name) = name {
        if session.add_category(name) {
            println!("{}", format!("  Added category: {}", name.trim().to_lowercase()).green());
        } else {
            println!("{}", "  Category already exists".dimmed());
        }
        return Ok(());
    }

    if session.categories().is_empty() {
        println!("{}", "No categories".dimmed());
    }
    for category in session.categories().as_slice() {
        println!("  {category}");
    }
    Ok(())
}
