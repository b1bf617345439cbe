use std::path::Path;

use anyhow::{Context, Result};
use daybook_core::{DaybookResult, ExportedFile, KeyValueStore, Session, ShareTarget};
use owo_colors::OwoColorize;

/// Prints the path so the user can pick the file up themselves.
struct PrintPath;

impl ShareTarget for PrintPath {
    fn share(&self, file: &ExportedFile) -> DaybookResult<()> {
        println!("  {}", file.path.display());
        Ok(())
    }
}

/// Hands the file to the system's default handler for `text/calendar`.
struct OpenWithSystem;

impl ShareTarget for OpenWithSystem {
    fn share(&self, file: &ExportedFile) -> DaybookResult<()> {
        println!("  {}", file.path.display());
        open::that(&file.path).map_err(|e| {
            daybook_core::DaybookError::Export(format!(
                "Could not open {} ({}): {e}",
                file.path.display(),
                file.mime_type
            ))
        })
    }
}

pub async fn run<S: KeyValueStore>(session: &Session<S>, dir: &Path, open: bool) -> Result<()> {
    let count = session.store().flatten().len();
    let file = session
        .export(dir)
        .await
        .context("Export failed")?;

    println!(
        "{}",
        format!("  Exported {count} {}", if count == 1 { "entry" } else { "entries" }).green()
    );

    let target: &dyn ShareTarget = if open { &OpenWithSystem } else { &PrintPath };
    target.share(&file).context("Export failed")?;

    Ok(())
}
