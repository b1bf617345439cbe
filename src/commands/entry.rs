use anyhow::{Result, anyhow, bail};
use clap::Args;
use daybook_core::date::{date_key, parse_date_key};
use daybook_core::{
    DaybookConfig, EventDraft, EventStatus, KeyValueStore, Kind, Session, TodoStatus,
};
use owo_colors::OwoColorize;

#[derive(Args)]
pub struct NewArgs {
    pub title: String,

    /// Start (e.g. "2025-03-20" for all-day, "2025-03-20T15:00" for a time)
    #[arg(short, long)]
    pub start: String,

    /// End, exclusive for all-day entries. For tasks this is the due date
    /// and may be left out.
    #[arg(short, long)]
    pub end: Option<String>,

    #[command(flatten)]
    pub details: DetailArgs,
}

#[derive(Args)]
pub struct EditArgs {
    /// Day the entry is filed under (YYYY-MM-DD)
    pub date: String,

    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub start: Option<String>,

    /// New end. An empty value removes a task's due date.
    #[arg(short, long)]
    pub end: Option<String>,

    #[command(flatten)]
    pub details: DetailArgs,
}

#[derive(Args, Default)]
pub struct DetailArgs {
    #[arg(long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    #[arg(short, long)]
    pub category: Option<String>,

    #[arg(long)]
    pub creator: Option<String>,

    /// Events: confirmed, tentative, cancelled.
    /// Tasks: needs-action, in-process, completed, cancelled.
    #[arg(long)]
    pub status: Option<String>,

    /// 1 (highest) to 9 (lowest), 0 for none
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Recurrence rule, stored as-is (e.g. "FREQ=WEEKLY;BYDAY=MO")
    #[arg(long)]
    pub rrule: Option<String>,

    /// Comma-separated names
    #[arg(short, long)]
    pub attendees: Option<String>,
}

impl DetailArgs {
    fn apply(self, draft: &mut EventDraft, kind: Kind) -> Result<()> {
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(location) = self.location {
            draft.location = location;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(creator) = self.creator {
            draft.creator = creator;
        }
        if let Some(priority) = self.priority {
            draft.priority = priority;
        }
        if let Some(rrule) = self.rrule {
            draft.recurrence_rule = rrule;
        }
        if let Some(attendees) = self.attendees {
            draft.attendees = attendees;
        }
        if let Some(status) = self.status {
            set_status(draft, kind, &status)?;
        }
        Ok(())
    }
}

fn set_status(draft: &mut EventDraft, kind: Kind, input: &str) -> Result<()> {
    let normalized = input.replace('_', "-");
    match kind {
        Kind::Event => {
            let status = EventStatus::from_ics_str(&normalized).ok_or_else(|| {
                anyhow!("Unknown event status '{input}'. Use confirmed, tentative or cancelled")
            })?;
            draft.status = Some(status);
        }
        Kind::Todo => {
            let status = TodoStatus::from_ics_str(&normalized).ok_or_else(|| {
                anyhow!(
                    "Unknown task status '{input}'. \
                     Use needs-action, in-process, completed or cancelled"
                )
            })?;
            draft.todo_status = Some(status);
        }
    }
    Ok(())
}

pub fn create<S: KeyValueStore>(
    session: &mut Session<S>,
    config: &DaybookConfig,
    args: NewArgs,
    task: bool,
) -> Result<()> {
    let kind = if task { Kind::Todo } else { Kind::Event };

    let mut draft = EventDraft {
        title: args.title,
        start: args.start,
        end: args.end.unwrap_or_default(),
        creator: config.default_creator.clone(),
        ..Default::default()
    };
    args.details.apply(&mut draft, kind)?;

    let id = session.save_draft(&draft, kind)?;

    let label = if task { "task" } else { "event" };
    println!("{}", format!("  Created {label}: {}", draft.title.trim()).green());
    println!("  {}", id.dimmed());

    Ok(())
}

pub fn edit<S: KeyValueStore>(session: &mut Session<S>, args: EditArgs) -> Result<()> {
    let key = date_key(parse_date_key(&args.date)?);

    let Some(entity) = session
        .store()
        .entities_for(&key)
        .iter()
        .find(|e| e.id() == args.id)
    else {
        bail!("No entry '{}' on {}", args.id, key);
    };
    let kind = entity.kind();
    let mut draft = EventDraft::from_event(entity);

    if let Some(title) = args.title {
        draft.title = title;
    }
    if let Some(start) = args.start {
        draft.start = start;
    }
    if let Some(end) = args.end {
        draft.end = end;
    }
    args.details.apply(&mut draft, kind)?;

    let new_key = session.update_from_draft(&key, &args.id, &draft)?;

    println!("{}", format!("  Updated: {}", draft.title.trim()).green());
    if new_key != key {
        println!("  {}", format!("Moved to {new_key}").dimmed());
    }

    Ok(())
}
