use anyhow::Result;
use clap::ValueEnum;
use daybook_core::date::format_basic_date_local;
use daybook_core::{GroupToggles, KeyValueStore, Kind, Session, TaskGroup, TaskGroups};
use owo_colors::OwoColorize;

use crate::render::Render;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GroupArg {
    Due,
    NoDue,
    Completed,
}

impl From<GroupArg> for TaskGroup {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::Due => TaskGroup::Due,
            GroupArg::NoDue => TaskGroup::NoDueDate,
            GroupArg::Completed => TaskGroup::Completed,
        }
    }
}

/// Print every task group. Collapsed groups show only their header.
pub fn run<S: KeyValueStore>(session: &Session<S>, collapse: &[GroupArg]) -> Result<()> {
    let mut toggles = GroupToggles::default();
    for group in collapse {
        toggles.set_collapsed((*group).into(), true);
    }

    let lines = render_groups(session, &toggles);
    if lines.is_empty() {
        println!("{}", "No tasks".dimmed());
    } else {
        println!("{}", lines.join("\n"));
    }
    Ok(())
}

fn render_groups<S: KeyValueStore>(session: &Session<S>, toggles: &GroupToggles) -> Vec<String> {
    let use_24_hour = session.preferences().use_24_hour;
    let groups = TaskGroups::from_tasks(
        session
            .store()
            .iter()
            .filter(|e| e.kind() == Kind::Todo),
    );
    if groups.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for group in TaskGroup::ALL {
        let tasks = groups.get(group);
        let arrow = if toggles.is_collapsed(group) { "▸" } else { "▾" };
        lines.push(format!(
            "{arrow} {} {}",
            group.render(use_24_hour),
            format!("({})", tasks.len()).dimmed()
        ));

        if toggles.is_collapsed(group) {
            continue;
        }
        for task in tasks {
            let due = match (group, task.due()) {
                (TaskGroup::Due, Some(due)) => format!("{} ", format_basic_date_local(due)),
                _ => String::new(),
            };
            lines.push(format!("  {}{}", due.yellow(), task.render(use_24_hour)));
        }
    }
    lines
}
