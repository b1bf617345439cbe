//! Task grouping for the task list screen.

use crate::date::format_basic_date_local;
use crate::event::Event;

/// The three disjoint sections of the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskGroup {
    Due,
    NoDueDate,
    Completed,
}

impl TaskGroup {
    pub const ALL: [TaskGroup; 3] = [TaskGroup::Due, TaskGroup::NoDueDate, TaskGroup::Completed];

    pub fn label(&self) -> &'static str {
        match self {
            TaskGroup::Due => "Due",
            TaskGroup::NoDueDate => "No Due Date",
            TaskGroup::Completed => "Completed",
        }
    }
}

/// Tasks partitioned by completion and due date.
#[derive(Debug, Default)]
pub struct TaskGroups<'a> {
    /// Sorted ascending by the local `YYYYMMDD` of the due date.
    pub due: Vec<&'a Event>,
    pub no_due_date: Vec<&'a Event>,
    pub completed: Vec<&'a Event>,
}

impl<'a> TaskGroups<'a> {
    /// Partition `tasks`. Completed tasks never land in the other groups;
    /// `due` is stable-sorted so equal dates keep input order.
    pub fn from_tasks<I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut groups = TaskGroups::default();
        let mut due: Vec<(String, &'a Event)> = Vec::new();

        for task in tasks {
            if task.is_completed() {
                groups.completed.push(task);
            } else if let Some(date) = task.due() {
                due.push((format_basic_date_local(date), task));
            } else {
                groups.no_due_date.push(task);
            }
        }

        // Fixed-width zero-padded keys, so string order is date order
        due.sort_by(|a, b| a.0.cmp(&b.0));
        groups.due = due.into_iter().map(|(_, task)| task).collect();
        groups
    }

    pub fn get(&self, group: TaskGroup) -> &[&'a Event] {
        match group {
            TaskGroup::Due => &self.due,
            TaskGroup::NoDueDate => &self.no_due_date,
            TaskGroup::Completed => &self.completed,
        }
    }

    pub fn len(&self) -> usize {
        self.due.len() + self.no_due_date.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collapsed/expanded state of each group. Lives only as long as the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupToggles {
    due_collapsed: bool,
    no_due_date_collapsed: bool,
    completed_collapsed: bool,
}

impl GroupToggles {
    fn slot(&mut self, group: TaskGroup) -> &mut bool {
        match group {
            TaskGroup::Due => &mut self.due_collapsed,
            TaskGroup::NoDueDate => &mut self.no_due_date_collapsed,
            TaskGroup::Completed => &mut self.completed_collapsed,
        }
    }

    pub fn is_collapsed(&self, group: TaskGroup) -> bool {
        match group {
            TaskGroup::Due => self.due_collapsed,
            TaskGroup::NoDueDate => self.no_due_date_collapsed,
            TaskGroup::Completed => self.completed_collapsed,
        }
    }

    /// Flip one group and return its new collapsed state.
    pub fn toggle(&mut self, group: TaskGroup) -> bool {
        let slot = self.slot(group);
        *slot = !*slot;
        *slot
    }

    pub fn set_collapsed(&mut self, group: TaskGroup, collapsed: bool) {
        *self.slot(group) = collapsed;
    }
}
