//! Restart and schedule eligibility of tasks.
//!
//! Both rules are decision tables over the fields already loaded on a task.
//! Rows are evaluated top to bottom; the first match wins.

use crate::{DisplayStatus, Task};

/// The task fields the eligibility tables are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityKey {
    pub is_execution_task: bool,
    pub aborted: bool,
    pub uncompleted: bool,
    pub display_status: DisplayStatus,
    pub is_display_task_with_children: bool,
}

impl From<&Task> for EligibilityKey {
    fn from(task: &Task) -> Self {
        Self {
            is_execution_task: task.is_execution_task(),
            aborted: task.aborted,
            uncompleted: task.status.is_uncompleted(),
            display_status: task.effective_display_status(),
            is_display_task_with_children: task.is_display_task_with_children(),
        }
    }
}

impl EligibilityKey {
    /// Restart table.
    ///
    /// A blocked display task can be restarted so its execution tasks are
    /// re-evaluated; a blocked plain task cannot.
    pub fn can_restart(&self) -> bool {
        match *self {
            Self {
                is_execution_task: true,
                ..
            } => false,
            Self { aborted: true, .. } => false,
            Self {
                display_status: DisplayStatus::Blocked,
                is_display_task_with_children: true,
                ..
            } => true,
            Self {
                uncompleted: true, ..
            } => false,
            _ => true,
        }
    }

    /// Schedule table.
    pub fn can_schedule(&self) -> bool {
        match *self {
            Self { aborted: true, .. } => false,
            Self {
                is_execution_task: true,
                ..
            } => false,
            Self {
                display_status: DisplayStatus::Unscheduled,
                ..
            } => true,
            _ => false,
        }
    }
}

/// Whether a user may restart `task`.
pub fn can_restart_task(task: &Task) -> bool {
    EligibilityKey::from(task).can_restart()
}

/// Whether a user may schedule `task`.
pub fn can_schedule_task(task: &Task) -> bool {
    EligibilityKey::from(task).can_schedule()
}
