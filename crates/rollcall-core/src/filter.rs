//! Task filter used to decide whether a version has matching tasks.

use serde::{Deserialize, Serialize};

use crate::{CoreError, DisplayStatus, Task};

/// Filter over the tasks of a version.
///
/// Each non-empty list must be satisfied by at least one of its entries;
/// empty lists match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingTasksOptions {
    /// Case-insensitive substrings of the task display name.
    pub task_names: Vec<String>,

    /// Case-insensitive substrings of the build variant id or display name.
    pub variants: Vec<String>,

    /// Exact display-status labels.
    pub statuses: Vec<String>,

    /// When false, versions that were never activated match nothing.
    pub include_never_activated_tasks: bool,
}

impl MatchingTasksOptions {
    /// Builder method to add a task name substring.
    pub fn with_task_name(mut self, name: impl Into<String>) -> Self {
        self.task_names.push(name.into());
        self
    }

    /// Builder method to add a variant substring.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variants.push(variant.into());
        self
    }

    /// Builder method to add a status label.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.statuses.push(status.into());
        self
    }

    /// Builder method to include versions that were never activated.
    pub fn including_never_activated(mut self) -> Self {
        self.include_never_activated_tasks = true;
        self
    }

    /// Reject blank entries and unknown status labels.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, values) in [("task_names", &self.task_names), ("variants", &self.variants)] {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(CoreError::InvalidFilter(format!(
                    "{field} contains a blank entry"
                )));
            }
        }
        for status in &self.statuses {
            status.parse::<DisplayStatus>().map_err(|_| {
                CoreError::InvalidFilter(format!("unknown status '{status}'"))
            })?;
        }
        Ok(())
    }

    /// Check a single task against the name, variant and status criteria.
    ///
    /// Version activation is not considered here; that needs the version.
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_name(task) && self.matches_variant(task) && self.matches_status(task)
    }

    fn matches_name(&self, task: &Task) -> bool {
        if self.task_names.is_empty() {
            return true;
        }
        let name = task.display_name.to_lowercase();
        self.task_names
            .iter()
            .any(|n| name.contains(&n.to_lowercase()))
    }

    fn matches_variant(&self, task: &Task) -> bool {
        if self.variants.is_empty() {
            return true;
        }
        let id = task.build_variant.to_lowercase();
        let display_name = task.build_variant_display_name.to_lowercase();
        self.variants.iter().any(|v| {
            let v = v.to_lowercase();
            id.contains(&v) || display_name.contains(&v)
        })
    }

    fn matches_status(&self, task: &Task) -> bool {
        if self.statuses.is_empty() {
            return true;
        }
        let status = task.effective_display_status();
        self.statuses.iter().any(|s| s == status.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskStatus;

    fn task() -> Task {
        Task::new("t1", "test-Agent", "v1")
            .with_build_variant("bv1", "Build Variant 1")
            .with_status(TaskStatus::Failed)
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(MatchingTasksOptions::default().matches(&task()));
    }

    #[test]
    fn test_name_match_is_case_insensitive_substring() {
        let opts = MatchingTasksOptions::default().with_task_name("AGENT");
        assert!(opts.matches(&task()));

        let opts = MatchingTasksOptions::default().with_task_name("model");
        assert!(!opts.matches(&task()));
    }

    #[test]
    fn test_variant_matches_id_or_display_name() {
        let by_id = MatchingTasksOptions::default().with_variant("bv1");
        assert!(by_id.matches(&task()));

        let by_name = MatchingTasksOptions::default().with_variant("variant 1");
        assert!(by_name.matches(&task()));

        let neither = MatchingTasksOptions::default().with_variant("bv2");
        assert!(!neither.matches(&task()));
    }

    #[test]
    fn test_status_is_exact_display_status() {
        let opts = MatchingTasksOptions::default().with_status("failed");
        assert!(opts.matches(&task()));

        let opts = MatchingTasksOptions::default().with_status("fail");
        assert!(!opts.matches(&task()));

        let unscheduled = Task::new("t2", "lint", "v1");
        let opts = MatchingTasksOptions::default().with_status("unscheduled");
        assert!(opts.matches(&unscheduled));
    }

    #[test]
    fn test_all_criteria_must_hold() {
        let opts = MatchingTasksOptions::default()
            .with_task_name("agent")
            .with_variant("bv1")
            .with_status("success");
        assert!(!opts.matches(&task()));
    }

    #[test]
    fn test_validate() {
        assert!(MatchingTasksOptions::default().validate().is_ok());

        let blank = MatchingTasksOptions::default().with_task_name("  ");
        assert!(matches!(blank.validate(), Err(CoreError::InvalidFilter(_))));

        let unknown = MatchingTasksOptions::default().with_status("running");
        assert!(matches!(unknown.validate(), Err(CoreError::InvalidFilter(_))));

        let ok = MatchingTasksOptions::default()
            .with_variant("bv1")
            .with_status("blocked");
        assert!(ok.validate().is_ok());
    }
}
