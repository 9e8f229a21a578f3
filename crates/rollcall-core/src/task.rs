//! Task and Dependency types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CoreError, DisplayStatus, TaskId, TaskStatus, VersionId};

/// A Task is the smallest execution unit of a version.
///
/// A task is either standalone, a *display task* that summarizes a set of
/// execution tasks, or an *execution task* owned by a display task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,

    /// Human-readable task name.
    pub display_name: String,

    /// Version this task belongs to.
    pub version: VersionId,

    /// Build variant id.
    #[serde(default)]
    pub build_variant: String,

    /// Human-readable build variant name.
    #[serde(default)]
    pub build_variant_display_name: String,

    /// Execution number; incremented on every restart.
    #[serde(default)]
    pub execution: u32,

    /// Raw lifecycle status.
    #[serde(default)]
    pub status: TaskStatus,

    /// Display status as persisted upstream, if it has been computed.
    #[serde(default)]
    pub display_status: Option<DisplayStatus>,

    /// Whether the task has been activated for scheduling.
    #[serde(default)]
    pub activated: bool,

    /// Whether the task was aborted.
    #[serde(default)]
    pub aborted: bool,

    /// Dependencies, in declaration order.
    #[serde(default)]
    pub depends_on: Vec<Dependency>,

    /// Owning display task. Set only on execution tasks.
    #[serde(default)]
    pub display_task_id: Option<TaskId>,

    /// Whether this task is a display task.
    #[serde(default)]
    pub display_only: bool,

    /// Execution tasks summarized by this display task.
    #[serde(default)]
    pub execution_tasks: Vec<TaskId>,
}

impl Task {
    /// Create a new undispatched Task.
    pub fn new(
        id: impl Into<TaskId>,
        display_name: impl Into<String>,
        version: impl Into<VersionId>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            version: version.into(),
            build_variant: String::new(),
            build_variant_display_name: String::new(),
            execution: 0,
            status: TaskStatus::Undispatched,
            display_status: None,
            activated: false,
            aborted: false,
            depends_on: Vec::new(),
            display_task_id: None,
            display_only: false,
            execution_tasks: Vec::new(),
        }
    }

    /// Builder method to set the build variant.
    pub fn with_build_variant(
        mut self,
        id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        self.build_variant = id.into();
        self.build_variant_display_name = display_name.into();
        self
    }

    /// Builder method to set the raw status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder method to set a persisted display status.
    pub fn with_display_status(mut self, status: DisplayStatus) -> Self {
        self.display_status = Some(status);
        self
    }

    /// Builder method to set the execution number.
    pub fn with_execution(mut self, execution: u32) -> Self {
        self.execution = execution;
        self
    }

    /// Builder method to add a dependency.
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.depends_on.push(dependency);
        self
    }

    /// Mark the task as activated.
    pub fn activated(mut self) -> Self {
        self.activated = true;
        self
    }

    /// Mark the task as aborted.
    pub fn aborted(mut self) -> Self {
        self.aborted = true;
        self
    }

    /// Make this an execution task owned by `display_task`.
    pub fn owned_by(mut self, display_task: impl Into<TaskId>) -> Self {
        self.display_task_id = Some(display_task.into());
        self
    }

    /// Make this a display task over the given execution tasks.
    pub fn with_execution_tasks<I, T>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        self.display_only = true;
        self.execution_tasks = tasks.into_iter().map(Into::into).collect();
        self
    }

    /// Check if this task is owned by a display task.
    ///
    /// An empty owner id is treated the same as no owner.
    pub fn is_execution_task(&self) -> bool {
        self.display_task_id
            .as_ref()
            .is_some_and(|id| !id.as_str().is_empty())
    }

    /// Check if this is a display task with at least one execution task.
    pub fn is_display_task_with_children(&self) -> bool {
        self.display_only && !self.execution_tasks.is_empty()
    }

    /// Check if any dependency can never be satisfied.
    pub fn has_unattainable_dependency(&self) -> bool {
        self.depends_on.iter().any(|dep| dep.unattainable)
    }

    /// The status users see for this task.
    ///
    /// A persisted display status wins. Otherwise it is derived from the raw
    /// fields: aborted first, then the undispatched sub-states.
    pub fn effective_display_status(&self) -> DisplayStatus {
        if let Some(status) = self.display_status {
            return status;
        }
        if self.aborted {
            return DisplayStatus::Aborted;
        }
        match self.status {
            TaskStatus::Undispatched if !self.activated => DisplayStatus::Unscheduled,
            TaskStatus::Undispatched if self.has_unattainable_dependency() => {
                DisplayStatus::Blocked
            }
            TaskStatus::Undispatched => DisplayStatus::WillRun,
            status => status.into(),
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.is_execution_task() && self.display_only {
            return Err(CoreError::InvalidTask {
                id: self.id.to_string(),
                reason: "an execution task cannot also be a display task".to_string(),
            });
        }
        Ok(())
    }
}

/// Required status of a dependency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DependencyStatus {
    /// Any finished status satisfies the dependency (`*`).
    #[default]
    Any,
    /// Only this exact status satisfies the dependency.
    Exactly(TaskStatus),
}

impl DependencyStatus {
    const WILDCARD: &'static str = "*";
}

impl fmt::Display for DependencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(Self::WILDCARD),
            Self::Exactly(status) => f.write_str(status.as_str()),
        }
    }
}

impl FromStr for DependencyStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::WILDCARD || s.is_empty() {
            return Ok(Self::Any);
        }
        s.parse().map(Self::Exactly)
    }
}

impl TryFrom<String> for DependencyStatus {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DependencyStatus> for String {
    fn from(status: DependencyStatus) -> Self {
        status.to_string()
    }
}

/// An edge from a task to a task it waits on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// The task depended on. Looked up by id, never owned.
    pub task_id: TaskId,

    /// Status the dependency must reach.
    #[serde(default)]
    pub status: DependencyStatus,

    /// Set by an external evaluator once the dependency can never be met.
    #[serde(default)]
    pub unattainable: bool,
}

impl Dependency {
    /// Create a dependency satisfied by any finished status.
    pub fn new(task_id: impl Into<TaskId>) -> Self {
        Self {
            task_id: task_id.into(),
            status: DependencyStatus::Any,
            unattainable: false,
        }
    }

    /// Builder method to require an exact status.
    pub fn requiring(mut self, status: TaskStatus) -> Self {
        self.status = DependencyStatus::Exactly(status);
        self
    }

    /// Mark the dependency as unattainable.
    pub fn unattainable(mut self) -> Self {
        self.unattainable = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_display_task_id_is_not_an_execution_task() {
        let task = Task::new("t1", "compile", "v1").owned_by("");
        assert!(!task.is_execution_task());

        let task = Task::new("t2", "compile", "v1").owned_by("display");
        assert!(task.is_execution_task());
    }

    #[test]
    fn test_derived_display_status() {
        let unscheduled = Task::new("t1", "lint", "v1");
        assert_eq!(
            unscheduled.effective_display_status(),
            DisplayStatus::Unscheduled
        );

        let will_run = Task::new("t2", "lint", "v1").activated();
        assert_eq!(will_run.effective_display_status(), DisplayStatus::WillRun);

        let blocked = Task::new("t3", "lint", "v1")
            .activated()
            .with_dependency(Dependency::new("t0").unattainable());
        assert_eq!(blocked.effective_display_status(), DisplayStatus::Blocked);

        let aborted = Task::new("t4", "lint", "v1")
            .activated()
            .with_dependency(Dependency::new("t0").unattainable())
            .aborted();
        assert_eq!(aborted.effective_display_status(), DisplayStatus::Aborted);

        let failed = Task::new("t5", "lint", "v1").with_status(TaskStatus::Failed);
        assert_eq!(failed.effective_display_status(), DisplayStatus::Failed);
    }

    #[test]
    fn test_persisted_display_status_wins() {
        let task = Task::new("t1", "lint", "v1")
            .activated()
            .with_display_status(DisplayStatus::Blocked);
        assert_eq!(task.effective_display_status(), DisplayStatus::Blocked);
    }

    #[test]
    fn test_validate_rejects_execution_display_task() {
        let task = Task::new("t1", "lint", "v1")
            .owned_by("display")
            .with_execution_tasks(["e1"]);
        assert!(matches!(
            task.validate(),
            Err(CoreError::InvalidTask { .. })
        ));

        let display = Task::new("t2", "lint", "v1").with_execution_tasks(["e1", "e2"]);
        assert!(display.validate().is_ok());
        assert!(display.is_display_task_with_children());
    }

    #[test]
    fn test_dependency_status_wildcard() {
        let dep: Dependency =
            serde_json::from_str(r#"{"task_id":"t0","status":"*","unattainable":true}"#).unwrap();
        assert_eq!(dep.status, DependencyStatus::Any);
        assert!(dep.unattainable);

        let dep = Dependency::new("t0").requiring(TaskStatus::Success);
        assert_eq!(dep.status, DependencyStatus::Exactly(TaskStatus::Success));
        assert_eq!(
            serde_json::to_value(&dep).unwrap()["status"],
            serde_json::json!("success")
        );
    }

    #[test]
    fn test_task_deserializes_with_defaults() {
        let task: Task = serde_json::from_str(
            r#"{"id":"t1","display_name":"test-agent","version":"v1","status":"failed"}"#,
        )
        .unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.depends_on.is_empty());
        assert!(!task.is_execution_task());
    }
}
