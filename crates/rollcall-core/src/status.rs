//! Status vocabulary for Tasks and Versions.
//!
//! Raw statuses are what the dispatch subsystem persists. Display statuses are
//! what users see; they add synthesized states (`unscheduled`, `blocked`,
//! `aborted`, ...) that never appear as a raw lifecycle state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Raw lifecycle status of a Task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task exists but has not been handed to a host.
    #[default]
    Undispatched,
    /// Task has been handed to a host, which has not started it yet.
    Dispatched,
    /// Task is running on a host.
    Started,
    /// Task finished successfully.
    Success,
    /// Task finished with a failure.
    Failed,
    SetupFailed,
    SystemFailed,
    SystemTimedOut,
    SystemUnresponsive,
    TestTimedOut,
    TaskTimedOut,
    KnownIssue,
    /// Task was deactivated before it ran.
    Inactive,
}

impl TaskStatus {
    /// Every raw task status.
    pub const ALL: [TaskStatus; 13] = [
        Self::Undispatched,
        Self::Dispatched,
        Self::Started,
        Self::Success,
        Self::Failed,
        Self::SetupFailed,
        Self::SystemFailed,
        Self::SystemTimedOut,
        Self::SystemUnresponsive,
        Self::TestTimedOut,
        Self::TaskTimedOut,
        Self::KnownIssue,
        Self::Inactive,
    ];

    /// The persisted label for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undispatched => "undispatched",
            Self::Dispatched => "dispatched",
            Self::Started => "started",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::SetupFailed => "setup-failed",
            Self::SystemFailed => "system-failed",
            Self::SystemTimedOut => "system-timed-out",
            Self::SystemUnresponsive => "system-unresponsive",
            Self::TestTimedOut => "test-timed-out",
            Self::TaskTimedOut => "task-timed-out",
            Self::KnownIssue => "known-issue",
            Self::Inactive => "inactive",
        }
    }

    /// Returns true while a host holds the task.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Dispatched | Self::Started)
    }

    /// Returns true if the task has not run to completion.
    pub fn is_uncompleted(&self) -> bool {
        matches!(
            self,
            Self::Undispatched | Self::Dispatched | Self::Started | Self::Inactive
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

/// Status of a Task as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayStatus {
    Undispatched,
    Dispatched,
    Started,
    Success,
    Failed,
    SetupFailed,
    SystemFailed,
    SystemTimedOut,
    SystemUnresponsive,
    TestTimedOut,
    TaskTimedOut,
    KnownIssue,
    Inactive,
    /// Undispatched and not yet activated for a scheduling attempt.
    Unscheduled,
    /// Activated and waiting to be dispatched.
    WillRun,
    /// Waiting on a dependency that can never be satisfied.
    Blocked,
    /// The task was aborted.
    Aborted,
}

impl DisplayStatus {
    /// Every display status.
    pub const ALL: [DisplayStatus; 17] = [
        Self::Undispatched,
        Self::Dispatched,
        Self::Started,
        Self::Success,
        Self::Failed,
        Self::SetupFailed,
        Self::SystemFailed,
        Self::SystemTimedOut,
        Self::SystemUnresponsive,
        Self::TestTimedOut,
        Self::TaskTimedOut,
        Self::KnownIssue,
        Self::Inactive,
        Self::Unscheduled,
        Self::WillRun,
        Self::Blocked,
        Self::Aborted,
    ];

    /// The user-facing label for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undispatched => "undispatched",
            Self::Dispatched => "dispatched",
            Self::Started => "started",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::SetupFailed => "setup-failed",
            Self::SystemFailed => "system-failed",
            Self::SystemTimedOut => "system-timed-out",
            Self::SystemUnresponsive => "system-unresponsive",
            Self::TestTimedOut => "test-timed-out",
            Self::TaskTimedOut => "task-timed-out",
            Self::KnownIssue => "known-issue",
            Self::Inactive => "inactive",
            Self::Unscheduled => "unscheduled",
            Self::WillRun => "will-run",
            Self::Blocked => "blocked",
            Self::Aborted => "aborted",
        }
    }
}

impl From<TaskStatus> for DisplayStatus {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Undispatched => Self::Undispatched,
            TaskStatus::Dispatched => Self::Dispatched,
            TaskStatus::Started => Self::Started,
            TaskStatus::Success => Self::Success,
            TaskStatus::Failed => Self::Failed,
            TaskStatus::SetupFailed => Self::SetupFailed,
            TaskStatus::SystemFailed => Self::SystemFailed,
            TaskStatus::SystemTimedOut => Self::SystemTimedOut,
            TaskStatus::SystemUnresponsive => Self::SystemUnresponsive,
            TaskStatus::TestTimedOut => Self::TestTimedOut,
            TaskStatus::TaskTimedOut => Self::TaskTimedOut,
            TaskStatus::KnownIssue => Self::KnownIssue,
            TaskStatus::Inactive => Self::Inactive,
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

/// Raw lifecycle status of a Version or Patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionStatus {
    /// No task has started yet.
    #[default]
    Created,
    /// At least one task is running.
    Started,
    /// Every task succeeded.
    Success,
    /// At least one task failed.
    Failed,
}

impl VersionStatus {
    /// The persisted label for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a Version as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionDisplayStatus {
    Created,
    Started,
    Success,
    Failed,
    /// The version, or the patch tree it heads, was aborted.
    Aborted,
}

impl VersionDisplayStatus {
    /// The user-facing label for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        }
    }
}

impl From<VersionStatus> for VersionDisplayStatus {
    fn from(status: VersionStatus) -> Self {
        match status {
            VersionStatus::Created => Self::Created,
            VersionStatus::Started => Self::Started,
            VersionStatus::Success => Self::Success,
            VersionStatus::Failed => Self::Failed,
        }
    }
}

impl fmt::Display for VersionDisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What triggered the creation of a Version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requester {
    /// A user-submitted patch.
    PatchRequest,
    /// A GitHub pull request.
    GithubPullRequest,
    /// A merge queue entry.
    GithubMergeRequest,
    /// A mainline commit picked up by the repository tracker.
    #[default]
    GitterRequest,
    /// A downstream trigger from another project.
    TriggerRequest,
    /// A periodic or ad hoc build.
    AdHoc,
}

impl Requester {
    /// Returns true if versions with this requester are backed by a patch.
    pub fn is_patch(&self) -> bool {
        matches!(
            self,
            Self::PatchRequest | Self::GithubPullRequest | Self::GithubMergeRequest
        )
    }
}
