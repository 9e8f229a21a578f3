//! rollcall Core Domain Types
//!
//! This crate contains pure domain types and rules with no dependencies on:
//! - Async runtimes
//! - The persistent store
//! - Presentation layers
//!
//! Everything here is a read-only view of state persisted by the upstream
//! scheduling and dispatch subsystems, plus the pure eligibility rules over it.

pub mod eligibility;
pub mod error;
pub mod filter;
pub mod ids;
pub mod status;
pub mod task;
pub mod version;

// Re-export commonly used types
pub use eligibility::{can_restart_task, can_schedule_task, EligibilityKey};
pub use error::CoreError;
pub use filter::MatchingTasksOptions;
pub use ids::{PatchId, TaskId, VersionId};
pub use status::{DisplayStatus, Requester, TaskStatus, VersionDisplayStatus, VersionStatus};
pub use task::{Dependency, DependencyStatus, Task};
pub use version::{Patch, TriggerInfo, Version};
