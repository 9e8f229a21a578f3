//! Read-only access to persisted tasks, versions and patches.

use async_trait::async_trait;

use rollcall_core::{MatchingTasksOptions, Patch, Task, Version, VersionId};

use crate::error::StoreError;

/// Narrow query interface over the persistent store.
///
/// Lookups by id return `Ok(None)` when the entity does not exist; errors are
/// reserved for store failures.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load a version by id.
    async fn find_version_by_id(&self, id: &VersionId) -> Result<Option<Version>, StoreError>;

    /// Load the tasks of a version.
    ///
    /// Implementations should apply `filter` server-side where they can;
    /// callers re-check every returned task.
    async fn find_tasks_by_version(
        &self,
        version: &VersionId,
        filter: &MatchingTasksOptions,
    ) -> Result<Vec<Task>, StoreError>;

    /// Load the patch that created a version.
    async fn find_patch_by_version_id(&self, id: &VersionId) -> Result<Option<Patch>, StoreError>;
}
