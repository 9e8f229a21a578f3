//! Entry point for the presentation layer.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use rollcall_core::{
    can_restart_task, can_schedule_task, MatchingTasksOptions, Task, Version,
    VersionDisplayStatus, VersionId,
};

use crate::config::EngineConfig;
use crate::display::{self, DisplayStatusReport};
use crate::error::Result;
use crate::matcher;
use crate::store::Store;

/// Status, eligibility and matching queries over a store.
///
/// The engine never writes to the store.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn Store>,
    config: EngineConfig,
}

impl Engine {
    /// Create a new Engine.
    pub fn new(store: Arc<dyn Store>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Display status of a version.
    pub async fn display_status(&self, version: &Version) -> Result<VersionDisplayStatus> {
        display::display_status(&*self.store, version).await
    }

    /// Display status of a version with its child patch versions.
    pub async fn display_status_report(&self, version: &Version) -> Result<DisplayStatusReport> {
        display::display_status_report(&*self.store, version).await
    }

    /// Whether a user may restart `task`.
    pub fn can_restart_task(&self, task: &Task) -> bool {
        can_restart_task(task)
    }

    /// Whether a user may schedule `task`.
    pub fn can_schedule_task(&self, task: &Task) -> bool {
        can_schedule_task(task)
    }

    /// Map each version id to whether the version has a task matching `filter`.
    pub async fn match_versions(
        &self,
        versions: &[Version],
        filter: &MatchingTasksOptions,
    ) -> Result<HashMap<VersionId, bool>> {
        self.match_versions_with_cancel(versions, filter, &CancellationToken::new())
            .await
    }

    /// Like [`Engine::match_versions`], stopping early when `cancel` fires.
    pub async fn match_versions_with_cancel(
        &self,
        versions: &[Version],
        filter: &MatchingTasksOptions,
        cancel: &CancellationToken,
    ) -> Result<HashMap<VersionId, bool>> {
        matcher::match_versions(
            self.store.clone(),
            versions,
            filter,
            self.config.max_concurrent_queries.resolve(),
            cancel,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limit;
    use crate::state::MemoryStore;
    use std::num::NonZeroUsize;
    use rollcall_core::{DisplayStatus, Patch, Requester, TaskStatus, VersionStatus};

    #[tokio::test]
    async fn test_engine_end_to_end() {
        let store = MemoryStore::new();
        let parent = Version::new("p1")
            .with_requester(Requester::PatchRequest)
            .with_status(VersionStatus::Success)
            .with_activated(true)
            .aborted();
        store.insert_version(parent.clone()).await;
        store.insert_patch(Patch::new("p1").with_child("c1")).await;
        store
            .insert_version(Version::new("c1").with_status(VersionStatus::Failed))
            .await;
        store
            .insert_task(
                Task::new("t1", "unit-tests", "p1")
                    .with_build_variant("ubuntu", "Ubuntu 22.04")
                    .with_status(TaskStatus::Failed),
            )
            .await
            .unwrap();

        let engine = Engine::new(
            store.clone(),
            EngineConfig::default()
                .with_max_concurrent_queries(Limit::from(NonZeroUsize::new(2).unwrap())),
        );

        assert_eq!(
            engine.display_status(&parent).await.unwrap(),
            VersionDisplayStatus::Aborted
        );

        let task = store.task(&"t1".into()).await.unwrap();
        assert!(engine.can_restart_task(&task));
        assert!(!engine.can_schedule_task(&task));

        let unscheduled = Task::new("t2", "lint", "p1").with_display_status(DisplayStatus::Unscheduled);
        assert!(engine.can_schedule_task(&unscheduled));

        let map = engine
            .match_versions(
                &[parent],
                &MatchingTasksOptions::default().with_variant("ubuntu"),
            )
            .await
            .unwrap();
        assert_eq!(map.get(&VersionId::new("p1")), Some(&true));
    }
}
