//! In-memory store backed by a snapshot of persisted state.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use rollcall_core::{MatchingTasksOptions, Patch, PatchId, Task, TaskId, Version, VersionId};

use crate::error::{ConfigError, StoreError};
use crate::store::Store;

/// A serialized dump of the entities the engine reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub versions: Vec<Version>,
    pub patches: Vec<Patch>,
    pub tasks: Vec<Task>,
}

impl Snapshot {
    /// Load a snapshot from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Store holding every entity in memory.
pub struct MemoryStore {
    /// Versions indexed by VersionId.
    versions: RwLock<HashMap<VersionId, Version>>,

    /// Patches indexed by PatchId.
    patches: RwLock<HashMap<PatchId, Patch>>,

    /// Tasks indexed by TaskId.
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl MemoryStore {
    /// Create an empty MemoryStore wrapped in Arc.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a MemoryStore holding the contents of `snapshot`.
    ///
    /// Every task is validated first; a task that breaks a structural
    /// invariant makes the whole snapshot corrupt.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Arc<Self>, StoreError> {
        for task in &snapshot.tasks {
            validate_task(task)?;
        }
        Ok(Arc::new(Self {
            versions: RwLock::new(
                snapshot
                    .versions
                    .into_iter()
                    .map(|v| (v.id.clone(), v))
                    .collect(),
            ),
            patches: RwLock::new(
                snapshot
                    .patches
                    .into_iter()
                    .map(|p| (p.id.clone(), p))
                    .collect(),
            ),
            tasks: RwLock::new(
                snapshot
                    .tasks
                    .into_iter()
                    .map(|t| (t.id.clone(), t))
                    .collect(),
            ),
        }))
    }

    /// Insert or replace a version.
    pub async fn insert_version(&self, version: Version) {
        self.versions
            .write()
            .await
            .insert(version.id.clone(), version);
    }

    /// Insert or replace a patch.
    pub async fn insert_patch(&self, patch: Patch) {
        self.patches.write().await.insert(patch.id.clone(), patch);
    }

    /// Insert or replace a task, rejecting one that breaks a structural invariant.
    pub async fn insert_task(&self, task: Task) -> Result<(), StoreError> {
        validate_task(&task)?;
        self.tasks.write().await.insert(task.id.clone(), task);
        Ok(())
    }

    /// Look up a task by id.
    pub async fn task(&self, id: &TaskId) -> Option<Task> {
        self.tasks.read().await.get(id).cloned()
    }

    /// All versions, ordered by id.
    pub async fn versions(&self) -> Vec<Version> {
        let mut versions: Vec<Version> = self.versions.read().await.values().cloned().collect();
        versions.sort_by(|a, b| a.id.cmp(&b.id));
        versions
    }

    /// Get the number of tasks.
    pub async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }
}

fn validate_task(task: &Task) -> Result<(), StoreError> {
    task.validate().map_err(|err| StoreError::Corrupt(err.to_string()))
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            versions: RwLock::new(HashMap::new()),
            patches: RwLock::new(HashMap::new()),
            tasks: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_version_by_id(&self, id: &VersionId) -> Result<Option<Version>, StoreError> {
        Ok(self.versions.read().await.get(id).cloned())
    }

    async fn find_tasks_by_version(
        &self,
        version: &VersionId,
        filter: &MatchingTasksOptions,
    ) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        let mut found: Vec<Task> = tasks
            .values()
            .filter(|t| &t.version == version && filter.matches(t))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn find_patch_by_version_id(&self, id: &VersionId) -> Result<Option<Patch>, StoreError> {
        Ok(self.patches.read().await.get(&PatchId::from(id)).cloned())
    }
}
