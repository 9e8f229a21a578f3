//! Display status of versions, including abort propagation from child patches.

use serde::Serialize;
use tracing::{debug, warn};

use rollcall_core::{Version, VersionDisplayStatus, VersionId, VersionStatus};

use crate::error::{EngineError, Result};
use crate::store::Store;

/// Derived status of a version together with the child versions it considered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayStatusReport {
    pub version_id: VersionId,
    pub display_status: VersionDisplayStatus,
    /// First child that was aborted or did not succeed, when the version
    /// itself is aborted.
    pub aborted_by: Option<VersionId>,
    /// Child patch versions in the order the parent patch lists them.
    pub children: Vec<ChildStatus>,
}

/// Status of one child patch version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildStatus {
    pub version_id: VersionId,
    pub display_status: VersionDisplayStatus,
}

/// Derive the status users see for `version`.
pub async fn display_status(store: &dyn Store, version: &Version) -> Result<VersionDisplayStatus> {
    Ok(display_status_report(store, version).await?.display_status)
}

/// Derive the status users see for `version`, with its child patch versions.
///
/// An aborted version shows `aborted` even if its raw status is a success,
/// and the report names the first child that was aborted or did not succeed.
/// Child versions are loaded by id through the store; a child that cannot be
/// found is an error. A patch version whose patch record is missing is
/// treated as having no children.
pub async fn display_status_report(
    store: &dyn Store,
    version: &Version,
) -> Result<DisplayStatusReport> {
    let children = load_children(store, version).await?;

    let (display_status, aborted_by) = if version.aborted {
        let source = children.iter().find(|child| child_interrupted(child));
        if let Some(child) = source {
            debug!(
                version_id = %version.id,
                child_id = %child.id,
                "Abort propagated from child patch"
            );
        }
        (
            VersionDisplayStatus::Aborted,
            source.map(|child| child.id.clone()),
        )
    } else {
        (version.status.into(), None)
    };

    Ok(DisplayStatusReport {
        version_id: version.id.clone(),
        display_status,
        aborted_by,
        children: children
            .iter()
            .map(|child| ChildStatus {
                version_id: child.id.clone(),
                display_status: own_status(child),
            })
            .collect(),
    })
}

async fn load_children(store: &dyn Store, version: &Version) -> Result<Vec<Version>> {
    if !version.requester.is_patch() {
        return Ok(Vec::new());
    }

    let Some(patch) = store.find_patch_by_version_id(&version.id).await? else {
        warn!(
            version_id = %version.id,
            requester = ?version.requester,
            "Could not find the patch associated with this version"
        );
        return Ok(Vec::new());
    };
    if !patch.has_children() {
        return Ok(Vec::new());
    }

    let mut children = Vec::with_capacity(patch.triggers.child_patches.len());
    for child in &patch.triggers.child_patches {
        let child_id = child.version_id();
        let child_version = store
            .find_version_by_id(&child_id)
            .await?
            .ok_or_else(|| EngineError::version_not_found(&child_id))?;
        children.push(child_version);
    }
    Ok(children)
}

fn child_interrupted(child: &Version) -> bool {
    child.aborted || child.status != VersionStatus::Success
}

fn own_status(version: &Version) -> VersionDisplayStatus {
    if version.aborted {
        VersionDisplayStatus::Aborted
    } else {
        version.status.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::state::MemoryStore;
    use async_trait::async_trait;
    use rollcall_core::{MatchingTasksOptions, Patch, Requester, Task};

    #[tokio::test]
    async fn test_get_display_status() {
        let store = MemoryStore::new();
        let version = Version::new("5f3a")
            .aborted()
            .with_status(VersionStatus::Success)
            .with_requester(Requester::PatchRequest);
        store.insert_version(version.clone()).await;
        store
            .insert_patch(
                Patch::new("5f3a")
                    .with_status(VersionStatus::Success)
                    .with_child("6a1b"),
            )
            .await;
        store
            .insert_version(Version::new("6a1b").aborted().with_status(VersionStatus::Failed))
            .await;
        store
            .insert_patch(Patch::new("6a1b").with_status(VersionStatus::Failed))
            .await;

        let status = display_status(&*store, &version).await.unwrap();
        assert_eq!(status, VersionDisplayStatus::Aborted);

        let report = display_status_report(&*store, &version).await.unwrap();
        assert_eq!(report.aborted_by, Some(VersionId::new("6a1b")));
        assert_eq!(
            report.children,
            vec![ChildStatus {
                version_id: "6a1b".into(),
                display_status: VersionDisplayStatus::Aborted,
            }]
        );
    }

    #[tokio::test]
    async fn test_abort_source_is_first_unsuccessful_child() {
        let store = MemoryStore::new();
        let version = Version::new("p1")
            .aborted()
            .with_status(VersionStatus::Success)
            .with_requester(Requester::GithubPullRequest);
        store
            .insert_patch(
                Patch::new("p1")
                    .with_child("c1")
                    .with_child("c2")
                    .with_child("c3"),
            )
            .await;
        store
            .insert_version(Version::new("c1").with_status(VersionStatus::Success))
            .await;
        store
            .insert_version(Version::new("c2").with_status(VersionStatus::Failed))
            .await;
        store
            .insert_version(Version::new("c3").aborted())
            .await;

        let report = display_status_report(&*store, &version).await.unwrap();
        assert_eq!(report.display_status, VersionDisplayStatus::Aborted);
        assert_eq!(report.aborted_by, Some(VersionId::new("c2")));
        assert_eq!(report.children.len(), 3);
    }

    #[tokio::test]
    async fn test_aborted_version_with_successful_children_has_no_abort_source() {
        let store = MemoryStore::new();
        let version = Version::new("p1")
            .aborted()
            .with_requester(Requester::PatchRequest);
        store.insert_patch(Patch::new("p1").with_child("c1")).await;
        store
            .insert_version(Version::new("c1").with_status(VersionStatus::Success))
            .await;

        let report = display_status_report(&*store, &version).await.unwrap();
        assert_eq!(report.display_status, VersionDisplayStatus::Aborted);
        assert_eq!(report.aborted_by, None);
    }

    #[tokio::test]
    async fn test_unaborted_version_has_no_abort_source() {
        let store = MemoryStore::new();
        let version = Version::new("p1")
            .with_status(VersionStatus::Failed)
            .with_requester(Requester::PatchRequest);
        store.insert_patch(Patch::new("p1").with_child("c1")).await;
        store
            .insert_version(Version::new("c1").aborted())
            .await;

        let report = display_status_report(&*store, &version).await.unwrap();
        assert_eq!(report.display_status, VersionDisplayStatus::Failed);
        assert_eq!(report.aborted_by, None);
        assert_eq!(report.children[0].display_status, VersionDisplayStatus::Aborted);
    }

    #[tokio::test]
    async fn test_unaborted_version_shows_raw_status() {
        let store = MemoryStore::new();
        let version = Version::new("v1").with_status(VersionStatus::Failed);
        let status = display_status(&*store, &version).await.unwrap();
        assert_eq!(status, VersionDisplayStatus::Failed);
    }

    #[tokio::test]
    async fn test_aborted_mainline_version_is_aborted() {
        let store = MemoryStore::new();
        let version = Version::new("v1").with_status(VersionStatus::Success).aborted();
        let status = display_status(&*store, &version).await.unwrap();
        assert_eq!(status, VersionDisplayStatus::Aborted);
    }

    #[tokio::test]
    async fn test_missing_child_version_is_not_found() {
        let store = MemoryStore::new();
        let version = Version::new("p1")
            .aborted()
            .with_requester(Requester::GithubPullRequest);
        store.insert_patch(Patch::new("p1").with_child("gone")).await;

        let err = display_status(&*store, &version).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::NotFound { kind: "version", ref id } if id == "gone"
        ));
    }

    #[tokio::test]
    async fn test_missing_patch_degrades_to_no_children() {
        let store = MemoryStore::new();
        let version = Version::new("p1")
            .with_status(VersionStatus::Started)
            .with_requester(Requester::PatchRequest);

        let report = display_status_report(&*store, &version).await.unwrap();
        assert_eq!(report.display_status, VersionDisplayStatus::Started);
        assert!(report.children.is_empty());
    }

    struct BrokenStore;

    #[async_trait]
    impl Store for BrokenStore {
        async fn find_version_by_id(
            &self,
            _id: &VersionId,
        ) -> std::result::Result<Option<Version>, StoreError> {
            Err(StoreError::Unavailable("connection reset".into()))
        }

        async fn find_tasks_by_version(
            &self,
            _version: &VersionId,
            _filter: &MatchingTasksOptions,
        ) -> std::result::Result<Vec<Task>, StoreError> {
            Err(StoreError::Unavailable("connection reset".into()))
        }

        async fn find_patch_by_version_id(
            &self,
            _id: &VersionId,
        ) -> std::result::Result<Option<Patch>, StoreError> {
            Err(StoreError::Unavailable("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_persistence_error() {
        let version = Version::new("p1").with_requester(Requester::PatchRequest);
        let err = display_status(&BrokenStore, &version).await.unwrap_err();
        assert!(matches!(err, EngineError::Persistence(_)));
    }
}
