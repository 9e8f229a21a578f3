//! Version and Patch types.

use serde::{Deserialize, Serialize};

use crate::{PatchId, Requester, VersionId, VersionStatus};

/// A Version is one build of a project: a mainline commit or a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Unique version identifier.
    pub id: VersionId,

    /// Raw rollup status.
    #[serde(default)]
    pub status: VersionStatus,

    /// Whether the version was aborted.
    #[serde(default)]
    pub aborted: bool,

    /// What triggered this version.
    #[serde(default)]
    pub requester: Requester,

    /// Whether the version has been activated. `None` means never decided.
    #[serde(default)]
    pub activated: Option<bool>,
}

impl Version {
    /// Create a new mainline Version in the `created` state.
    pub fn new(id: impl Into<VersionId>) -> Self {
        Self {
            id: id.into(),
            status: VersionStatus::Created,
            aborted: false,
            requester: Requester::GitterRequest,
            activated: None,
        }
    }

    /// Builder method to set the raw status.
    pub fn with_status(mut self, status: VersionStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder method to set the requester.
    pub fn with_requester(mut self, requester: Requester) -> Self {
        self.requester = requester;
        self
    }

    /// Builder method to set the activation flag.
    pub fn with_activated(mut self, activated: bool) -> Self {
        self.activated = Some(activated);
        self
    }

    /// Mark the version as aborted.
    pub fn aborted(mut self) -> Self {
        self.aborted = true;
        self
    }

    /// Check if the version was explicitly activated.
    pub fn is_activated(&self) -> bool {
        self.activated == Some(true)
    }
}

/// Downstream patches created from a parent patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerInfo {
    /// Child patch ids, in creation order.
    #[serde(default)]
    pub child_patches: Vec<PatchId>,
}

/// A Patch is a user-submitted change; it shares its id with its Version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    /// Patch identifier, equal to the version id.
    pub id: PatchId,

    /// Raw rollup status.
    #[serde(default)]
    pub status: VersionStatus,

    /// Child patch references.
    #[serde(default)]
    pub triggers: TriggerInfo,
}

impl Patch {
    /// Create a new Patch with no children.
    pub fn new(id: impl Into<PatchId>) -> Self {
        Self {
            id: id.into(),
            status: VersionStatus::Created,
            triggers: TriggerInfo::default(),
        }
    }

    /// Builder method to set the raw status.
    pub fn with_status(mut self, status: VersionStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder method to add a child patch.
    pub fn with_child(mut self, child: impl Into<PatchId>) -> Self {
        self.triggers.child_patches.push(child.into());
        self
    }

    /// Check if this patch has downstream children.
    pub fn has_children(&self) -> bool {
        !self.triggers.child_patches.is_empty()
    }
}
