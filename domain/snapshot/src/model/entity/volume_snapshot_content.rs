use serde::{Deserialize, Serialize};

use super::volume_snapshot::SnapshotError;
use crate::model::vo::{keys, DeletionPolicy, ObjectMeta, ObjectReference};

/// The provider-facing object standing for the physical snapshot.
///
/// Shared with the snapshot controller, so every write must carry the
/// resource version it was read at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotContent {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: VolumeSnapshotContentSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VolumeSnapshotContentStatus>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotContentSpec {
    /// The request this content is bound to.
    #[serde(default)]
    pub volume_snapshot_ref: ObjectReference,
    /// Unset until either the controller or a user picks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<DeletionPolicy>,
    #[serde(default)]
    pub driver: String,
    #[serde(default)]
    pub source: VolumeSnapshotContentSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_snapshot_class_name: Option<String>,
}

/// Either a volume to snapshot dynamically, or a pre-existing snapshot handle.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotContentSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_handle: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSnapshotContentStatus {
    /// Provider identifier of the physical snapshot, set once it is cut.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_to_use: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SnapshotError>,
}

impl VolumeSnapshotContent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            spec: Default::default(),
            status: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn snapshot_handle(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.snapshot_handle.as_deref())
    }

    pub fn status_error(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.error.as_ref())
            .and_then(|e| e.message.as_deref())
    }

    /// Whether the reference has already been pointed away from any live request.
    pub fn is_detached(&self) -> bool {
        self.metadata
            .annotation(keys::DETACHED_FROM_ANNOTATION)
            .is_some()
    }
}
