use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::vo::{keys, DeletionPolicy, ObjectMeta};

/// Admin-defined template selecting the provider driver and secrets for new snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotClass {
    pub metadata: ObjectMeta,
    /// Provider driver name, e.g. `hostpath.csi.k8s.io`.
    pub driver: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<DeletionPolicy>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl SnapshotClass {
    pub fn new(name: impl Into<String>, driver: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            driver: driver.into(),
            deletion_policy: None,
            parameters: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Whether the class carries the default-selector label, whatever its value.
    pub fn is_default_selected(&self) -> bool {
        self.metadata
            .labels
            .contains_key(keys::VOLUME_SNAPSHOT_CLASS_SELECTOR_LABEL)
    }
}
