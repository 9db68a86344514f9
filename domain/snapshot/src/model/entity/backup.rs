use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::vo::{keys, ObjectMeta};

/// One backup run, owning the snapshots taken on its behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: BackupSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BackupStatus>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_namespaces: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<BackupPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupPhase {
    New,
    InProgress,
    Completed,
    PartiallyFailed,
    Failed,
    Deleting,
}

impl Backup {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::namespaced(namespace, name),
            spec: Default::default(),
            status: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The class name this backup pins for `driver`, if any.
    pub fn class_for_driver(&self, driver: &str) -> Option<&str> {
        self.metadata
            .annotation(&keys::backup_class_annotation(driver))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.expiration)
            .is_some_and(|expiration| expiration <= now)
    }
}
