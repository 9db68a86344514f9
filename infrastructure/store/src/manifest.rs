use std::path::Path;

use anyhow::Context;
use domain_snapshot::model::entity::{Backup, SnapshotClass, VolumeSnapshot, VolumeSnapshotContent};
use serde::{Deserialize, Serialize};

/// Snapshot-related cluster state as a YAML document.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterManifest {
    #[serde(default)]
    pub volume_snapshot_classes: Vec<SnapshotClass>,
    #[serde(default)]
    pub volume_snapshots: Vec<VolumeSnapshot>,
    #[serde(default)]
    pub volume_snapshot_contents: Vec<VolumeSnapshotContent>,
    #[serde(default)]
    pub backups: Vec<Backup>,
}

impl ClusterManifest {
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read manifest {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("Cannot parse manifest {}", path.display()))
    }

    pub async fn dump(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        tokio::fs::write(path, self.to_yaml()?)
            .await
            .with_context(|| format!("Cannot write manifest {}", path.display()))
    }
}
