use std::path::Path;

use domain_snapshot::model::entity::{Backup, SnapshotClass, VolumeSnapshot, VolumeSnapshotContent};
use tracing::info;

use crate::{ClusterManifest, Table};

/// Snapshot classes, requests, contents and backups held in memory.
#[derive(Default)]
pub struct MemoryStore {
    classes: Table<SnapshotClass>,
    snapshots: Table<VolumeSnapshot>,
    contents: Table<VolumeSnapshotContent>,
    backups: Table<Backup>,
}

impl MemoryStore {
    pub fn classes(&self) -> &Table<SnapshotClass> {
        &self.classes
    }

    pub fn snapshots(&self) -> &Table<VolumeSnapshot> {
        &self.snapshots
    }

    pub fn contents(&self) -> &Table<VolumeSnapshotContent> {
        &self.contents
    }

    pub fn backups(&self) -> &Table<Backup> {
        &self.backups
    }

    pub fn from_manifest(manifest: ClusterManifest) -> Self {
        let store = Self::default();
        for class in manifest.volume_snapshot_classes {
            store.classes.put(class);
        }
        for snapshot in manifest.volume_snapshots {
            store.snapshots.put(snapshot);
        }
        for content in manifest.volume_snapshot_contents {
            store.contents.put(content);
        }
        for backup in manifest.backups {
            store.backups.put(backup);
        }
        store
    }

    pub fn to_manifest(&self) -> ClusterManifest {
        ClusterManifest {
            volume_snapshot_classes: self.classes.list(),
            volume_snapshots: self.snapshots.list(),
            volume_snapshot_contents: self.contents.list(),
            backups: self.backups.list(),
        }
    }

    pub async fn load_manifest(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let store = Self::from_manifest(ClusterManifest::load(path).await?);
        info!(
            "Loaded {} snapshot classes, {} volume snapshots, {} contents and {} backups from {}",
            store.classes.len(),
            store.snapshots.len(),
            store.contents.len(),
            store.backups.len(),
            path.display()
        );
        Ok(store)
    }

    pub async fn dump_manifest(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        self.to_manifest().dump(path).await
    }
}
