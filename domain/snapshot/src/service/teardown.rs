use async_trait::async_trait;

use crate::model::entity::{Backup, VolumeSnapshot, VolumeSnapshotContent};

/// Removes a snapshot request while keeping the physical snapshot.
#[async_trait]
pub trait SnapshotTeardownService: Send + Sync {
    /// Best effort: failures are logged, never returned, so one bad snapshot
    /// does not hold up the rest of a backup's cleanup.
    async fn delete_snapshot(
        &self,
        snapshot: &VolumeSnapshot,
        content: Option<&VolumeSnapshotContent>,
        backup: &Backup,
    );
}
