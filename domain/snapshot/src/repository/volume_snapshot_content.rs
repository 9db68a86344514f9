use async_trait::async_trait;

use crate::model::entity::VolumeSnapshotContent;

#[async_trait]
pub trait VolumeSnapshotContentRepo: Send + Sync {
    async fn get_by_name(&self, name: &str) -> anyhow::Result<Option<VolumeSnapshotContent>>;
    async fn get_all(&self) -> anyhow::Result<Vec<VolumeSnapshotContent>>;
    /// Writes `content` back if its resource version is still current.
    ///
    /// Fails with `SnapshotException::Conflict` when another writer got there
    /// first, and with `SnapshotException::NotFound` when the object is gone.
    async fn update(&self, content: &VolumeSnapshotContent)
        -> anyhow::Result<VolumeSnapshotContent>;
}
