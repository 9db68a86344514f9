use async_trait::async_trait;

use crate::model::entity::VolumeSnapshot;

#[async_trait]
pub trait VolumeSnapshotRepo: Send + Sync {
    async fn get_by_name(&self, namespace: &str, name: &str)
        -> anyhow::Result<Option<VolumeSnapshot>>;
    /// Requests across every namespace.
    async fn get_all(&self) -> anyhow::Result<Vec<VolumeSnapshot>>;
    /// Removes the request and returns what was removed; `None` if it was already gone.
    async fn delete(&self, namespace: &str, name: &str) -> anyhow::Result<Option<VolumeSnapshot>>;
}
