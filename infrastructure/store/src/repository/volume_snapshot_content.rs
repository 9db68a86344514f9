use async_trait::async_trait;
use domain_snapshot::{
    model::entity::VolumeSnapshotContent, repository::VolumeSnapshotContentRepo,
};

use crate::MemoryStore;

#[async_trait]
impl VolumeSnapshotContentRepo for MemoryStore {
    async fn get_by_name(&self, name: &str) -> anyhow::Result<Option<VolumeSnapshotContent>> {
        Ok(self.contents().get(name))
    }

    async fn get_all(&self) -> anyhow::Result<Vec<VolumeSnapshotContent>> {
        Ok(self.contents().list())
    }

    async fn update(
        &self,
        content: &VolumeSnapshotContent,
    ) -> anyhow::Result<VolumeSnapshotContent> {
        self.contents().update(content)
    }
}
