use async_trait::async_trait;
use domain_snapshot::{model::entity::SnapshotClass, repository::SnapshotClassRepo};

use crate::MemoryStore;

#[async_trait]
impl SnapshotClassRepo for MemoryStore {
    async fn get_by_name(&self, name: &str) -> anyhow::Result<Option<SnapshotClass>> {
        Ok(self.classes().get(name))
    }

    async fn get_all(&self) -> anyhow::Result<Vec<SnapshotClass>> {
        Ok(self.classes().list())
    }
}
