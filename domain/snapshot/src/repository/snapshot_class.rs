use async_trait::async_trait;

use crate::model::entity::SnapshotClass;

#[async_trait]
pub trait SnapshotClassRepo: Send + Sync {
    async fn get_by_name(&self, name: &str) -> anyhow::Result<Option<SnapshotClass>>;
    async fn get_all(&self) -> anyhow::Result<Vec<SnapshotClass>>;
}
