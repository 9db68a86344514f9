use async_trait::async_trait;
use domain_snapshot::{model::entity::VolumeSnapshot, repository::VolumeSnapshotRepo};
use tracing::debug;

use crate::MemoryStore;

#[inline]
fn key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

#[async_trait]
impl VolumeSnapshotRepo for MemoryStore {
    async fn get_by_name(
        &self,
        namespace: &str,
        name: &str,
    ) -> anyhow::Result<Option<VolumeSnapshot>> {
        Ok(self.snapshots().get(&key(namespace, name)))
    }

    async fn get_all(&self) -> anyhow::Result<Vec<VolumeSnapshot>> {
        Ok(self.snapshots().list())
    }

    async fn delete(&self, namespace: &str, name: &str) -> anyhow::Result<Option<VolumeSnapshot>> {
        let removed = self.snapshots().remove(&key(namespace, name));
        if removed.is_some() {
            debug!("Removed volume snapshot {namespace}/{name} from store");
        }
        Ok(removed)
    }
}
