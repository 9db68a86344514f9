use std::time::Duration;

use async_trait::async_trait;

use crate::exception::SnapshotResult;
use crate::model::entity::{VolumeSnapshot, VolumeSnapshotContent};

/// Observes the asynchronous binding of a snapshot request to its content.
#[async_trait]
pub trait SnapshotContentWaiterService: Send + Sync {
    /// With `wait == false`, one read: `Ok(None)` while binding is not visible
    /// yet, the content once it is, and an error if the bound name does not
    /// resolve.
    ///
    /// With `wait == true`, polls until the request is bound to an existing
    /// content or `timeout` elapses.
    async fn get_bound_content(
        &self,
        snapshot: &VolumeSnapshot,
        wait: bool,
        timeout: Duration,
    ) -> SnapshotResult<Option<VolumeSnapshotContent>>;

    async fn snapshot_exists(&self, namespace: &str, name: &str) -> SnapshotResult<bool>;
}
