use async_trait::async_trait;

use crate::exception::SnapshotResult;
use crate::model::vo::DeletionPolicy;

/// Writes to snapshot contents, which the snapshot controller also writes.
///
/// Every write is compare-and-retry: re-read, re-check, write with the read
/// resource version, and start over on conflict.
#[async_trait]
pub trait DeletionPolicyService: Send + Sync {
    /// Sets the content's deletion policy. No write happens if it is already `policy`.
    async fn set_deletion_policy(&self, content_name: &str, policy: DeletionPolicy)
        -> SnapshotResult<()>;

    /// Points the content's request reference at a placeholder and makes its
    /// source the static snapshot handle, so the controller no longer ties it
    /// to a live request.
    async fn detach_snapshot_ref(&self, content_name: &str) -> SnapshotResult<()>;
}
