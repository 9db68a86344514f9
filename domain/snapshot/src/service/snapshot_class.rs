use async_trait::async_trait;

use crate::exception::SnapshotResult;
use crate::model::entity::{Backup, PersistentVolumeClaim, SnapshotClass};

/// Picks the snapshot class for a volume being backed up.
///
/// In order, first match wins:
/// 1. the claim's class annotation, if that class exists and uses `driver`;
/// 2. the backup's `<prefix>_<driver>` annotation, if that class exists;
/// 3. the single class for `driver` carrying the default selector label.
///
/// Read-only. Failures are returned as-is, nothing is retried here.
#[async_trait]
pub trait SnapshotClassResolverService: Send + Sync {
    async fn resolve(
        &self,
        driver: &str,
        backup: &Backup,
        claim: &PersistentVolumeClaim,
    ) -> SnapshotResult<SnapshotClass>;
}
