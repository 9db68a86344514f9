use std::sync::Arc;

use async_trait::async_trait;
use domain_snapshot::{
    exception::SnapshotException,
    model::{
        entity::{Backup, VolumeSnapshot, VolumeSnapshotContent},
        vo::DeletionPolicy,
    },
    repository::VolumeSnapshotRepo,
    service::{DeletionPolicyService, SnapshotTeardownService},
};
use tracing::{debug, error, warn};
use typed_builder::TypedBuilder;

/// Deletes snapshot requests without losing the physical snapshots behind them.
///
/// The content is switched to `Retain` before the request goes away, because
/// the snapshot controller destroys the physical snapshot as soon as it sees
/// a `Delete` content lose its request. Contents themselves are never deleted
/// here; purging them belongs to whoever owns the backup.
#[derive(TypedBuilder)]
pub struct SnapshotTeardownServiceImpl {
    snapshot_repo: Arc<dyn VolumeSnapshotRepo>,
    deletion_policy_service: Arc<dyn DeletionPolicyService>,
}

impl SnapshotTeardownServiceImpl {
    /// Returns whether the request is gone; one that was already absent counts.
    async fn delete_request(&self, snapshot: &VolumeSnapshot) -> bool {
        let key = snapshot.metadata.key();
        match self
            .snapshot_repo
            .delete(snapshot.metadata.namespace(), &snapshot.metadata.name)
            .await
            .map_err(SnapshotException::from)
        {
            Ok(Some(_)) => {
                debug!("Deleted volume snapshot {key}");
                true
            }
            Ok(None) => {
                debug!("Volume snapshot {key} is already gone");
                true
            }
            Err(e) if e.is_not_found() => {
                debug!("Volume snapshot {key} is already gone");
                true
            }
            Err(e) => {
                error!("Fail to delete volume snapshot {key}: {e}");
                false
            }
        }
    }
}

#[async_trait]
impl SnapshotTeardownService for SnapshotTeardownServiceImpl {
    #[tracing::instrument(skip_all, fields(snapshot = %snapshot.metadata.key(), backup = backup.name()))]
    async fn delete_snapshot(
        &self,
        snapshot: &VolumeSnapshot,
        content: Option<&VolumeSnapshotContent>,
        backup: &Backup,
    ) {
        let key = snapshot.metadata.key();
        let Some(content_name) = snapshot.bound_content_name() else {
            // Never bound: there is no confirmed physical snapshot to protect.
            warn!("Volume snapshot {key} is not bound to a content, deleting the request only");
            self.delete_request(snapshot).await;
            return;
        };
        if let Some(content) = content.filter(|c| c.name() != content_name) {
            warn!(
                "Volume snapshot {key} is bound to {content_name}, not to the given content {}; using {content_name}",
                content.name()
            );
        }

        debug!("Setting volume snapshot content {content_name} deletion policy to Retain");
        if let Err(e) = self
            .deletion_policy_service
            .set_deletion_policy(content_name, DeletionPolicy::Retain)
            .await
        {
            error!(
                "Fail to set volume snapshot content {content_name} deletion policy to Retain, keeping volume snapshot {key}: {e}"
            );
            return;
        }

        if !self.delete_request(snapshot).await {
            // Still live, so the content keeps pointing at it.
            return;
        }

        if let Err(e) = self.deletion_policy_service.detach_snapshot_ref(content_name).await {
            warn!("Fail to detach volume snapshot content {content_name} from {key}: {e}");
        }
    }
}
