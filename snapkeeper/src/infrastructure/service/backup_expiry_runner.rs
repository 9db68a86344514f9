use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use domain_snapshot::{
    helper::has_backup_label,
    model::entity::{backup::BackupPhase, Backup, VolumeSnapshot, VolumeSnapshotContent},
    service::{SnapshotContentWaiterService, SnapshotTeardownService},
};
use futures::future::join_all;
use infrastructure_store::MemoryStore;
use tokio::sync::watch;
use tracing::{info, warn};
use typed_builder::TypedBuilder;

/// Tears down the snapshot requests of backups past their expiration.
#[derive(TypedBuilder, Clone)]
pub struct BackupExpiryRunner {
    store: Arc<MemoryStore>,
    content_waiter_service: Arc<dyn SnapshotContentWaiterService>,
    teardown_service: Arc<dyn SnapshotTeardownService>,
    csi_snapshot_timeout: Duration,
    shutdown: watch::Receiver<bool>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExpiryReport {
    pub backups: usize,
    pub snapshots: usize,
}

impl BackupExpiryRunner {
    pub async fn run(&self, now: DateTime<Utc>) -> ExpiryReport {
        let mut report = ExpiryReport::default();
        let expired = self
            .store
            .backups()
            .list()
            .into_iter()
            .filter(|b| b.is_expired_at(now))
            .filter(|b| b.status.as_ref().and_then(|s| s.phase) != Some(BackupPhase::Deleting));
        for backup in expired {
            if *self.shutdown.borrow() {
                info!("Shutdown requested, leaving the remaining expired backups for the next run");
                break;
            }
            self.expire(&backup, &mut report).await;
        }
        report
    }

    fn requests_of(&self, backup: &Backup) -> Vec<VolumeSnapshot> {
        self.store
            .snapshots()
            .list()
            .into_iter()
            .filter(|s| has_backup_label(&s.metadata, backup.name()))
            .collect()
    }

    #[tracing::instrument(skip_all, fields(backup = backup.name()))]
    async fn expire(&self, backup: &Backup, report: &mut ExpiryReport) {
        let snapshots = self.requests_of(backup);

        let mut contents: Vec<Option<VolumeSnapshotContent>> = Vec::with_capacity(snapshots.len());
        for snapshot in &snapshots {
            let content = self
                .content_waiter_service
                .get_bound_content(snapshot, false, self.csi_snapshot_timeout)
                .await
                .unwrap_or_else(|e| {
                    warn!(
                        "Cannot look up the content of volume snapshot {}: {e}",
                        snapshot.metadata.key()
                    );
                    None
                });
            contents.push(content);
        }

        join_all(
            snapshots
                .iter()
                .zip(&contents)
                .map(|(snapshot, content)| {
                    self.teardown_service
                        .delete_snapshot(snapshot, content.as_ref(), backup)
                }),
        )
        .await;

        let remaining = self.requests_of(backup).len();
        report.snapshots += snapshots.len().saturating_sub(remaining);
        if remaining > 0 {
            warn!(
                "Backup {} still owns {remaining} volume snapshots, retrying on the next run",
                backup.metadata.key()
            );
            return;
        }

        let mut deleting = backup.clone();
        deleting.status.get_or_insert_with(Default::default).phase = Some(BackupPhase::Deleting);
        self.store.backups().put(deleting);
        report.backups += 1;
        info!(
            "Expired backup {} with {} volume snapshots",
            backup.metadata.key(),
            snapshots.len()
        );
    }
}
