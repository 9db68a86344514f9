use std::sync::Arc;

use domain_snapshot::service::{
    DeletionPolicyService, SnapshotContentWaiterService, SnapshotTeardownService,
};
use infrastructure_store::MemoryStore;
use service_snapshot::{
    DeletionPolicyServiceImpl, SnapshotContentWaiterServiceImpl, SnapshotTeardownServiceImpl,
};
use tokio::sync::watch;

use super::{config::KeeperConfig, service::BackupExpiryRunner};

/// Wires the store and the snapshot services together.
pub struct ServiceProvider {
    pub config: KeeperConfig,
    pub store: Arc<MemoryStore>,
    pub backup_expiry_runner: BackupExpiryRunner,
}

impl ServiceProvider {
    pub async fn build(
        config: KeeperConfig,
        shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<Self> {
        let store = Arc::new(MemoryStore::load_manifest(&config.manifest_path).await?);
        let snapshot_config = &config.snapshot;

        let content_waiter_service: Arc<dyn SnapshotContentWaiterService> = Arc::new(
            SnapshotContentWaiterServiceImpl::builder()
                .snapshot_repo(store.clone())
                .content_repo(store.clone())
                .poll_interval(snapshot_config.wait_interval())
                .await_snapshot_handle(snapshot_config.await_snapshot_handle)
                .shutdown(shutdown.clone())
                .build(),
        );
        let deletion_policy_service: Arc<dyn DeletionPolicyService> = Arc::new(
            DeletionPolicyServiceImpl::builder()
                .content_repo(store.clone())
                .max_conflict_retries(snapshot_config.max_conflict_retries)
                .conflict_backoff(snapshot_config.conflict_backoff())
                .build(),
        );
        let teardown_service: Arc<dyn SnapshotTeardownService> = Arc::new(
            SnapshotTeardownServiceImpl::builder()
                .snapshot_repo(store.clone())
                .deletion_policy_service(deletion_policy_service)
                .build(),
        );
        let backup_expiry_runner = BackupExpiryRunner::builder()
            .store(store.clone())
            .content_waiter_service(content_waiter_service)
            .teardown_service(teardown_service)
            .csi_snapshot_timeout(snapshot_config.csi_snapshot_timeout())
            .shutdown(shutdown)
            .build();

        Ok(Self {
            config,
            store,
            backup_expiry_runner,
        })
    }
}
