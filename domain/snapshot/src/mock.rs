use crate::{
    exception::SnapshotResult,
    model::{
        entity::{SnapshotClass, VolumeSnapshot, VolumeSnapshotContent},
        vo::DeletionPolicy,
    },
    repository::{SnapshotClassRepo, VolumeSnapshotContentRepo, VolumeSnapshotRepo},
    service::DeletionPolicyService,
};
use async_trait::async_trait;
use mockall::mock;

mock! {
    pub SnapshotClassRepo {}
    #[async_trait]
    impl SnapshotClassRepo for SnapshotClassRepo {
        async fn get_by_name(&self, name: &str) -> anyhow::Result<Option<SnapshotClass>>;
        async fn get_all(&self) -> anyhow::Result<Vec<SnapshotClass>>;
    }
}

mock! {
    pub VolumeSnapshotRepo {}
    #[async_trait]
    impl VolumeSnapshotRepo for VolumeSnapshotRepo {
        async fn get_by_name(&self, namespace: &str, name: &str) -> anyhow::Result<Option<VolumeSnapshot>>;
        async fn get_all(&self) -> anyhow::Result<Vec<VolumeSnapshot>>;
        async fn delete(&self, namespace: &str, name: &str) -> anyhow::Result<Option<VolumeSnapshot>>;
    }
}

mock! {
    pub VolumeSnapshotContentRepo {}
    #[async_trait]
    impl VolumeSnapshotContentRepo for VolumeSnapshotContentRepo {
        async fn get_by_name(&self, name: &str) -> anyhow::Result<Option<VolumeSnapshotContent>>;
        async fn get_all(&self) -> anyhow::Result<Vec<VolumeSnapshotContent>>;
        async fn update(&self, content: &VolumeSnapshotContent) -> anyhow::Result<VolumeSnapshotContent>;
    }
}

mock! {
    pub DeletionPolicyService {}
    #[async_trait]
    impl DeletionPolicyService for DeletionPolicyService {
        async fn set_deletion_policy(&self, content_name: &str, policy: DeletionPolicy) -> SnapshotResult<()>;
        async fn detach_snapshot_ref(&self, content_name: &str) -> SnapshotResult<()>;
    }
}
