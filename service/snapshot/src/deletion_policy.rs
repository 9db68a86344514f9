use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use domain_snapshot::{
    exception::{SnapshotException, SnapshotResult},
    model::{
        entity::{
            volume_snapshot_content::VolumeSnapshotContentSource, Object, VolumeSnapshot,
            VolumeSnapshotContent,
        },
        vo::{keys, DeletionPolicy, ObjectReference},
    },
    repository::VolumeSnapshotContentRepo,
    service::DeletionPolicyService,
};
use rand::Rng;
use tracing::debug;
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
pub struct DeletionPolicyServiceImpl {
    content_repo: Arc<dyn VolumeSnapshotContentRepo>,
    /// Conflicting writes tolerated before giving up.
    #[builder(default = 5)]
    max_conflict_retries: usize,
    #[builder(default = Duration::from_millis(10))]
    conflict_backoff: Duration,
}

impl DeletionPolicyServiceImpl {
    /// Re-reads the content and applies `mutate` until the write is not rejected
    /// as stale. `mutate` returns `false` when the content needs no change.
    async fn update_with_retry<F>(&self, name: &str, mutate: F) -> SnapshotResult<()>
    where
        F: Fn(&mut VolumeSnapshotContent) -> bool + Send + Sync,
    {
        let mut conflicts = 0;
        loop {
            let mut content = self
                .content_repo
                .get_by_name(name)
                .await?
                .ok_or_else(|| SnapshotException::not_found(VolumeSnapshotContent::KIND, name))?;
            if !mutate(&mut content) {
                debug!("Volume snapshot content {name} already up to date");
                return Ok(());
            }
            match self.content_repo.update(&content).await {
                Ok(_) => return Ok(()),
                Err(e) => {
                    let e = SnapshotException::from(e);
                    if !e.is_conflict() {
                        return Err(e);
                    }
                    conflicts += 1;
                    if conflicts > self.max_conflict_retries {
                        return Err(SnapshotException::RetriesExhausted {
                            name: name.to_string(),
                            attempts: conflicts,
                        });
                    }
                    let backoff = jittered(self.conflict_backoff);
                    debug!("Conflict writing volume snapshot content {name}, retrying in {backoff:?}");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// `base` plus up to 10% jitter.
fn jittered(base: Duration) -> Duration {
    let spread = base.as_millis() as u64 / 10;
    base + Duration::from_millis(rand::thread_rng().gen_range(0..=spread))
}

fn detach(content: &mut VolumeSnapshotContent) -> bool {
    if content.is_detached() {
        return false;
    }
    let snapshot_handle = content.snapshot_handle().map(str::to_string);
    let old = std::mem::take(&mut content.spec.volume_snapshot_ref);
    content.metadata.annotations.insert(
        keys::DETACHED_FROM_ANNOTATION.to_string(),
        format!("{}/{}", old.namespace, old.name),
    );
    let uid = old.uid.map(|uid| uid.to_string()).unwrap_or_default();
    content.spec.volume_snapshot_ref = ObjectReference {
        api_version: old.api_version,
        kind: Some(VolumeSnapshot::KIND.to_string()),
        namespace: format!("ns-{uid}"),
        name: format!("name-{uid}"),
        uid: None,
    };
    // Static from now on: the controller sees a pre-provisioned snapshot, not a volume to cut.
    content.spec.source = VolumeSnapshotContentSource {
        volume_handle: None,
        snapshot_handle,
    };
    true
}

#[async_trait]
impl DeletionPolicyService for DeletionPolicyServiceImpl {
    #[tracing::instrument(skip(self))]
    async fn set_deletion_policy(
        &self,
        content_name: &str,
        policy: DeletionPolicy,
    ) -> SnapshotResult<()> {
        self.update_with_retry(content_name, |content| {
            if content.spec.deletion_policy == Some(policy) {
                return false;
            }
            content.spec.deletion_policy = Some(policy);
            true
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn detach_snapshot_ref(&self, content_name: &str) -> SnapshotResult<()> {
        self.update_with_retry(content_name, detach).await
    }
}

#[cfg(test)]
mod tests {
    use domain_snapshot::model::entity::volume_snapshot_content::VolumeSnapshotContentStatus;

    use super::*;

    #[test]
    fn jitter_stays_within_a_tenth() {
        let base = Duration::from_millis(100);
        for _ in 0..50 {
            let d = jittered(base);
            assert!(d >= base && d <= Duration::from_millis(110));
        }
    }

    #[test]
    fn detach_points_ref_at_placeholder_once() {
        let mut content = VolumeSnapshotContent::new("vsc1");
        content.spec.volume_snapshot_ref.namespace = "prod".into();
        content.spec.volume_snapshot_ref.name = "vs1".into();
        content.spec.source.volume_handle = Some("vol-1".into());
        content.status = Some(VolumeSnapshotContentStatus {
            snapshot_handle: Some("snap-1".into()),
            ..Default::default()
        });

        assert!(detach(&mut content));
        let r = &content.spec.volume_snapshot_ref;
        assert_eq!((r.namespace.as_str(), r.name.as_str()), ("ns-", "name-"));
        assert_eq!(content.spec.source.snapshot_handle.as_deref(), Some("snap-1"));
        assert!(content.spec.source.volume_handle.is_none());

        assert!(!detach(&mut content));
    }

    #[test]
    fn request_named_like_a_placeholder_is_still_detached() {
        let mut content = VolumeSnapshotContent::new("vsc1");
        content.spec.volume_snapshot_ref.namespace = "ns-team".into();
        content.spec.volume_snapshot_ref.name = "name-daily".into();

        assert!(detach(&mut content));
        assert_eq!(
            content.metadata.annotation(keys::DETACHED_FROM_ANNOTATION),
            Some("ns-team/name-daily")
        );
        assert_eq!(content.spec.volume_snapshot_ref.name, "name-");
    }
}
