use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use domain_snapshot::{
    exception::{SnapshotException, SnapshotResult},
    model::entity::{Object, VolumeSnapshot, VolumeSnapshotContent},
    repository::{VolumeSnapshotContentRepo, VolumeSnapshotRepo},
    service::SnapshotContentWaiterService,
};
use tokio::{sync::watch, time::Instant};
use tracing::{error, info, warn};
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
pub struct SnapshotContentWaiterServiceImpl {
    snapshot_repo: Arc<dyn VolumeSnapshotRepo>,
    content_repo: Arc<dyn VolumeSnapshotContentRepo>,
    #[builder(default = Duration::from_secs(5))]
    poll_interval: Duration,
    /// Also wait for the provider to report a snapshot handle on the content.
    #[builder(default = true)]
    await_snapshot_handle: bool,
    /// Flips to `true` when the caller shuts down; pending waits return `Cancelled`.
    #[builder(default, setter(strip_option))]
    shutdown: Option<watch::Receiver<bool>>,
}

/// Why a wait attempt did not finish.
enum Pending {
    Unbound,
    ContentMissing(String),
    NoHandle { content: String, error: Option<String> },
}

impl fmt::Display for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pending::Unbound => f.write_str("not bound to a content yet"),
            Pending::ContentMissing(name) => write!(f, "bound content {name} does not exist yet"),
            Pending::NoHandle { content, .. } => {
                write!(f, "content {content} has no snapshot handle yet")
            }
        }
    }
}

impl Pending {
    fn into_error(self, snapshot: String, waited: Duration) -> SnapshotException {
        match self {
            Pending::ContentMissing(name) => {
                SnapshotException::not_found(VolumeSnapshotContent::KIND, name)
            }
            pending => SnapshotException::Timeout {
                kind: VolumeSnapshot::KIND,
                name: snapshot,
                waited,
                reason: pending.to_string(),
            },
        }
    }
}

enum Attempt {
    Ready(VolumeSnapshotContent),
    Pending(Pending),
}

impl SnapshotContentWaiterServiceImpl {
    async fn content(&self, name: &str) -> SnapshotResult<Option<VolumeSnapshotContent>> {
        Ok(self.content_repo.get_by_name(name).await?)
    }

    /// One look at the stored request and its content.
    async fn attempt(&self, snapshot: &VolumeSnapshot) -> SnapshotResult<Attempt> {
        let meta = &snapshot.metadata;
        let current = self
            .snapshot_repo
            .get_by_name(meta.namespace(), &meta.name)
            .await?
            .ok_or_else(|| SnapshotException::not_found(VolumeSnapshot::KIND, meta.key()))?;

        let Some(content_name) = current.bound_content_name() else {
            return Ok(Attempt::Pending(Pending::Unbound));
        };
        let Some(content) = self.content(content_name).await? else {
            return Ok(Attempt::Pending(Pending::ContentMissing(content_name.to_string())));
        };
        // A restore uses the handle as its source, so a content without one is not usable yet.
        if self.await_snapshot_handle && content.snapshot_handle().is_none() {
            return Ok(Attempt::Pending(Pending::NoHandle {
                content: content.name().to_string(),
                error: content.status_error().map(str::to_string),
            }));
        }
        Ok(Attempt::Ready(content))
    }

    async fn wait_for_content(
        &self,
        snapshot: &VolumeSnapshot,
        timeout: Duration,
    ) -> SnapshotResult<VolumeSnapshotContent> {
        let key = snapshot.metadata.key();
        let started = Instant::now();
        let deadline = started + timeout;
        let mut shutdown = self.shutdown.clone();

        loop {
            if shutdown.as_ref().is_some_and(|rx| *rx.borrow()) {
                return Err(SnapshotException::Cancelled);
            }
            let pending = match self.attempt(snapshot).await? {
                Attempt::Ready(content) => return Ok(content),
                Attempt::Pending(pending) => pending,
            };
            if let Pending::NoHandle {
                content,
                error: Some(e),
            } = &pending
            {
                warn!("Volume snapshot content {content} has error: {e}");
            }

            let now = Instant::now();
            if now >= deadline {
                error!("Timed out awaiting reconciliation of volume snapshot {key}: {pending}");
                return Err(pending.into_error(key, now - started));
            }
            info!(
                "Waiting for the snapshot controller to reconcile volume snapshot {key}, {pending}; retrying in {:?}",
                self.poll_interval
            );

            let nap = tokio::time::sleep(self.poll_interval.min(deadline - now));
            match shutdown.as_mut() {
                Some(rx) => tokio::select! {
                    _ = nap => {}
                    _ = cancelled(rx) => return Err(SnapshotException::Cancelled),
                },
                None => nap.await,
            }
        }
    }
}

/// Resolves once the shutdown flag is raised; never, if its sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl SnapshotContentWaiterService for SnapshotContentWaiterServiceImpl {
    #[tracing::instrument(skip_all, fields(snapshot = %snapshot.metadata.key(), wait = wait))]
    async fn get_bound_content(
        &self,
        snapshot: &VolumeSnapshot,
        wait: bool,
        timeout: Duration,
    ) -> SnapshotResult<Option<VolumeSnapshotContent>> {
        if wait {
            return self.wait_for_content(snapshot, timeout).await.map(Some);
        }
        let Some(content_name) = snapshot.bound_content_name() else {
            return Ok(None);
        };
        // A populated reference that does not resolve is a real problem, not latency.
        match self.content(content_name).await? {
            Some(content) => Ok(Some(content)),
            None => Err(SnapshotException::not_found(
                VolumeSnapshotContent::KIND,
                content_name,
            )),
        }
    }

    async fn snapshot_exists(&self, namespace: &str, name: &str) -> SnapshotResult<bool> {
        Ok(self.snapshot_repo.get_by_name(namespace, name).await?.is_some())
    }
}
