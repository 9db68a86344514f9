#![allow(dead_code)]

use std::sync::Arc;

use domain_snapshot::model::{
    entity::{
        volume_snapshot::VolumeSnapshotStatus,
        volume_snapshot_content::VolumeSnapshotContentStatus, Backup, SnapshotClass,
        VolumeSnapshot, VolumeSnapshotContent,
    },
    vo::{keys, DeletionPolicy},
};
use infrastructure_store::MemoryStore;
use uuid::Uuid;

pub const NAMESPACE: &str = "prod";
pub const DRIVER: &str = "hostpath.csi.k8s.io";

pub fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::default())
}

pub fn class(name: &str, driver: &str, labeled: bool) -> SnapshotClass {
    let mut class = SnapshotClass::new(name, driver);
    if labeled {
        class.metadata.labels.insert(
            keys::VOLUME_SNAPSHOT_CLASS_SELECTOR_LABEL.into(),
            "true".into(),
        );
    }
    class
}

pub fn backup(name: &str) -> Backup {
    Backup::new("snapkeeper", name)
}

pub fn unbound_snapshot(name: &str) -> VolumeSnapshot {
    let mut snapshot = VolumeSnapshot::new(NAMESPACE, name);
    snapshot
        .metadata
        .labels
        .insert(keys::BACKUP_NAME_LABEL.into(), "nightly".into());
    snapshot
}

pub fn bound_snapshot(name: &str, content: &str) -> VolumeSnapshot {
    VolumeSnapshot {
        status: Some(VolumeSnapshotStatus {
            bound_volume_snapshot_content_name: Some(content.into()),
            ..Default::default()
        }),
        ..unbound_snapshot(name)
    }
}

/// A content bound to `prod/<snapshot>`, cut with handle `handle` when given.
pub fn content(
    name: &str,
    snapshot: &str,
    policy: DeletionPolicy,
    handle: Option<&str>,
) -> VolumeSnapshotContent {
    let mut content = VolumeSnapshotContent::new(name);
    let reference = &mut content.spec.volume_snapshot_ref;
    reference.kind = Some("VolumeSnapshot".into());
    reference.namespace = NAMESPACE.into();
    reference.name = snapshot.into();
    reference.uid = Some(Uuid::new_v4());
    content.spec.deletion_policy = Some(policy);
    content.spec.driver = DRIVER.into();
    content.spec.source.volume_handle = Some("vol-1".into());
    content.status = handle.map(|h| VolumeSnapshotContentStatus {
        snapshot_handle: Some(h.into()),
        ready_to_use: Some(true),
        ..Default::default()
    });
    content
}
