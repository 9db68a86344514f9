//! Lookups over already-fetched objects and metadata stamping helpers.

use std::collections::BTreeMap;

use crate::exception::{SnapshotException, SnapshotResult};
use crate::model::entity::claim::ClaimPhase;
use crate::model::entity::{
    Object, PersistentVolume, PersistentVolumeClaim, Pod, SnapshotClass, VolumeSnapshot,
    VolumeSnapshotContent,
};
use crate::model::vo::{keys, ObjectMeta};

/// The volume a bound claim points at.
pub fn find_volume_for_claim<'a>(
    claim: &PersistentVolumeClaim,
    volumes: &'a [PersistentVolume],
) -> SnapshotResult<&'a PersistentVolume> {
    let volume_name = claim
        .spec
        .volume_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            SnapshotException::not_found(
                PersistentVolume::KIND,
                format!("for claim {} (no volume name)", claim.metadata.key()),
            )
        })?;
    if claim.status.phase != ClaimPhase::Bound {
        return Err(SnapshotException::not_found(
            PersistentVolume::KIND,
            format!("for claim {} (claim is not bound)", claim.metadata.key()),
        ));
    }
    volumes
        .iter()
        .find(|v| v.name() == volume_name)
        .ok_or_else(|| SnapshotException::not_found(PersistentVolume::KIND, volume_name))
}

pub fn find_pods_referencing_claim<'a>(
    pods: &'a [Pod],
    namespace: &str,
    claim_name: &str,
) -> Vec<&'a Pod> {
    pods.iter()
        .filter(|pod| pod.metadata.namespace() == namespace)
        .filter(|pod| {
            pod.spec.volumes.iter().any(|v| {
                v.persistent_volume_claim
                    .as_ref()
                    .is_some_and(|c| c.claim_name == claim_name)
            })
        })
        .collect()
}

/// Name under which `pod` mounts the claim.
pub fn find_volume_name_in_pod(pod: &Pod, claim_name: &str) -> SnapshotResult<String> {
    pod.spec
        .volumes
        .iter()
        .find(|v| {
            v.persistent_volume_claim
                .as_ref()
                .is_some_and(|c| c.claim_name == claim_name)
        })
        .map(|v| v.name.clone())
        .ok_or_else(|| {
            SnapshotException::not_found(
                "PodVolume",
                format!("{claim_name} in pod {}", pod.metadata.key()),
            )
        })
}

pub fn contains(slice: &[String], key: &str) -> bool {
    slice.iter().any(|s| s == key)
}

/// Merges `annotations` into the object's, overwriting existing keys.
pub fn add_annotations(meta: &mut ObjectMeta, annotations: &BTreeMap<String, String>) {
    meta.annotations
        .extend(annotations.iter().map(|(k, v)| (k.clone(), v.clone())));
}

/// Merges `labels` into the object's, overwriting existing keys.
pub fn add_labels(meta: &mut ObjectMeta, labels: &BTreeMap<String, String>) {
    meta.labels
        .extend(labels.iter().map(|(k, v)| (k.clone(), v.clone())));
}

pub fn has_backup_label(meta: &ObjectMeta, backup_name: &str) -> bool {
    meta.label(keys::BACKUP_NAME_LABEL) == Some(backup_name)
}

fn has_both(meta: &ObjectMeta, name_key: &str, namespace_key: &str) -> bool {
    meta.annotations.contains_key(name_key) && meta.annotations.contains_key(namespace_key)
}

pub fn class_has_lister_secret(class: &SnapshotClass) -> bool {
    has_both(
        &class.metadata,
        keys::SNAPSHOTTER_LIST_SECRET_NAME_KEY,
        keys::SNAPSHOTTER_LIST_SECRET_NAMESPACE_KEY,
    )
}

pub fn content_has_delete_secret(content: &VolumeSnapshotContent) -> bool {
    has_both(
        &content.metadata,
        keys::SNAPSHOTTER_SECRET_NAME_KEY,
        keys::SNAPSHOTTER_SECRET_NAMESPACE_KEY,
    )
}

pub fn snapshot_has_content_delete_secret(snapshot: &VolumeSnapshot) -> bool {
    has_both(
        &snapshot.metadata,
        keys::DELETE_SNAPSHOT_SECRET_NAME_KEY,
        keys::DELETE_SNAPSHOT_SECRET_NAMESPACE_KEY,
    )
}
