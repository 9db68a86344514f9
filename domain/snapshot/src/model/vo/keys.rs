//! Annotation and label keys understood by the snapshot workflow.

/// Label marking a snapshot class as the default for its driver. The same key,
/// used as an annotation on a volume claim, names the class the claim prefers.
pub const VOLUME_SNAPSHOT_CLASS_SELECTOR_LABEL: &str = "snapkeeper.io/csi-volumesnapshot-class";

/// Backup annotations `<prefix>_<driver>` name the class to use for that driver.
pub const VOLUME_SNAPSHOT_CLASS_BACKUP_ANNOTATION_PREFIX: &str =
    "snapkeeper.io/csi-volumesnapshot-class";

/// Label stamped on every object created on behalf of a backup.
pub const BACKUP_NAME_LABEL: &str = "snapkeeper.io/backup-name";

/// Set on a content once its reference has been moved to a placeholder; the
/// value is the `namespace/name` of the request it used to be bound to.
pub const DETACHED_FROM_ANNOTATION: &str = "snapkeeper.io/detached-from";

pub const SNAPSHOTTER_SECRET_NAME_KEY: &str = "csi.storage.k8s.io/snapshotter-secret-name";
pub const SNAPSHOTTER_SECRET_NAMESPACE_KEY: &str =
    "csi.storage.k8s.io/snapshotter-secret-namespace";
pub const SNAPSHOTTER_LIST_SECRET_NAME_KEY: &str =
    "csi.storage.k8s.io/snapshotter-list-secret-name";
pub const SNAPSHOTTER_LIST_SECRET_NAMESPACE_KEY: &str =
    "csi.storage.k8s.io/snapshotter-list-secret-namespace";

pub const DELETE_SNAPSHOT_SECRET_NAME_KEY: &str = "snapkeeper.io/csi-deletesnapshotsecret-name";
pub const DELETE_SNAPSHOT_SECRET_NAMESPACE_KEY: &str =
    "snapkeeper.io/csi-deletesnapshotsecret-namespace";

/// Key of the backup annotation naming the class for `driver`.
pub fn backup_class_annotation(driver: &str) -> String {
    format!("{VOLUME_SNAPSHOT_CLASS_BACKUP_ANNOTATION_PREFIX}_{driver}")
}
