mod common;

use std::sync::Arc;

use common::{backup, class, store, DRIVER, NAMESPACE};
use domain_snapshot::{
    exception::SnapshotException,
    mock::MockSnapshotClassRepo,
    model::{entity::PersistentVolumeClaim, vo::keys},
    service::SnapshotClassResolverService,
};
use infrastructure_store::MemoryStore;
use service_snapshot::SnapshotClassResolverServiceImpl;

fn resolver(store: Arc<MemoryStore>) -> SnapshotClassResolverServiceImpl {
    SnapshotClassResolverServiceImpl::builder().class_repo(store).build()
}

fn claim_preferring(class: Option<&str>) -> PersistentVolumeClaim {
    let mut claim = PersistentVolumeClaim::new(NAMESPACE, "data");
    if let Some(class) = class {
        claim.metadata.annotations.insert(
            keys::VOLUME_SNAPSHOT_CLASS_SELECTOR_LABEL.into(),
            class.into(),
        );
    }
    claim
}

fn store_with_default() -> Arc<MemoryStore> {
    let store = store();
    store.classes().put(class("hostpath", DRIVER, true));
    store.classes().put(class("hostpath-fast", DRIVER, false));
    store.classes().put(class("foo", "foo.csi.k8s.io", true));
    store
}

#[tokio::test]
async fn default_label_is_used_without_annotations() {
    let resolved = resolver(store_with_default())
        .resolve(DRIVER, &backup("nightly"), &claim_preferring(None))
        .await
        .unwrap();
    assert_eq!(resolved.name(), "hostpath");
}

#[tokio::test]
async fn claim_annotation_wins_when_driver_matches() {
    let resolved = resolver(store_with_default())
        .resolve(DRIVER, &backup("nightly"), &claim_preferring(Some("hostpath-fast")))
        .await
        .unwrap();
    assert_eq!(resolved.name(), "hostpath-fast");
}

#[tokio::test]
async fn claim_annotation_of_other_driver_is_ignored() {
    let resolved = resolver(store_with_default())
        .resolve(DRIVER, &backup("nightly"), &claim_preferring(Some("foo")))
        .await
        .unwrap();
    assert_eq!(resolved.name(), "hostpath");
    assert_eq!(resolved.driver, DRIVER);
}

#[tokio::test]
async fn backup_annotation_beats_default_label() {
    let mut backup = backup("nightly");
    backup
        .metadata
        .annotations
        .insert(keys::backup_class_annotation(DRIVER), "hostpath-fast".into());

    let resolved = resolver(store_with_default())
        .resolve(DRIVER, &backup, &claim_preferring(None))
        .await
        .unwrap();
    assert_eq!(resolved.name(), "hostpath-fast");
}

#[tokio::test]
async fn backup_annotation_for_other_driver_is_not_consulted() {
    let mut backup = backup("nightly");
    backup.metadata.annotations.insert(
        keys::backup_class_annotation("foo.csi.k8s.io"),
        "hostpath-fast".into(),
    );

    let resolved = resolver(store_with_default())
        .resolve(DRIVER, &backup, &claim_preferring(None))
        .await
        .unwrap();
    assert_eq!(resolved.name(), "hostpath");
}

#[tokio::test]
async fn missing_annotated_classes_fall_through() {
    let mut backup = backup("nightly");
    backup
        .metadata
        .annotations
        .insert(keys::backup_class_annotation(DRIVER), "deleted".into());

    let resolved = resolver(store_with_default())
        .resolve(DRIVER, &backup, &claim_preferring(Some("also-deleted")))
        .await
        .unwrap();
    assert_eq!(resolved.name(), "hostpath");
}

#[tokio::test]
async fn no_labeled_class_is_not_found() {
    let store = store();
    store.classes().put(class("hostpath-fast", DRIVER, false));

    let err = resolver(store)
        .resolve(DRIVER, &backup("nightly"), &claim_preferring(None))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "{err}");
}

#[tokio::test]
async fn two_labeled_classes_are_ambiguous() {
    let store = store_with_default();
    store.classes().put(class("hostpath-2", DRIVER, true));

    let err = resolver(store)
        .resolve(DRIVER, &backup("nightly"), &claim_preferring(None))
        .await
        .unwrap_err();
    match err {
        SnapshotException::AmbiguousSelection { driver, candidates } => {
            assert_eq!(driver, DRIVER);
            assert_eq!(candidates, ["hostpath", "hostpath-2"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn store_failure_is_reported() {
    let mut repo = MockSnapshotClassRepo::new();
    repo.expect_get_all()
        .times(1)
        .returning(|| Err(anyhow::anyhow!("connection refused")));

    let err = SnapshotClassResolverServiceImpl::builder()
        .class_repo(Arc::new(repo))
        .build()
        .resolve(DRIVER, &backup("nightly"), &claim_preferring(None))
        .await
        .unwrap_err();
    assert!(matches!(err, SnapshotException::InternalError { .. }));
}
