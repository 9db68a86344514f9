mod common;

use std::sync::Arc;

use common::{backup, bound_snapshot, content, store, unbound_snapshot};
use domain_snapshot::{
    exception::SnapshotException,
    mock::{MockDeletionPolicyService, MockVolumeSnapshotRepo},
    model::vo::DeletionPolicy,
    service::SnapshotTeardownService,
};
use indoc::indoc;
use infrastructure_store::{ClusterManifest, MemoryStore};
use service_snapshot::{DeletionPolicyServiceImpl, SnapshotTeardownServiceImpl};

fn teardown(store: &Arc<MemoryStore>) -> SnapshotTeardownServiceImpl {
    SnapshotTeardownServiceImpl::builder()
        .snapshot_repo(store.clone())
        .deletion_policy_service(Arc::new(
            DeletionPolicyServiceImpl::builder()
                .content_repo(store.clone())
                .build(),
        ))
        .build()
}

const CLUSTER: &str = indoc! {r#"
    volumeSnapshots:
      - metadata:
          name: vs1
          namespace: prod
        status:
          boundVolumeSnapshotContentName: vsc1
      - metadata:
          name: vs2
          namespace: prod
    volumeSnapshotContents:
      - metadata:
          name: vsc1
        spec:
          volumeSnapshotRef:
            kind: VolumeSnapshot
            namespace: prod
            name: vs1
            uid: 0e5a8c3e-4a8b-4f58-9a52-1f0c2c7d9b11
          deletionPolicy: Delete
          driver: hostpath.csi.k8s.io
          source:
            volumeHandle: vol-1
        status:
          snapshotHandle: snap-1
          readyToUse: true
"#};

fn cluster() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::from_manifest(
        ClusterManifest::from_yaml(CLUSTER).unwrap(),
    ))
}

#[tokio::test]
async fn bound_content_is_retained_and_request_removed() {
    let store = cluster();
    let vs1 = store.snapshots().get("prod/vs1").unwrap();
    let vsc1 = store.contents().get("vsc1").unwrap();

    teardown(&store)
        .delete_snapshot(&vs1, Some(&vsc1), &backup("nightly"))
        .await;

    assert!(store.snapshots().get("prod/vs1").is_none());
    let vsc1 = store.contents().get("vsc1").unwrap();
    assert_eq!(vsc1.spec.deletion_policy, Some(DeletionPolicy::Retain));
    assert!(vsc1.is_detached());
    assert_eq!(
        vsc1.spec.volume_snapshot_ref.name,
        "name-0e5a8c3e-4a8b-4f58-9a52-1f0c2c7d9b11"
    );
    assert_eq!(vsc1.spec.source.snapshot_handle.as_deref(), Some("snap-1"));
}

#[tokio::test]
async fn unbound_request_leaves_contents_alone() {
    let store = cluster();
    let vs2 = store.snapshots().get("prod/vs2").unwrap();
    let before = store.contents().get("vsc1").unwrap();

    teardown(&store)
        .delete_snapshot(&vs2, None, &backup("nightly"))
        .await;

    assert!(store.snapshots().get("prod/vs2").is_none());
    assert_eq!(store.contents().get("vsc1").unwrap(), before);
    assert!(store.snapshots().get("prod/vs1").is_some());
}

#[tokio::test]
async fn retained_content_keeps_its_policy() {
    let store = store();
    store
        .contents()
        .put(content("vsc1", "vs1", DeletionPolicy::Retain, Some("snap-1")));
    let vs1 = store.snapshots().put(bound_snapshot("vs1", "vsc1"));

    teardown(&store)
        .delete_snapshot(&vs1, None, &backup("nightly"))
        .await;

    assert!(store.snapshots().get("prod/vs1").is_none());
    assert_eq!(
        store.contents().get("vsc1").unwrap().spec.deletion_policy,
        Some(DeletionPolicy::Retain)
    );
}

#[tokio::test]
async fn request_is_kept_when_content_cannot_be_retained() {
    let store = store();
    let vs1 = store.snapshots().put(bound_snapshot("vs1", "vsc1"));

    let mut policy = MockDeletionPolicyService::new();
    policy
        .expect_set_deletion_policy()
        .times(1)
        .returning(|name, _| Err(SnapshotException::not_found("VolumeSnapshotContent", name)));
    policy.expect_detach_snapshot_ref().times(0);

    SnapshotTeardownServiceImpl::builder()
        .snapshot_repo(store.clone())
        .deletion_policy_service(Arc::new(policy))
        .build()
        .delete_snapshot(&vs1, None, &backup("nightly"))
        .await;

    assert!(store.snapshots().get("prod/vs1").is_some());
}

#[tokio::test]
async fn already_deleted_request_still_detaches_content() {
    let store = store();
    store
        .contents()
        .put(content("vsc1", "vs1", DeletionPolicy::Delete, Some("snap-1")));
    let vs1 = bound_snapshot("vs1", "vsc1");

    teardown(&store)
        .delete_snapshot(&vs1, None, &backup("nightly"))
        .await;

    let vsc1 = store.contents().get("vsc1").unwrap();
    assert_eq!(vsc1.spec.deletion_policy, Some(DeletionPolicy::Retain));
    assert!(vsc1.is_detached());
}

#[tokio::test]
async fn detach_failure_does_not_undo_teardown() {
    let store = store();
    let vs1 = store.snapshots().put(bound_snapshot("vs1", "vsc1"));

    let mut policy = MockDeletionPolicyService::new();
    policy
        .expect_set_deletion_policy()
        .withf(|name, policy| name == "vsc1" && *policy == DeletionPolicy::Retain)
        .times(1)
        .returning(|_, _| Ok(()));
    policy
        .expect_detach_snapshot_ref()
        .times(1)
        .returning(|name| {
            Err(SnapshotException::RetriesExhausted {
                name: name.to_string(),
                attempts: 6,
            })
        });

    SnapshotTeardownServiceImpl::builder()
        .snapshot_repo(store.clone())
        .deletion_policy_service(Arc::new(policy))
        .build()
        .delete_snapshot(&vs1, None, &backup("nightly"))
        .await;

    assert!(store.snapshots().get("prod/vs1").is_none());
}

#[tokio::test]
async fn store_failure_on_delete_is_swallowed() {
    let mut snapshots = MockVolumeSnapshotRepo::new();
    snapshots
        .expect_delete()
        .times(1)
        .returning(|_, _| Err(anyhow::anyhow!("etcd unavailable")));

    SnapshotTeardownServiceImpl::builder()
        .snapshot_repo(Arc::new(snapshots))
        .deletion_policy_service(Arc::new(MockDeletionPolicyService::new()))
        .build()
        .delete_snapshot(&unbound_snapshot("vs2"), None, &backup("nightly"))
        .await;
}

#[tokio::test]
async fn content_stays_attached_when_request_cannot_be_deleted() {
    let mut snapshots = MockVolumeSnapshotRepo::new();
    snapshots
        .expect_delete()
        .times(1)
        .returning(|_, _| Err(anyhow::anyhow!("etcd unavailable")));

    let mut policy = MockDeletionPolicyService::new();
    policy
        .expect_set_deletion_policy()
        .times(1)
        .returning(|_, _| Ok(()));
    policy.expect_detach_snapshot_ref().times(0);

    SnapshotTeardownServiceImpl::builder()
        .snapshot_repo(Arc::new(snapshots))
        .deletion_policy_service(Arc::new(policy))
        .build()
        .delete_snapshot(&bound_snapshot("vs1", "vsc1"), None, &backup("nightly"))
        .await;
}

#[tokio::test]
async fn bound_name_wins_over_supplied_content() {
    let store = store();
    store
        .contents()
        .put(content("vsc1", "vs1", DeletionPolicy::Delete, Some("snap-1")));
    let other = store
        .contents()
        .put(content("vsc-other", "vs9", DeletionPolicy::Delete, Some("snap-9")));
    let vs1 = store.snapshots().put(bound_snapshot("vs1", "vsc1"));

    teardown(&store)
        .delete_snapshot(&vs1, Some(&other), &backup("nightly"))
        .await;

    assert_eq!(
        store.contents().get("vsc1").unwrap().spec.deletion_policy,
        Some(DeletionPolicy::Retain)
    );
    assert_eq!(store.contents().get("vsc-other").unwrap(), other);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_teardowns_retain_every_content() {
    let store = store();
    let mut snapshots = vec![];
    for i in 0..8 {
        store.contents().put(content(
            &format!("vsc{i}"),
            &format!("vs{i}"),
            DeletionPolicy::Delete,
            Some(&format!("snap-{i}")),
        ));
        snapshots.push(
            store
                .snapshots()
                .put(bound_snapshot(&format!("vs{i}"), &format!("vsc{i}"))),
        );
    }
    let teardown = teardown(&store);
    let backup = backup("nightly");

    futures::future::join_all(
        snapshots
            .iter()
            .map(|snapshot| teardown.delete_snapshot(snapshot, None, &backup)),
    )
    .await;

    assert!(store.snapshots().is_empty());
    for content in store.contents().list() {
        assert_eq!(content.spec.deletion_policy, Some(DeletionPolicy::Retain));
        assert!(content.is_detached());
    }
    assert_eq!(store.contents().len(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_teardowns_of_one_request_converge() {
    let store = cluster();
    let vs1 = store.snapshots().get("prod/vs1").unwrap();
    let teardown = Arc::new(teardown(&store));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let teardown = teardown.clone();
            let vs1 = vs1.clone();
            tokio::spawn(async move {
                teardown
                    .delete_snapshot(&vs1, None, &backup("nightly"))
                    .await
            })
        })
        .collect();
    for task in futures::future::join_all(tasks).await {
        task.unwrap();
    }

    assert!(store.snapshots().get("prod/vs1").is_none());
    let vsc1 = store.contents().get("vsc1").unwrap();
    assert_eq!(vsc1.spec.deletion_policy, Some(DeletionPolicy::Retain));
    assert!(vsc1.is_detached());
    assert_eq!(
        vsc1.spec.volume_snapshot_ref.name,
        "name-0e5a8c3e-4a8b-4f58-9a52-1f0c2c7d9b11"
    );
    assert_eq!(vsc1.spec.source.snapshot_handle.as_deref(), Some("snap-1"));
}
