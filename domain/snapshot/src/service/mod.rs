mod content_waiter;
mod deletion_policy;
mod snapshot_class;
mod teardown;

#[rustfmt::skip]
pub use {
    content_waiter::SnapshotContentWaiterService,
    deletion_policy::DeletionPolicyService,
    snapshot_class::SnapshotClassResolverService,
    teardown::SnapshotTeardownService,
};
