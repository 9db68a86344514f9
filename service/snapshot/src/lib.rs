mod content_waiter;
mod deletion_policy;
mod snapshot_class;
mod teardown;

#[rustfmt::skip]
pub use {
    content_waiter::SnapshotContentWaiterServiceImpl,
    deletion_policy::DeletionPolicyServiceImpl,
    snapshot_class::{resolve_for_storage_class, SnapshotClassResolverServiceImpl},
    teardown::SnapshotTeardownServiceImpl,
};
