mod snapshot_class;
mod volume_snapshot;
mod volume_snapshot_content;

#[rustfmt::skip]
pub use {
    snapshot_class::SnapshotClassRepo,
    volume_snapshot::VolumeSnapshotRepo,
    volume_snapshot_content::VolumeSnapshotContentRepo,
};
