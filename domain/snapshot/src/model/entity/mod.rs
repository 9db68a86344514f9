pub mod backup;
pub mod claim;
pub mod pod;
mod snapshot_class;
pub mod volume_snapshot;
pub mod volume_snapshot_content;

#[rustfmt::skip]
pub use {
    backup::Backup,
    claim::{PersistentVolume, PersistentVolumeClaim},
    pod::Pod,
    snapshot_class::SnapshotClass,
    volume_snapshot::VolumeSnapshot,
    volume_snapshot_content::VolumeSnapshotContent,
};

use crate::model::vo::ObjectMeta;

/// A stored object with metadata.
pub trait Object: Clone + Send + Sync + 'static {
    /// Kind name used in log lines and error messages.
    const KIND: &'static str;

    fn metadata(&self) -> &ObjectMeta;
    fn metadata_mut(&mut self) -> &mut ObjectMeta;
}

macro_rules! impl_object {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl Object for $ty {
                const KIND: &'static str = $kind;

                fn metadata(&self) -> &ObjectMeta {
                    &self.metadata
                }

                fn metadata_mut(&mut self) -> &mut ObjectMeta {
                    &mut self.metadata
                }
            }
        )*
    };
}

impl_object! {
    Backup => "Backup",
    PersistentVolume => "PersistentVolume",
    PersistentVolumeClaim => "PersistentVolumeClaim",
    Pod => "Pod",
    SnapshotClass => "VolumeSnapshotClass",
    VolumeSnapshot => "VolumeSnapshot",
    VolumeSnapshotContent => "VolumeSnapshotContent",
}
