mod snapshot_class;
mod volume_snapshot;
mod volume_snapshot_content;
