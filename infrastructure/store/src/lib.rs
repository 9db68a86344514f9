//! In-memory backing store for the snapshot repositories, loadable from and
//! dumpable to a YAML cluster manifest.

mod manifest;
mod memory_store;
mod repository;
mod table;

#[rustfmt::skip]
pub use {
    manifest::ClusterManifest,
    memory_store::MemoryStore,
    table::Table,
};
