pub mod keys;
mod object_meta;
mod policy;
mod resolution;

#[rustfmt::skip]
pub use {
    object_meta::{ObjectMeta, ObjectReference},
    policy::DeletionPolicy,
    resolution::Resolution,
};
