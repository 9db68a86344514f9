//! Domain model of CSI snapshot handling: snapshot classes, snapshot requests
//! and the provider-side contents bound to them, plus the repository and
//! service seams the backup workflow talks to.

pub mod exception;
pub mod helper;
#[cfg(feature = "mock")]
pub mod mock;
pub mod model;
pub mod repository;
pub mod service;
