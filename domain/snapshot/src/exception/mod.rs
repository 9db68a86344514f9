use std::time::Duration;

use thiserror::Error;

pub type SnapshotResult<T> = Result<T, SnapshotException>;

#[derive(Debug, Error)]
pub enum SnapshotException {
    #[error("{kind} {name} not found.")]
    NotFound { kind: &'static str, name: String },

    #[error("Cannot choose among {} snapshot classes for driver {driver}: {}.", .candidates.len(), .candidates.join(", "))]
    AmbiguousSelection {
        driver: String,
        candidates: Vec<String>,
    },

    #[error("Timed out after {waited:?} waiting for {kind} {name}: {reason}.")]
    Timeout {
        kind: &'static str,
        name: String,
        waited: Duration,
        reason: String,
    },

    /// A write carried a stale resource version. Absorbed by the retry loops, never returned from a service.
    #[error("{kind} {name} was modified concurrently.")]
    Conflict { kind: &'static str, name: String },

    #[error("Operation cancelled.")]
    Cancelled,

    #[error("Gave up updating {name} after {attempts} conflicting writes.")]
    RetriesExhausted { name: String, attempts: usize },

    #[error("Snapshot internal error: {source}")]
    InternalError {
        #[source]
        source: anyhow::Error,
    },
}

impl SnapshotException {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        SnapshotException::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn conflict(kind: &'static str, name: impl Into<String>) -> Self {
        SnapshotException::Conflict {
            kind,
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SnapshotException::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, SnapshotException::Conflict { .. })
    }
}

/// Stores report typed failures wrapped in `anyhow`; recover them here so
/// callers can still tell a conflict from a missing object.
impl From<anyhow::Error> for SnapshotException {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<SnapshotException>() {
            Ok(typed) => typed,
            Err(source) => SnapshotException::InternalError { source },
        }
    }
}
