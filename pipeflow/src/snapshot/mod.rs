//! Failure snapshots.
//!
//! When a step fails, the instrumentation layer records the step name, the
//! exact call arguments and the error into a [`Snapshot`] and hands it to a
//! [`SnapshotSink`]. The default sink is the filesystem [`SnapshotStore`].

mod record;
mod store;

pub use record::{ExceptionInfo, Snapshot};
pub use store::{SnapshotStore, DEFAULT_SNAPSHOT_DIR};

use crate::errors::SnapshotError;
use std::path::PathBuf;

/// Destination for captured snapshots.
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotSink: Send + Sync {
    /// Persists a snapshot and returns where it went.
    fn persist(&self, snapshot: &Snapshot) -> Result<PathBuf, SnapshotError>;
}

impl SnapshotSink for SnapshotStore {
    fn persist(&self, snapshot: &Snapshot) -> Result<PathBuf, SnapshotError> {
        self.save(snapshot)
    }
}

/// Sink that discards every snapshot.
///
/// Used where capture is switched off, such as debug replay.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSnapshotSink;

impl SnapshotSink for NoOpSnapshotSink {
    fn persist(&self, _snapshot: &Snapshot) -> Result<PathBuf, SnapshotError> {
        Ok(PathBuf::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StepInput;

    #[test]
    fn test_noop_sink_writes_nothing() {
        let snapshot = Snapshot::new("step", StepInput::new(), ExceptionInfo::new("E", "m"));
        assert_eq!(NoOpSnapshotSink.persist(&snapshot).unwrap(), PathBuf::new());
    }
}
