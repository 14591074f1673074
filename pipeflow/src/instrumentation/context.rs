//! Per-invocation settings passed explicitly to instrumented steps.

use crate::config::RunSettings;
use crate::snapshot::{SnapshotSink, SnapshotStore};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Where snapshots go, whether to take them, and which run is calling.
#[derive(Clone)]
pub struct InvocationContext {
    run_id: Uuid,
    debug: bool,
    sink: Arc<dyn SnapshotSink>,
}

impl InvocationContext {
    /// Creates a context with a fresh run id and debug mode off.
    #[must_use]
    pub fn new(sink: Arc<dyn SnapshotSink>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            debug: false,
            sink,
        }
    }

    /// Creates a context writing to the settings' snapshot directory.
    #[must_use]
    pub fn from_settings(settings: &RunSettings) -> Self {
        Self::new(Arc::new(SnapshotStore::new(settings.snapshot_dir.clone())))
            .with_debug(settings.debug)
    }

    /// Sets debug mode.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the run id used for log correlation.
    #[must_use]
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    /// Returns the run id.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns true in debug mode.
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Returns the snapshot sink.
    #[must_use]
    pub fn sink(&self) -> &dyn SnapshotSink {
        self.sink.as_ref()
    }
}

impl fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationContext")
            .field("run_id", &self.run_id)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = RunSettings::default().with_debug(true);
        let ctx = InvocationContext::from_settings(&settings);
        assert!(ctx.is_debug());
    }

    #[test]
    fn test_with_run_id() {
        let id = Uuid::new_v4();
        let ctx = InvocationContext::new(Arc::new(SnapshotStore::default())).with_run_id(id);
        assert_eq!(ctx.run_id(), id);
        assert!(!ctx.is_debug());
    }
}
