//! Debug replay of a single failed step.
//!
//! Replay loads a snapshot, looks its step up in a [`StepRegistry`] and
//! calls it again with the first recorded positional value. Keyword
//! arguments are not restored: a step that declared a resource acquires a
//! fresh one, so stateful dependencies reflect the present, not the moment
//! of failure. Replay runs in debug mode and never writes a new snapshot.

use crate::errors::{PipelineError, ReplayLookupError};
use crate::instrumentation::{Instrumented, InvocationContext};
use crate::snapshot::{NoOpSnapshotSink, Snapshot, SnapshotStore};
use crate::steps::StepRegistry;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Replays snapshots against a registry of steps.
#[derive(Debug, Clone, Copy)]
pub struct DebugReplay<'a> {
    registry: &'a StepRegistry,
}

impl<'a> DebugReplay<'a> {
    /// Creates a replayer over `registry`.
    #[must_use]
    pub fn new(registry: &'a StepRegistry) -> Self {
        Self { registry }
    }

    /// Loads the snapshot at `path` and re-invokes its step.
    ///
    /// # Errors
    ///
    /// Returns a snapshot error if the file cannot be read or decoded, a
    /// lookup error if the step is unknown, or whatever the step raises.
    pub fn replay(&self, path: impl AsRef<Path>) -> Result<Value, PipelineError> {
        let path = path.as_ref();
        let snapshot = SnapshotStore::load(path)?;
        info!(path = %path.display(), step = %snapshot.step_name, "Replaying snapshot");
        self.replay_snapshot(&snapshot)
    }

    /// Re-invokes the step of an already loaded snapshot.
    ///
    /// # Errors
    ///
    /// See [`DebugReplay::replay`].
    pub fn replay_snapshot(&self, snapshot: &Snapshot) -> Result<Value, PipelineError> {
        let step = self.registry.get(&snapshot.step_name).ok_or_else(|| {
            ReplayLookupError::new(&snapshot.step_name, self.registry.names())
        })?;

        let args = &snapshot.input.args;
        if args.len() > 1 || !snapshot.input.kwargs.is_empty() {
            warn!(
                step = %snapshot.step_name,
                extra_args = args.len().saturating_sub(1),
                kwargs = ?snapshot.input.kwargs.keys().collect::<Vec<_>>(),
                "Only the first positional argument is replayed"
            );
        }

        let ctx = InvocationContext::new(Arc::new(NoOpSnapshotSink)).with_debug(true);
        let result = Instrumented::new(&snapshot.step_name, step.clone())
            .invoke(snapshot.first_arg().cloned(), &ctx);

        match &result {
            Ok(value) => info!(step = %snapshot.step_name, result = %value, "Replay succeeded"),
            Err(err) => info!(
                step = %snapshot.step_name,
                error_kind = %err.kind(),
                error = %err,
                "Replay reproduced failure"
            ),
        }
        result
    }
}

/// Replays the snapshot at `path` using `registry`.
///
/// # Errors
///
/// See [`DebugReplay::replay`].
pub fn replay(path: impl AsRef<Path>, registry: &StepRegistry) -> Result<Value, PipelineError> {
    DebugReplay::new(registry).replay(path)
}
