//! Test assertions for step errors and snapshots.

use crate::errors::PipelineError;
use crate::snapshot::Snapshot;
use serde_json::Value;

/// Asserts that the error is a step error with the given kind and message.
pub fn assert_step_error(err: &PipelineError, kind: &str, message: &str) {
    assert!(
        err.is_step_error(),
        "Expected a step error, got {:?}",
        err
    );
    assert_eq!(err.kind(), kind, "Unexpected error kind for {err:?}");
    assert_eq!(err.to_string(), message, "Unexpected error message for {err:?}");
}

/// Asserts that a snapshot names the step and error it was captured for.
pub fn assert_snapshot_matches(snapshot: &Snapshot, step_name: &str, kind: &str, message: &str) {
    assert_eq!(snapshot.step_name, step_name, "Unexpected step name");
    assert_eq!(
        snapshot.exception.kind, kind,
        "Unexpected exception type for step '{}'",
        snapshot.step_name
    );
    assert_eq!(
        snapshot.exception.message, message,
        "Unexpected exception message for step '{}'",
        snapshot.step_name
    );
}

/// Asserts that a snapshot recorded exactly the given positional arguments
/// and no keyword arguments.
pub fn assert_snapshot_args(snapshot: &Snapshot, expected: &[Value]) {
    assert_eq!(
        snapshot.input.args, expected,
        "Unexpected positional arguments for step '{}'",
        snapshot.step_name
    );
    assert!(
        snapshot.input.kwargs.is_empty(),
        "Expected no keyword arguments, got {:?}",
        snapshot.input.kwargs
    );
}
