//! Testing utilities for pipeflow pipelines.
//!
//! This module provides:
//! - Mock steps that record calls, fail on demand or block
//! - Assertions for step errors and captured snapshots

mod assertions;
mod mocks;

pub use assertions::{assert_snapshot_args, assert_snapshot_matches, assert_step_error};
pub use mocks::{CallLog, ConstStep, FailingStep, RecordingStep, SlowStep};
