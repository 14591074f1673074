//! Core domain model types for pipeflow.
//!
//! This module contains the fundamental types used throughout the framework:
//! - Run state of a pipeline execution
//! - Recorded step call arguments

mod input;
mod status;

pub use input::{StepArg, StepInput, RESOURCE_KWARG};
pub use status::RunState;
