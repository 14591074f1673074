//! # Pipeflow
//!
//! A linear data pipeline runner with failure snapshots and step replay.
//!
//! Pipeflow runs an ordered chain of steps, feeding each step's output into
//! the next, and provides:
//!
//! - **Step instrumentation**: structured logs of every call, result and error
//! - **Failure snapshots**: the exact arguments of a failing step, stored as JSON
//! - **Scoped resources**: a SQLite connection per step invocation, always released
//! - **Debug replay**: re-run one failed step from its snapshot, in isolation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pipeflow::prelude::*;
//! use serde_json::json;
//!
//! let config = PipelineConfig::builder()
//!     .fn_step("step1", |_| Ok(json!("Hello")))
//!     .fn_step("step2", |input| {
//!         let greeting = input.as_ref().and_then(|v| v.as_str()).unwrap_or_default();
//!         Ok(json!(format!("{greeting}, World!")))
//!     })
//!     .build();
//!
//! let registry = StepRegistry::from_config(&config);
//! let pipeline = Pipeline::new(config).with_settings(RunSettings::from_env());
//!
//! match pipeline.run() {
//!     Ok(value) => println!("{value}"),
//!     Err(err) => {
//!         eprintln!("{err}");
//!         // Later, reproduce the failing step on its own.
//!         let _ = replay("snapshots/step2_ZeroDivisionError.json", &registry);
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod instrumentation;
pub mod observability;
pub mod pipeline;
pub mod replay;
pub mod resource;
pub mod snapshot;
pub mod steps;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{LogFormat, LogSettings, RunSettings};
    pub use crate::core::{RunState, StepArg, StepInput};
    pub use crate::errors::{
        ConfigurationError, PipelineError, ReplayLookupError, ResourceError,
        SnapshotError, StepError,
    };
    pub use crate::instrumentation::{Instrumented, InvocationContext};
    pub use crate::observability::{init_logging, scan_error_log};
    pub use crate::pipeline::{
        Pipeline, PipelineConfig, PipelineConfigBuilder, RunReport, StepDescriptor,
    };
    pub use crate::replay::{replay, DebugReplay};
    pub use crate::resource::{ResourceHandle, ResourceScope, ResourceSpec, TableSchema};
    pub use crate::snapshot::{
        ExceptionInfo, NoOpSnapshotSink, Snapshot, SnapshotSink, SnapshotStore,
    };
    pub use crate::steps::{FnStep, ResourceStep, Step, StepRegistry};
}
