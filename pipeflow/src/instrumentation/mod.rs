//! Instrumented step invocation.
//!
//! [`Instrumented`] wraps a step with structured logging, acquires the
//! step's declared resource for exactly one call, and on failure records a
//! [`Snapshot`] before handing the original error back. It is transparent:
//! successful values and error kinds/messages are returned unchanged.

mod context;

pub use context::InvocationContext;

use crate::core::StepInput;
use crate::errors::{PipelineError, ResourceError, StepError};
use crate::observability::SpanTimer;
use crate::pipeline::StepDescriptor;
use crate::resource::{ResourceScope, ResourceSpec};
use crate::snapshot::Snapshot;
use crate::steps::Step;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A step composed with logging, resource scoping and snapshot capture.
#[derive(Clone)]
pub struct Instrumented {
    name: String,
    step: Arc<dyn Step>,
}

impl Instrumented {
    /// Wraps a step under the given name.
    #[must_use]
    pub fn new(name: impl Into<String>, step: Arc<dyn Step>) -> Self {
        Self {
            name: name.into(),
            step,
        }
    }

    /// Wraps the step of a pipeline descriptor.
    #[must_use]
    pub fn from_descriptor(descriptor: &StepDescriptor) -> Self {
        Self::new(descriptor.name(), descriptor.step().clone())
    }

    /// Returns the step name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the step once.
    ///
    /// # Errors
    ///
    /// Returns the step's own error unchanged, or a resource error if the
    /// declared resource cannot be acquired or released. Outside debug mode
    /// a snapshot of the call has been handed to the context's sink by the
    /// time the error is returned.
    pub fn invoke(&self, input: Option<Value>, ctx: &InvocationContext) -> Result<Value, PipelineError> {
        let resource = self.step.resource();
        let recorded = record_call(input.as_ref(), resource);

        let call = recorded.to_json();
        info!(
            run_id = %ctx.run_id(),
            step = %self.name,
            input = %call,
            "Step invoked"
        );

        let timer = SpanTimer::start();
        let outcome = match resource {
            Some(spec) => self.call_with_resource(input, spec),
            None => self.step.call(input, None).map_err(PipelineError::from),
        };
        let duration_ms = timer.finish();

        match outcome {
            Ok(value) => {
                info!(
                    run_id = %ctx.run_id(),
                    step = %self.name,
                    result = %value,
                    duration_ms,
                    "Step completed"
                );
                Ok(value)
            }
            Err(err) => {
                error!(
                    run_id = %ctx.run_id(),
                    step = %self.name,
                    error_kind = %err.kind(),
                    error = %err,
                    duration_ms,
                    "Step failed"
                );
                if !ctx.is_debug() {
                    self.capture(recorded, &err, ctx);
                }
                Err(err)
            }
        }
    }

    fn call_with_resource(&self, input: Option<Value>, spec: &ResourceSpec) -> Result<Value, PipelineError> {
        let scope = ResourceScope::from_spec(spec)?;
        let result = self.step.call(input, scope.handle());
        settle(&self.name, result, scope.release())
    }

    fn capture(&self, recorded: StepInput, err: &PipelineError, ctx: &InvocationContext) {
        let snapshot = Snapshot::capture(&self.name, recorded, err);
        match ctx.sink().persist(&snapshot) {
            Ok(path) => info!(
                run_id = %ctx.run_id(),
                step = %self.name,
                path = %path.display(),
                "Snapshot saved"
            ),
            Err(save_err) => error!(
                run_id = %ctx.run_id(),
                step = %self.name,
                error = %save_err,
                "Failed to save snapshot"
            ),
        }
    }
}

impl fmt::Debug for Instrumented {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumented")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Combines a step outcome with the release of its resource.
///
/// A release error surfaces only when the step succeeded; on a failing call
/// it is logged and the step error wins.
fn settle(
    step: &str,
    result: Result<Value, StepError>,
    released: Result<(), ResourceError>,
) -> Result<Value, PipelineError> {
    match (result, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(release_err)) => Err(release_err.into()),
        (Err(step_err), released) => {
            if let Err(release_err) = released {
                warn!(
                    step,
                    error = %release_err,
                    "Failed to release resource after step error"
                );
            }
            Err(step_err.into())
        }
    }
}

fn record_call(input: Option<&Value>, resource: Option<&ResourceSpec>) -> StepInput {
    let recorded = StepInput::from_input(input);
    match resource {
        Some(spec) => recorded.with_resource(spec.locator()),
        None => recorded,
    }
}
