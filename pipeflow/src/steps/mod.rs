//! Step trait and implementations.
//!
//! Steps are the units of work in a pipeflow pipeline. A step takes the
//! previous step's output (or nothing, for the first step) and returns one
//! value. Steps that need a database declare a [`ResourceSpec`] and receive
//! a freshly acquired [`ResourceHandle`] for each invocation.

mod registry;

pub use registry::StepRegistry;

use crate::errors::StepError;
use crate::resource::{ResourceHandle, ResourceSpec};
use serde_json::Value;
use std::fmt::{self, Debug};

/// Trait for pipeline steps.
pub trait Step: Send + Sync {
    /// Returns the resource this step needs, if any.
    fn resource(&self) -> Option<&ResourceSpec> {
        None
    }

    /// Executes the step.
    ///
    /// # Arguments
    ///
    /// * `input` - The previous step's non-null output
    /// * `resource` - The handle acquired for this invocation, present only
    ///   when [`Step::resource`] declares one
    fn call(
        &self,
        input: Option<Value>,
        resource: Option<&ResourceHandle>,
    ) -> Result<Value, StepError>;
}

/// A simple function-based step.
pub struct FnStep<F>
where
    F: Fn(Option<Value>) -> Result<Value, StepError> + Send + Sync,
{
    func: F,
}

impl<F> FnStep<F>
where
    F: Fn(Option<Value>) -> Result<Value, StepError> + Send + Sync,
{
    /// Creates a new function-based step.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Debug for FnStep<F>
where
    F: Fn(Option<Value>) -> Result<Value, StepError> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep").finish_non_exhaustive()
    }
}

impl<F> Step for FnStep<F>
where
    F: Fn(Option<Value>) -> Result<Value, StepError> + Send + Sync,
{
    fn call(
        &self,
        input: Option<Value>,
        _resource: Option<&ResourceHandle>,
    ) -> Result<Value, StepError> {
        (self.func)(input)
    }
}

/// A function-based step that works against a scoped resource.
pub struct ResourceStep<F>
where
    F: Fn(Option<Value>, &ResourceHandle) -> Result<Value, StepError> + Send + Sync,
{
    spec: ResourceSpec,
    func: F,
}

impl<F> ResourceStep<F>
where
    F: Fn(Option<Value>, &ResourceHandle) -> Result<Value, StepError> + Send + Sync,
{
    /// Creates a step that receives a handle for `spec` on every call.
    pub fn new(spec: ResourceSpec, func: F) -> Self {
        Self { spec, func }
    }
}

impl<F> Debug for ResourceStep<F>
where
    F: Fn(Option<Value>, &ResourceHandle) -> Result<Value, StepError> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceStep")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl<F> Step for ResourceStep<F>
where
    F: Fn(Option<Value>, &ResourceHandle) -> Result<Value, StepError> + Send + Sync,
{
    fn resource(&self) -> Option<&ResourceSpec> {
        Some(&self.spec)
    }

    fn call(
        &self,
        input: Option<Value>,
        resource: Option<&ResourceHandle>,
    ) -> Result<Value, StepError> {
        let handle = resource.ok_or_else(|| {
            StepError::new(
                "ResourceError",
                format!("No resource handle injected for '{}'", self.spec.locator()),
            )
        })?;
        (self.func)(input, handle)
    }
}
