//! Pipeline and step specifications.

use super::PipelineConfigBuilder;
use crate::errors::{ConfigurationError, StepError};
use crate::steps::{FnStep, Step};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A named step in a pipeline.
#[derive(Clone)]
pub struct StepDescriptor {
    name: String,
    step: Arc<dyn Step>,
}

impl StepDescriptor {
    /// Creates a new step descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, step: Arc<dyn Step>) -> Self {
        Self {
            name: name.into(),
            step,
        }
    }

    /// Creates a descriptor for a plain function step.
    #[must_use]
    pub fn from_fn<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Option<Value>) -> Result<Value, StepError> + Send + Sync + 'static,
    {
        Self::new(name, Arc::new(FnStep::new(func)))
    }

    /// Returns the step name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the step implementation.
    #[must_use]
    pub fn step(&self) -> &Arc<dyn Step> {
        &self.step
    }
}

impl fmt::Debug for StepDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("name", &self.name)
            .field("resource", &self.step.resource())
            .finish()
    }
}

/// An ordered sequence of steps plus an optional schedule expression.
///
/// Insertion order is execution order. The schedule is handed to an external
/// scheduler as-is and never interpreted here.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    steps: Vec<StepDescriptor>,
    schedule: Option<String>,
}

impl PipelineConfig {
    /// Creates a configuration from a sequence of steps.
    #[must_use]
    pub fn new(steps: impl IntoIterator<Item = StepDescriptor>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            schedule: None,
        }
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Sets the schedule expression.
    #[must_use]
    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = Some(schedule.into());
        self
    }

    /// Returns the steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    /// Returns the schedule expression, if any.
    #[must_use]
    pub fn schedule(&self) -> Option<&str> {
        self.schedule.as_deref()
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if there are no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Checks that the configuration can be run.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no steps or two steps share a name.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.steps.is_empty() {
            return Err(ConfigurationError::empty());
        }

        let mut seen = HashSet::new();
        for descriptor in &self.steps {
            if !seen.insert(descriptor.name()) {
                return Err(ConfigurationError::duplicate_step(descriptor.name()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop(name: &str) -> StepDescriptor {
        StepDescriptor::from_fn(name, |_| Ok(Value::Null))
    }

    #[test]
    fn test_new_preserves_order() {
        let config = PipelineConfig::new(vec![noop("fetch"), noop("transform"), noop("persist")]);
        let names: Vec<_> = config.steps().iter().map(StepDescriptor::name).collect();
        assert_eq!(names, vec!["fetch", "transform", "persist"]);
        assert_eq!(config.len(), 3);
        assert!(config.schedule().is_none());
    }

    #[test]
    fn test_validate_empty() {
        let err = PipelineConfig::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "No steps to run in the pipeline");
    }

    #[test]
    fn test_validate_duplicate() {
        let config = PipelineConfig::new(vec![noop("a"), noop("b"), noop("a")]);
        let err = config.validate().unwrap_err();
        assert_eq!(err.steps, vec!["a".to_string()]);
    }

    #[test]
    fn test_schedule_is_opaque() {
        let config = PipelineConfig::new(vec![noop("a")]).with_schedule("not a cron line");
        assert_eq!(config.schedule(), Some("not a cron line"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_descriptor_debug_hides_closure() {
        let descriptor = StepDescriptor::from_fn("step1", |_| Ok(json!("Hello")));
        let debug = format!("{descriptor:?}");
        assert!(debug.contains("step1"));
    }
}
