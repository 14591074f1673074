//! Ordered builder for pipeline configurations.

use super::{PipelineConfig, StepDescriptor};
use crate::errors::StepError;
use crate::steps::Step;
use serde_json::Value;
use std::sync::Arc;

/// Builder that appends steps in execution order.
///
/// Building never fails; name collisions and empty pipelines are reported
/// when the pipeline runs.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    steps: Vec<StepDescriptor>,
    schedule: Option<String>,
}

impl PipelineConfigBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    #[must_use]
    pub fn step(self, name: impl Into<String>, step: impl Step + 'static) -> Self {
        self.descriptor(StepDescriptor::new(name, Arc::new(step)))
    }

    /// Appends a plain function step.
    #[must_use]
    pub fn fn_step<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Option<Value>) -> Result<Value, StepError> + Send + Sync + 'static,
    {
        self.descriptor(StepDescriptor::from_fn(name, func))
    }

    /// Appends an existing descriptor.
    #[must_use]
    pub fn descriptor(mut self, descriptor: StepDescriptor) -> Self {
        self.steps.push(descriptor);
        self
    }

    /// Sets the schedule expression.
    #[must_use]
    pub fn schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = Some(schedule.into());
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> PipelineConfig {
        let config = PipelineConfig::new(self.steps);
        match self.schedule {
            Some(schedule) => config.with_schedule(schedule),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ConstStep;
    use serde_json::json;

    #[test]
    fn test_builder_order_and_schedule() {
        let config = PipelineConfig::builder()
            .step("fetch", ConstStep::new(json!([1, 2, 3])))
            .fn_step("sum", |input| {
                let total: i64 = input
                    .as_ref()
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(Value::as_i64).sum())
                    .unwrap_or_default();
                Ok(json!(total))
            })
            .schedule("0 6 * * *")
            .build();

        let names: Vec<_> = config.steps().iter().map(StepDescriptor::name).collect();
        assert_eq!(names, vec!["fetch", "sum"]);
        assert_eq!(config.schedule(), Some("0 6 * * *"));
    }

    #[test]
    fn test_builder_empty() {
        let config = PipelineConfigBuilder::new().build();
        assert!(config.is_empty());
        assert!(config.validate().is_err());
    }
}
