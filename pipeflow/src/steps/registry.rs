//! Name to step lookup used by debug replay.

use super::Step;
use crate::pipeline::PipelineConfig;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry of steps by name.
///
/// The host application builds the registry; pipeflow never discovers
/// steps on its own.
#[derive(Clone, Default)]
pub struct StepRegistry {
    steps: HashMap<String, Arc<dyn Step>>,
}

impl StepRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every step of a pipeline configuration under its name.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut registry = Self::new();
        for descriptor in config.steps() {
            registry.register(descriptor.name(), descriptor.step().clone());
        }
        registry
    }

    /// Registers a step, returning the one it replaced.
    pub fn register(&mut self, name: impl Into<String>, step: Arc<dyn Step>) -> Option<Arc<dyn Step>> {
        self.steps.insert(name.into(), step)
    }

    /// Registers a step, builder style.
    #[must_use]
    pub fn with_step(mut self, name: impl Into<String>, step: Arc<dyn Step>) -> Self {
        self.register(name, step);
        self
    }

    /// Removes a step.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn Step>> {
        self.steps.remove(name)
    }

    /// Looks up a step.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Step>> {
        self.steps.get(name)
    }

    /// Returns true if a step is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.steps.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("steps", &self.names())
            .finish()
    }
}
