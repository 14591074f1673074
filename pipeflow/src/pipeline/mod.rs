//! Pipeline definition and execution.
//!
//! This module provides:
//! - Step descriptors and ordered pipeline configurations
//! - A builder for configurations
//! - The linear executor and its run report

mod builder;
mod executor;
mod spec;


pub use builder::PipelineConfigBuilder;
pub use executor::{Pipeline, RunReport};
pub use spec::{PipelineConfig, StepDescriptor};
