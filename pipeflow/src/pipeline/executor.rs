//! Linear pipeline execution.

use super::PipelineConfig;
use crate::config::RunSettings;
use crate::core::RunState;
use crate::errors::PipelineError;
use crate::instrumentation::{Instrumented, InvocationContext};
use crate::observability::SpanTimer;
use crate::snapshot::{SnapshotSink, SnapshotStore};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of a single pipeline run.
#[derive(Debug)]
pub struct RunReport {
    /// Identifier used to correlate the run's log lines.
    pub run_id: Uuid,
    /// Terminal state of the run.
    pub state: RunState,
    /// Steps that were invoked, in order, including a failing one.
    pub steps_invoked: Vec<String>,
    /// Total execution time in milliseconds.
    pub duration_ms: f64,
    /// The last step's value, or the error that stopped the run.
    pub outcome: Result<Value, PipelineError>,
}

impl RunReport {
    /// Returns true if the run completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == RunState::Completed
    }

    /// Consumes the report, returning the outcome.
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the run.
    pub fn into_result(self) -> Result<Value, PipelineError> {
        self.outcome
    }
}

/// A runnable pipeline.
///
/// The configuration is immutable; all execution state lives in a single
/// call to [`Pipeline::run`] or [`Pipeline::run_report`].
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    settings: RunSettings,
    sink: Option<Arc<dyn SnapshotSink>>,
}

impl Pipeline {
    /// Creates a pipeline with default run settings.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            settings: RunSettings::default(),
            sink: None,
        }
    }

    /// Sets the run settings.
    #[must_use]
    pub fn with_settings(mut self, settings: RunSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Routes failure snapshots to a custom sink instead of the
    /// settings' snapshot directory.
    #[must_use]
    pub fn with_snapshot_sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the run settings.
    #[must_use]
    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Returns the step names in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.config.steps().iter().map(|d| d.name()).collect()
    }

    /// Runs every step in order and returns the last step's value.
    ///
    /// # Errors
    ///
    /// Returns a configuration error before any step runs, or the first
    /// step failure unchanged.
    pub fn run(&self) -> Result<Value, PipelineError> {
        self.run_report().into_result()
    }

    /// Runs the pipeline and reports how the run went.
    pub fn run_report(&self) -> RunReport {
        let ctx = self.invocation_context();
        let run_id = ctx.run_id();
        let timer = SpanTimer::start();

        let mut state = RunState::NotStarted;
        let mut steps_invoked = Vec::with_capacity(self.config.len());

        let outcome = match self.config.validate() {
            Ok(()) => {
                transition(&mut state, RunState::Running, run_id);
                self.execute(&ctx, &mut steps_invoked)
            }
            Err(err) => Err(err.into()),
        };

        match &outcome {
            Ok(_) => transition(&mut state, RunState::Completed, run_id),
            Err(err) => {
                transition(&mut state, RunState::Failed, run_id);
                warn!(run_id = %run_id, error_kind = %err.kind(), error = %err, "Pipeline failed");
            }
        }

        let duration_ms = timer.finish();
        info!(
            run_id = %run_id,
            steps = steps_invoked.len(),
            duration_ms,
            "Pipeline finished"
        );

        RunReport {
            run_id,
            state,
            steps_invoked,
            duration_ms,
            outcome,
        }
    }

    fn execute(&self, ctx: &InvocationContext, invoked: &mut Vec<String>) -> Result<Value, PipelineError> {
        let mut result = Value::Null;

        for descriptor in self.config.steps() {
            info!(
                run_id = %ctx.run_id(),
                step = descriptor.name(),
                input = %result,
                "Running step"
            );

            let carried = if result.is_null() {
                None
            } else {
                Some(std::mem::take(&mut result))
            };

            invoked.push(descriptor.name().to_string());
            result = Instrumented::from_descriptor(descriptor).invoke(carried, ctx)?;
        }

        Ok(result)
    }

    fn invocation_context(&self) -> InvocationContext {
        let sink = self
            .sink
            .clone()
            .unwrap_or_else(|| Arc::new(SnapshotStore::new(self.settings.snapshot_dir.clone())));
        InvocationContext::new(sink).with_debug(self.settings.debug)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("settings", &self.settings)
            .field("custom_sink", &self.sink.is_some())
            .finish()
    }
}

fn transition(state: &mut RunState, next: RunState, run_id: Uuid) {
    debug_assert!(state.can_transition_to(next), "{state} -> {next}");
    debug!(run_id = %run_id, from = %state, to = %next, "Pipeline state changed");
    *state = next;
}
