//! The persisted failure record.

use crate::core::StepInput;
use crate::errors::PipelineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type name and message of the error that triggered a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    /// The error kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// The error message.
    pub message: String,
}

impl ExceptionInfo {
    /// Creates exception info.
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Captures kind and message of an error.
    #[must_use]
    pub fn from_error(err: &PipelineError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Everything needed to re-run one failed step call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The failing step.
    pub step_name: String,
    /// The exact arguments the step was invoked with.
    pub input: StepInput,
    /// The error the step raised.
    pub exception: ExceptionInfo,
    /// When the failure was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Creates a snapshot without a capture time.
    #[must_use]
    pub fn new(step_name: impl Into<String>, input: StepInput, exception: ExceptionInfo) -> Self {
        Self {
            step_name: step_name.into(),
            input,
            exception,
            captured_at: None,
        }
    }

    /// Records a failed call, stamped with the current time.
    #[must_use]
    pub fn capture(step_name: impl Into<String>, input: StepInput, err: &PipelineError) -> Self {
        Self {
            captured_at: Some(Utc::now()),
            ..Self::new(step_name, input, ExceptionInfo::from_error(err))
        }
    }

    /// Returns the first recorded positional argument.
    #[must_use]
    pub fn first_arg(&self) -> Option<&Value> {
        self.input.first_arg()
    }
}
