//! Mock steps for testing.

use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::StepError;
use crate::resource::ResourceHandle;
use crate::steps::Step;

/// Shared, ordered log of step names, used to check invocation order
/// across several recording steps.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// A step that records every input it receives and returns a fixed value.
#[derive(Debug)]
pub struct RecordingStep {
    name: String,
    output: Value,
    inputs: Mutex<Vec<Option<Value>>>,
    log: Option<CallLog>,
}

impl RecordingStep {
    /// Creates a recording step returning `output`.
    #[must_use]
    pub fn new(name: impl Into<String>, output: Value) -> Self {
        Self {
            name: name.into(),
            output,
            inputs: Mutex::new(Vec::new()),
            log: None,
        }
    }

    /// Appends this step's name to `log` on every call.
    #[must_use]
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Returns the step name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of times the step was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inputs.lock().len()
    }

    /// Returns the input of each call, in order.
    #[must_use]
    pub fn inputs(&self) -> Vec<Option<Value>> {
        self.inputs.lock().clone()
    }

    /// Clears recorded calls.
    pub fn reset(&self) {
        self.inputs.lock().clear();
    }
}

impl Step for RecordingStep {
    fn call(&self, input: Option<Value>, _resource: Option<&ResourceHandle>) -> Result<Value, StepError> {
        self.inputs.lock().push(input);
        if let Some(log) = &self.log {
            log.lock().push(self.name.clone());
        }
        Ok(self.output.clone())
    }
}

/// A step that always fails with the same kind and message.
#[derive(Debug)]
pub struct FailingStep {
    kind: String,
    message: String,
    calls: Mutex<usize>,
}

impl FailingStep {
    /// Creates a new failing step.
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            calls: Mutex::new(0),
        }
    }

    /// Returns the number of times the step was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

impl Step for FailingStep {
    fn call(&self, _input: Option<Value>, _resource: Option<&ResourceHandle>) -> Result<Value, StepError> {
        *self.calls.lock() += 1;
        Err(StepError::new(&self.kind, &self.message))
    }
}

/// A step that ignores its input and returns a constant.
#[derive(Debug, Clone)]
pub struct ConstStep {
    value: Value,
}

impl ConstStep {
    /// Creates a constant step.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Step for ConstStep {
    fn call(&self, _input: Option<Value>, _resource: Option<&ResourceHandle>) -> Result<Value, StepError> {
        Ok(self.value.clone())
    }
}

/// A step that blocks for a while before passing its input through.
#[derive(Debug)]
pub struct SlowStep {
    delay: Duration,
}

impl SlowStep {
    /// Creates a new slow step.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Creates a slow step with delay in milliseconds.
    #[must_use]
    pub fn with_delay_ms(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl Step for SlowStep {
    fn call(&self, input: Option<Value>, _resource: Option<&ResourceHandle>) -> Result<Value, StepError> {
        std::thread::sleep(self.delay);
        Ok(input.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recording_step() {
        let log = CallLog::default();
        let step = RecordingStep::new("rec", json!("out")).with_log(log.clone());

        assert_eq!(step.call(None, None).unwrap(), json!("out"));
        assert_eq!(step.call(Some(json!(1)), None).unwrap(), json!("out"));

        assert_eq!(step.call_count(), 2);
        assert_eq!(step.inputs(), vec![None, Some(json!(1))]);
        assert_eq!(*log.lock(), vec!["rec".to_string(), "rec".to_string()]);

        step.reset();
        assert_eq!(step.call_count(), 0);
    }

    #[test]
    fn test_failing_step() {
        let step = FailingStep::new("KeyError", "'price'");
        let err = step.call(None, None).unwrap_err();
        assert_eq!(err.kind(), "KeyError");
        assert_eq!(err.message(), "'price'");
        assert_eq!(step.call_count(), 1);
    }

    #[test]
    fn test_slow_step_passes_input_through() {
        let step = SlowStep::with_delay_ms(1);
        assert_eq!(step.call(Some(json!(7)), None).unwrap(), json!(7));
    }
}
