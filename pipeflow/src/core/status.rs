//! Pipeline run state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The state of a single pipeline run.
///
/// A run moves `NotStarted -> Running` and then ends in either `Completed`
/// or `Failed`. State is never carried across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// The run has not started executing steps.
    #[default]
    NotStarted,
    /// Steps are being executed.
    Running,
    /// Every step returned successfully.
    Completed,
    /// A step or the configuration failed.
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl RunState {
    /// Returns true if the state represents a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of this state.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Running | Self::Failed)
                | (Self::Running, Self::Completed | Self::Failed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_display() {
        assert_eq!(RunState::NotStarted.to_string(), "not_started");
        assert_eq!(RunState::Running.to_string(), "running");
        assert_eq!(RunState::Completed.to_string(), "completed");
        assert_eq!(RunState::Failed.to_string(), "failed");
    }

    #[test]
    fn test_run_state_is_terminal() {
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(!RunState::NotStarted.is_terminal());
        assert!(!RunState::Running.is_terminal());
    }

    #[test]
    fn test_run_state_transitions() {
        assert!(RunState::NotStarted.can_transition_to(RunState::Running));
        assert!(RunState::Running.can_transition_to(RunState::Completed));
        assert!(RunState::Running.can_transition_to(RunState::Failed));
        assert!(!RunState::Completed.can_transition_to(RunState::Running));
        assert!(!RunState::Failed.can_transition_to(RunState::Completed));
        assert!(!RunState::NotStarted.can_transition_to(RunState::Completed));
    }

    #[test]
    fn test_run_state_serialize() {
        let json = serde_json::to_string(&RunState::NotStarted).unwrap();
        assert_eq!(json, r#""not_started""#);

        let deserialized: RunState = serde_json::from_str(r#""failed""#).unwrap();
        assert_eq!(deserialized, RunState::Failed);
    }
}
