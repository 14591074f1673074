//! Error types for the pipeflow framework.
//!
//! Step failures travel through the framework untouched: a [`StepError`]
//! produced by a step reaches the caller of [`Pipeline::run`] with the same
//! kind and message. Everything the framework itself can get wrong has its
//! own variant on [`PipelineError`].
//!
//! [`Pipeline::run`]: crate::pipeline::Pipeline::run

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pipeflow operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pipeline configuration cannot be run.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// A step's own error, forwarded verbatim.
    #[error(transparent)]
    Step(#[from] StepError),

    /// A step resource could not be acquired, prepared or released.
    #[error("{0}")]
    Resource(#[from] ResourceError),

    /// A snapshot could not be written or read.
    #[error("{0}")]
    Snapshot(#[from] SnapshotError),

    /// A replayed snapshot names a step the registry does not know.
    #[error("{0}")]
    ReplayLookup(#[from] ReplayLookupError),
}

impl PipelineError {
    /// Returns the error type name recorded in snapshots.
    ///
    /// For step errors this is the step's own kind; framework errors report
    /// their taxonomy name.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::Step(err) => err.kind(),
            Self::Resource(_) => "ResourceError",
            Self::Snapshot(_) => "SnapshotError",
            Self::ReplayLookup(_) => "ReplayLookupError",
        }
    }

    /// Returns the step error, if this is one.
    #[must_use]
    pub fn as_step_error(&self) -> Option<&StepError> {
        match self {
            Self::Step(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the error originated inside a step body.
    #[must_use]
    pub fn is_step_error(&self) -> bool {
        matches!(self, Self::Step(_))
    }
}

/// An error raised by a step's own business logic.
///
/// `kind` plays the role of an exception type name: it keys snapshot files
/// and is compared when a failure is replayed.
pub struct StepError {
    kind: String,
    message: String,
    cause: Option<anyhow::Error>,
}

impl StepError {
    /// Creates a step error with an explicit kind and message.
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Wraps any error, using its Rust type name as the kind.
    ///
    /// ```
    /// use pipeflow::errors::StepError;
    ///
    /// let err = StepError::from_error("x".parse::<i32>().unwrap_err());
    /// assert_eq!(err.kind(), "ParseIntError");
    /// ```
    #[must_use]
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            kind: short_type_name::<E>().to_string(),
            message: err.to_string(),
            cause: Some(anyhow::Error::new(err)),
        }
    }

    /// Attaches an underlying cause without changing kind or message.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<anyhow::Error>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("cause", &self.cause.as_ref().map(ToString::to_string))
            .finish()
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|cause| {
            let cause: &(dyn std::error::Error + Send + Sync + 'static) = cause.as_ref();
            cause as &(dyn std::error::Error + 'static)
        })
    }
}

/// Strips module path and generic arguments from a type name.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Error raised when a pipeline configuration cannot be run.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ConfigurationError {
    /// The error message.
    pub message: String,
    /// The steps involved in the error.
    pub steps: Vec<String>,
}

impl ConfigurationError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            steps: Vec::new(),
        }
    }

    /// Error for a pipeline with nothing to run.
    #[must_use]
    pub fn empty() -> Self {
        Self::new("No steps to run in the pipeline")
    }

    /// Error for a step name declared more than once.
    #[must_use]
    pub fn duplicate_step(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(format!("Step '{name}' is declared more than once")).with_steps(vec![name])
    }

    /// Sets the steps involved.
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<String>) -> Self {
        self.steps = steps;
        self
    }
}

/// Errors from acquiring, preparing or releasing a step resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The connection could not be opened.
    #[error("Failed to open resource '{locator}': {source}")]
    Open {
        /// The resource locator.
        locator: String,
        /// The underlying database error.
        #[source]
        source: rusqlite::Error,
    },

    /// The table schema is unusable.
    #[error("Invalid schema for table '{table}': {reason}")]
    InvalidSchema {
        /// The table name.
        table: String,
        /// Why the schema was rejected.
        reason: String,
    },

    /// Applying the table schema failed.
    #[error("Failed to apply schema for table '{table}' on '{locator}': {source}")]
    Schema {
        /// The resource locator.
        locator: String,
        /// The table name.
        table: String,
        /// The underlying database error.
        #[source]
        source: rusqlite::Error,
    },

    /// Closing the connection failed.
    #[error("Failed to release resource '{locator}': {source}")]
    Release {
        /// The resource locator.
        locator: String,
        /// The underlying database error.
        #[source]
        source: rusqlite::Error,
    },
}

/// Errors from writing or reading snapshot records.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem access failed.
    #[error("Snapshot IO error at {path:?}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be encoded.
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    /// The stored record cannot be decoded or lacks required fields.
    #[error("Corrupt snapshot at {path:?}: {reason}")]
    Corrupt {
        /// The snapshot file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },
}

impl SnapshotError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for undecodable or incomplete records.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

/// Error raised when replay cannot resolve a snapshot's step.
#[derive(Debug, Clone, Error)]
#[error("Step '{step_name}' not found in registry (available: {})", available.join(", "))]
pub struct ReplayLookupError {
    /// The step name recorded in the snapshot.
    pub step_name: String,
    /// The names the registry does know.
    pub available: Vec<String>,
}

impl ReplayLookupError {
    /// Creates a new lookup error.
    #[must_use]
    pub fn new(step_name: impl Into<String>, available: Vec<String>) -> Self {
        Self {
            step_name: step_name.into(),
            available,
        }
    }
}
