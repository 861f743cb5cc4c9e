//! Error types for datasets, pipeline stages and estimators.

use std::fmt;

/// Error type for every fallible operation in the crate.
///
/// Configuration and fit errors signal a static data/schema mismatch the caller
/// has to fix; they are never retried. Values unseen at fit time are not errors:
/// stages map them to reserved buckets and report them through `tracing` and
/// [`drift_report`](crate::pipeline::FittedColumnScopedPipeline::drift_report).
#[derive(Debug)]
pub enum PipelineError {
    /// A stage's declared columns are absent or of the wrong kind, or a stage
    /// received input an earlier stage should have resolved.
    Configuration { stage: String, message: String },
    /// A stage cannot compute its statistics from the training data.
    Fit {
        stage: String,
        column: String,
        message: String,
    },
    /// Invalid hyperparameter value.
    InvalidParameter(String),
    /// Empty data provided where non-empty was required.
    EmptyData(String),
    /// Estimator input width differs from what it was fitted on.
    FeatureMismatch { expected: usize, got: usize },
    /// Serialization or deserialization error.
    Serialization(String),
    /// I/O error during file operations.
    Io(String),
}

impl PipelineError {
    pub(crate) fn configuration(stage: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::Configuration {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub(crate) fn fit(
        stage: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        PipelineError::Fit {
            stage: stage.into(),
            column: column.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Configuration { stage, message } => {
                write!(f, "Configuration error in stage '{}': {}", stage, message)
            }
            PipelineError::Fit {
                stage,
                column,
                message,
            } => {
                write!(
                    f,
                    "Fit error in stage '{}', column '{}': {}",
                    stage, column, message
                )
            }
            PipelineError::InvalidParameter(msg) => {
                write!(f, "Invalid parameter: {}", msg)
            }
            PipelineError::EmptyData(msg) => {
                write!(f, "Empty data: {}", msg)
            }
            PipelineError::FeatureMismatch { expected, got } => {
                write!(
                    f,
                    "Feature mismatch: expected {} features, got {}",
                    expected, got
                )
            }
            PipelineError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            PipelineError::Io(msg) => {
                write!(f, "I/O error: {}", msg)
            }
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

impl From<bincode::Error> for PipelineError {
    fn from(err: bincode::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
