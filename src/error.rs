//! Structured error types for the frequency pipeline
//!
//! Every failure inside the pipeline surfaces as a single [`PipelineError`]
//! carrying enough context to identify the offending input. Partial results
//! are never returned alongside an error.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Pipeline phases that run on the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Map,
    Reduce,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Map => "map",
            Phase::Reduce => "reduce",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for pipeline operations
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Text source {locator} unavailable: {reason}")]
    SourceUnavailable {
        locator: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{phase} worker failed on item {index} ({key:?}): {reason}")]
    WorkerFailure {
        phase: Phase,
        index: usize,
        key: String,
        reason: String,
    },

    #[error("{phase} worker task aborted unexpectedly: {reason}")]
    WorkerPanicked { phase: Phase, reason: String },

    #[error("Pipeline run was cancelled")]
    Cancelled,

    #[error("Pipeline run exceeded its timeout of {timeout:?}")]
    TimedOut { timeout: Duration },

    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Failed to read configuration from {path}")]
    ConfigLoad {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to render results: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Build a worker failure for a single unit of work
    pub fn worker(phase: Phase, index: usize, key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WorkerFailure {
            phase,
            index,
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Build a source failure, keeping the underlying error as the source
    pub fn source_unavailable<E>(locator: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::SourceUnavailable {
            locator: locator.into(),
            reason: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the run was stopped from the outside rather than failing on its own
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::TimedOut { .. })
    }

    /// Process exit code reported by the binary for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfiguration { .. } | Self::ConfigLoad { .. } => 2,
            Self::SourceUnavailable { .. } => 3,
            Self::WorkerFailure { .. } | Self::WorkerPanicked { .. } => 4,
            Self::TimedOut { .. } => 5,
            // Conventional exit status for SIGINT
            Self::Cancelled => 130,
            Self::Render(_) | Self::Io(_) => 1,
        }
    }

    /// Short message suitable for end users
    pub fn user_message(&self) -> String {
        match self {
            Self::SourceUnavailable { locator, .. } => {
                format!("Could not fetch text from {locator}")
            }
            Self::WorkerFailure { phase, key, .. } => {
                format!("The {phase} phase failed while processing {key:?}")
            }
            Self::Cancelled => "Cancelled".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
