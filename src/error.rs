//! Error types for metaselect operations.
//!
//! Configuration and state errors carry the exact message that was logged
//! when they were raised, so callers can surface them verbatim.

use thiserror::Error;

/// Boxed source error carried by state errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for metaselect operations.
///
/// # Examples
///
/// ```
/// use metaselect::error::MetaLearnError;
///
/// let err = MetaLearnError::Config("Illegal test set.".to_string());
/// assert_eq!(err.to_string(), "Illegal test set.");
/// assert!(err.is_config());
/// ```
#[derive(Debug, Error)]
pub enum MetaLearnError {
    /// Invalid metadata, arguments or input shape.
    #[error("{0}")]
    Config(String),

    /// Operation not allowed in the current selector state, or a persisted
    /// model could not be restored.
    #[error("{message}")]
    State {
        /// Human-readable message (identical to the logged one)
        message: String,
        /// Underlying failure, if any
        #[source]
        source: Option<BoxError>,
    },

    /// A predicted candidate model has no entry in a row's hyper-parameter table.
    #[error("Candidate model '{label}' has no recorded error in row {row} of the hyper-parameter table")]
    MissingCandidate {
        /// Candidate model label
        label: String,
        /// Row index within the evaluated split
        row: usize,
    },

    /// Invalid hyperparameter value provided to a classifier backend.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Matrix/vector dimensions don't match for the operation.
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// A classifier backend was used before `fit`.
    #[error("Model not fitted")]
    NotFitted,

    /// I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error with string message.
    #[error("{0}")]
    Other(String),
}

impl MetaLearnError {
    /// Logs `message` at error level and returns a configuration error carrying it.
    pub fn config(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!("{message}");
        Self::Config(message)
    }

    /// Logs `message` at error level and returns a state error carrying it.
    pub fn state(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!("{message}");
        Self::State {
            message,
            source: None,
        }
    }

    /// Like [`MetaLearnError::state`], keeping `source` as the cause.
    pub fn state_with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        let message = message.into();
        let source = source.into();
        tracing::error!(cause = %source, "{message}");
        Self::State {
            message,
            source: Some(source),
        }
    }

    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Returns true for configuration errors.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true for state errors.
    #[must_use]
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }
}

impl From<&str> for MetaLearnError {
    fn from(msg: &str) -> Self {
        MetaLearnError::Other(msg.to_string())
    }
}

impl From<String> for MetaLearnError {
    fn from(msg: String) -> Self {
        MetaLearnError::Other(msg)
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, MetaLearnError>;
