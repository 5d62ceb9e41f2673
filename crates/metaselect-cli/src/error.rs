//! Error types for metaselect-cli

use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// File could not be read or written
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON input did not parse
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// TOML config did not parse
    #[error("Invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Library error, message as logged
    #[error(transparent)]
    Selector(#[from] metaselect::MetaLearnError),

    /// Result could not be printed
    #[error("Cannot encode output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io { .. } => ExitCode::from(3),
            Self::Json { .. } | Self::Toml { .. } => ExitCode::from(4),
            Self::Selector(e) if e.is_config() => ExitCode::from(2),
            Self::Selector(e) if e.is_state() => ExitCode::from(5),
            Self::Selector(_) => ExitCode::from(1),
            Self::Output(_) => ExitCode::from(7),
        }
    }
}
