//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// At least one scenario failed
    #[error("{failed} of {total} scenario(s) failed")]
    ScenariosFailed {
        /// Failed scenario count
        failed: usize,
        /// Scenarios run
        total: usize,
    },

    /// Feature not compiled in
    #[error("{feature} support is not enabled; rebuild with --features {feature}")]
    FeatureDisabled {
        /// Cargo feature name
        feature: &'static str,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Trapcheck library error
    #[error("Trapcheck error: {0}")]
    Trap(#[from] trapcheck::TrapError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
