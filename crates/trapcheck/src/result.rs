//! Result and error types for Trapcheck.

use thiserror::Error;

/// Result type for Trapcheck operations
pub type TrapResult<T> = Result<T, TrapError>;

/// Errors that can occur while driving a dialog under test
#[derive(Debug, Error)]
pub enum TrapError {
    /// No element matched the locator
    #[error("No element found for locator: {selector}")]
    LocatorNotFound {
        /// CSS locator that matched nothing
        selector: String,
    },

    /// The active element differs from the expected one
    #[error("Focus mismatch after {step} step(s): expected {expected}, found {observed}")]
    FocusMismatch {
        /// Locator of the element that should have focus
        expected: String,
        /// Description of the element that has focus
        observed: String,
        /// Number of key presses sent before the check
        step: usize,
    },

    /// The focus settle poll expired
    #[error("Focus did not settle within {ms}ms")]
    SettleTimeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Dialog never reported itself displayed
    #[error("Dialog {dialog} was not displayed within {ms}ms")]
    DialogNotOpened {
        /// Fixture name
        dialog: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element exists but cannot receive input
    #[error("Element is not interactable: {selector}")]
    ElementNotInteractable {
        /// CSS locator of the element
        selector: String,
    },

    /// Generic driver failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Script evaluation in page context failed
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Fixture definition is inconsistent
    #[error("Invalid fixture: {message}")]
    InvalidFixture {
        /// Error message
        message: String,
    },

    /// Suite configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl TrapError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a locator-not-found error
    #[must_use]
    pub fn not_found(selector: impl Into<String>) -> Self {
        Self::LocatorNotFound {
            selector: selector.into(),
        }
    }

    /// Create an invalid fixture error
    #[must_use]
    pub fn invalid_fixture(message: impl Into<String>) -> Self {
        Self::InvalidFixture {
            message: message.into(),
        }
    }

    /// Whether this error means the page lacks an expected element
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::LocatorNotFound { .. })
    }
}
