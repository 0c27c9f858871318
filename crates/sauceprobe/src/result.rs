//! Result and error types for sauceprobe.

use std::time::Duration;
use thiserror::Error;

/// Result type for sauceprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Classification of a failure, used by waits to decide whether a failed
/// evaluation is retried or propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Element reference no longer attached to the DOM
    StaleElement,
    /// No element matched the selector
    NoSuchElement,
    /// Element exists but cannot receive input
    ElementNotInteractable,
    /// Frame could not be found or switched to
    NoSuchFrame,
    /// No alert is open
    NoAlert,
    /// Script evaluation raised an error
    Script,
    /// Selector is malformed
    InvalidSelector,
    /// Caller passed an invalid argument
    InvalidArgument,
    /// Browser session is gone or unusable
    SessionLost,
    /// Wait deadline passed
    Timeout,
    /// Wait was cancelled through its token
    Cancelled,
    /// Assertion over page state failed
    Assertion,
    /// Test data could not be read or parsed
    Data,
    /// Configuration could not be read or parsed
    Config,
    /// External command failed
    Command,
    /// Underlying I/O failure
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::StaleElement => "stale element",
            Self::NoSuchElement => "no such element",
            Self::ElementNotInteractable => "element not interactable",
            Self::NoSuchFrame => "no such frame",
            Self::NoAlert => "no alert",
            Self::Script => "script error",
            Self::InvalidSelector => "invalid selector",
            Self::InvalidArgument => "invalid argument",
            Self::SessionLost => "session lost",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Assertion => "assertion",
            Self::Data => "test data",
            Self::Config => "config",
            Self::Command => "command",
            Self::Io => "i/o",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in sauceprobe
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Element reference went stale between lookup and use
    #[error("Stale element: {message}")]
    StaleElement {
        /// Error message
        message: String,
    },

    /// No element matched
    #[error("No element found for {selector}")]
    NoSuchElement {
        /// Selector that failed
        selector: String,
    },

    /// Element cannot be interacted with
    #[error("Element not interactable: {message}")]
    ElementNotInteractable {
        /// Error message
        message: String,
    },

    /// Frame switch failed
    #[error("No such frame: {frame}")]
    NoSuchFrame {
        /// Frame identifier
        frame: String,
    },

    /// Alert operation without an open alert
    #[error("No alert is present")]
    NoAlert,

    /// Script evaluation failed
    #[error("Script failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Selector could not be parsed by the browser
    #[error("Invalid selector {selector}: {message}")]
    InvalidSelector {
        /// Offending selector
        selector: String,
        /// Error message
        message: String,
    },

    /// Invalid argument passed by the caller
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Browser session unusable
    #[error("Browser session lost: {message}")]
    SessionLost {
        /// Error message
        message: String,
    },

    /// Wait deadline passed without the condition being met
    #[error(
        "Timed out after {:.3}s (timeout {:.3}s, {attempts} attempt(s)) waiting for {condition}{}",
        .elapsed.as_secs_f64(),
        .timeout.as_secs_f64(),
        .last_observation.as_deref().map(|o| format!("; last observation: {o}")).unwrap_or_default()
    )]
    Timeout {
        /// Description of the awaited condition
        condition: String,
        /// Configured timeout
        timeout: Duration,
        /// Time actually spent
        elapsed: Duration,
        /// Number of predicate evaluations
        attempts: usize,
        /// Last diagnostic seen before giving up
        last_observation: Option<String>,
    },

    /// Wait was cancelled from outside
    #[error("Wait for {condition} cancelled after {:.3}s", .elapsed.as_secs_f64())]
    Cancelled {
        /// Description of the awaited condition
        condition: String,
        /// Time spent before cancellation
        elapsed: Duration,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Test data error
    #[error("Test data error: {message}")]
    Data {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// External command error
    #[error("Command `{command}` failed: {message}")]
    Command {
        /// Command line
        command: String,
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

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Step pattern did not compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl ProbeError {
    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::StaleElement { .. } => ErrorKind::StaleElement,
            Self::NoSuchElement { .. } => ErrorKind::NoSuchElement,
            Self::ElementNotInteractable { .. } => ErrorKind::ElementNotInteractable,
            Self::NoSuchFrame { .. } => ErrorKind::NoSuchFrame,
            Self::NoAlert => ErrorKind::NoAlert,
            Self::Script { .. } => ErrorKind::Script,
            Self::InvalidSelector { .. } => ErrorKind::InvalidSelector,
            Self::InvalidArgument { .. } | Self::Regex(_) => ErrorKind::InvalidArgument,
            Self::SessionLost { .. } => ErrorKind::SessionLost,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::AssertionFailed { .. } => ErrorKind::Assertion,
            Self::Data { .. } | Self::Json(_) | Self::Csv(_) => ErrorKind::Data,
            Self::Config { .. } | Self::Yaml(_) => ErrorKind::Config,
            Self::Command { .. } => ErrorKind::Command,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether this error is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Create a stale element error
    #[must_use]
    pub fn stale(message: impl Into<String>) -> Self {
        Self::StaleElement {
            message: message.into(),
        }
    }

    /// Create a no-such-element error
    #[must_use]
    pub fn no_such_element(selector: impl Into<String>) -> Self {
        Self::NoSuchElement {
            selector: selector.into(),
        }
    }

    /// Create a script error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
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

    /// Create a session lost error
    #[must_use]
    pub fn session_lost(message: impl Into<String>) -> Self {
        Self::SessionLost {
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a test data error
    #[must_use]
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
