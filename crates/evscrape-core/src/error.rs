//! Error types for evscrape-core.
//!
//! Every failure in a run is fatal. What differs between errors is whether
//! a session existed when they happened, which decides if a diagnostic
//! screenshot is taken before teardown.
//!
//! | Error | Kind | Screenshot |
//! |-------|------|------------|
//! | [`Error::ServerUnavailable`] | Backend | no |
//! | [`Error::SessionCreation`] | Backend | no |
//! | [`Error::ElementNotFound`] | ElementNotFound | yes |
//! | [`Error::RefreshTimeout`] | RefreshTimeout | yes |
//! | [`Error::Parse`] | Parse | yes |
//! | everything else | Other | yes |

use std::time::Duration;

use thiserror::Error;

use evscrape_types::{ElementLocator, ParseError};

/// Errors that can occur while driving the app.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The automation backend could not be reached or exited early.
    #[error("Automation server unavailable at {url}: {reason}")]
    ServerUnavailable {
        /// Backend base URL.
        url: String,
        /// What went wrong.
        reason: String,
    },

    /// The backend refused to create a session (bad capabilities, app failed
    /// to install or launch, no device).
    #[error("Failed to create automation session (HTTP {status}): {message}")]
    SessionCreation {
        /// HTTP status of the reply.
        status: u16,
        /// Message reported by the backend.
        message: String,
    },

    /// A control did not appear within the implicit wait.
    #[error("Element '{locator}' not found after {waited:?}")]
    ElementNotFound {
        /// The control that was looked for.
        locator: ElementLocator,
        /// How long the lookup retried.
        waited: Duration,
    },

    /// The in-app refresh did not finish before the deadline.
    #[error("Timed out waiting for refresh after {waited:?}")]
    RefreshTimeout {
        /// The polling deadline that elapsed.
        waited: Duration,
    },

    /// A polled operation exceeded its deadline.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// The backend answered a command with a protocol error.
    #[error("WebDriver command '{command}' failed: {error}: {message}")]
    WebDriver {
        /// The command that failed.
        command: String,
        /// W3C error code (e.g. `stale element reference`).
        error: String,
        /// Human-readable message.
        message: String,
    },

    /// Scraped text could not be interpreted.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The session was used after it was released.
    #[error("Session already closed")]
    SessionClosed,

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of [`Error`], matching how a run reports failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Backend,
    ElementNotFound,
    RefreshTimeout,
    Parse,
    Other,
}

impl Error {
    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a protocol error for `command`.
    pub fn webdriver(
        command: impl Into<String>,
        error: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::WebDriver {
            command: command.into(),
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ServerUnavailable { .. } | Error::SessionCreation { .. } => ErrorKind::Backend,
            Error::ElementNotFound { .. } => ErrorKind::ElementNotFound,
            Error::RefreshTimeout { .. } => ErrorKind::RefreshTimeout,
            Error::Parse(_) => ErrorKind::Parse,
            _ => ErrorKind::Other,
        }
    }

    /// Whether a diagnostic screenshot should be taken for this error.
    ///
    /// Backend errors happen before a session exists.
    pub fn wants_screenshot(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Backend) && !matches!(self, Error::SessionClosed)
    }

    /// Whether this is a W3C `no such element` reply.
    pub fn is_no_such_element(&self) -> bool {
        matches!(self, Error::WebDriver { error, .. } if error == "no such element")
    }
}

/// Result type alias using evscrape-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ElementNotFound {
            locator: ElementLocator::new("pkg:id/demoMode"),
            waited: Duration::from_secs(60),
        };
        assert!(err.to_string().contains("pkg:id/demoMode"));
        assert!(err.to_string().contains("60s"));

        let err = Error::RefreshTimeout {
            waited: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "Timed out waiting for refresh after 30s");

        let err = Error::timeout("server_ready", Duration::from_secs(10));
        assert!(err.to_string().contains("server_ready"));
    }

    #[test]
    fn test_kinds_are_distinct() {
        let not_found = Error::ElementNotFound {
            locator: ElementLocator::new("x"),
            waited: Duration::ZERO,
        };
        let refresh = Error::RefreshTimeout {
            waited: Duration::ZERO,
        };
        let backend = Error::SessionCreation {
            status: 500,
            message: "no emulator".to_string(),
        };
        assert_eq!(not_found.kind(), ErrorKind::ElementNotFound);
        assert_eq!(refresh.kind(), ErrorKind::RefreshTimeout);
        assert_eq!(backend.kind(), ErrorKind::Backend);
    }

    #[test]
    fn test_screenshot_policy() {
        assert!(!Error::ServerUnavailable {
            url: "http://localhost:4723".to_string(),
            reason: "refused".to_string(),
        }
        .wants_screenshot());
        assert!(Error::RefreshTimeout {
            waited: Duration::from_secs(30)
        }
        .wants_screenshot());
        assert!(Error::Parse(ParseError::UnknownTimezone("Mars/Base".to_string())).wants_screenshot());
    }

    #[test]
    fn test_no_such_element_detection() {
        assert!(Error::webdriver("find_element", "no such element", "gone").is_no_such_element());
        assert!(!Error::webdriver("click", "stale element reference", "gone").is_no_such_element());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }
}
