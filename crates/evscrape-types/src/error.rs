//! Error types for data parsing in evscrape-types.

use thiserror::Error;

/// Errors that can occur when interpreting text scraped from the app.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The refresh-status text did not start with the expected label.
    #[error("expected '{label}' prefix in refresh status, got '{text}'")]
    MissingLabel {
        /// The label that was expected.
        label: String,
        /// The text that was read.
        text: String,
    },

    /// The timestamp text did not match the expected shape.
    #[error("invalid timestamp '{text}': {reason}")]
    InvalidTimestamp {
        /// The text after the label was removed.
        text: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A timezone name is not in the IANA database.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    /// A `field-name=value` line or JSON object did not describe a record.
    #[error("invalid status record: {0}")]
    InvalidRecord(String),
}

/// Result type alias using evscrape-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
