//! Error types for the BitBuffet SDK.

use std::fmt;
use thiserror::Error;

/// Result type for BitBuffet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by a [`Transport`](crate::Transport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for the BitBuffet SDK.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid client setup. Fix the configuration and build a new client.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mutually exclusive sampling parameters were supplied together.
    #[error("Parameter conflict: {0}")]
    ParameterConflict(String),

    /// The schema/mode combination is invalid.
    #[error("Mode mismatch: {0}")]
    ModeMismatch(String),

    /// A call argument is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A raw schema document could not be compiled.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Connection failure, timeout, non-2xx status or unreadable body.
    #[error("Transport error: {message}")]
    Transport {
        /// Error message, including the underlying cause
        message: String,
        /// HTTP status, when the server answered
        status: Option<u16>,
        /// Whether the per-call timeout expired
        timed_out: bool,
        /// Underlying cause
        #[source]
        source: Option<BoxError>,
    },

    /// The server answered but reported a failed extraction.
    #[error("API returned error: {0}")]
    Api(String),

    /// The returned data does not conform to the requested schema.
    #[error("Validation error: {}", format_violations(.violations))]
    Validation {
        /// Every violation found, not just the first
        violations: Vec<Violation>,
    },
}

impl Error {
    pub(crate) fn timeout(timeout: std::time::Duration) -> Self {
        Error::Transport {
            message: format!("Request timed out after {}ms", timeout.as_millis()),
            status: None,
            timed_out: true,
            source: None,
        }
    }

    /// Returns true for transport failures caused by the per-call timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport { timed_out: true, .. })
    }
}

/// A single field-level schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer to the offending value (empty for the root).
    pub path: String,
    /// Human readable description.
    pub message: String,
}

impl Violation {
    /// Create a violation at the given JSON pointer.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_violation() {
        let err = Error::Validation {
            violations: vec![
                Violation::new("/title", "\"title\" is a required property"),
                Violation::new("", "root must be an object"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("/title: \"title\" is a required property"));
        assert!(msg.contains("root must be an object"));
    }

    #[test]
    fn test_transport_timeout_detection() {
        let err = Error::timeout(std::time::Duration::from_millis(10));
        assert!(err.is_timeout());
        assert!(err.to_string().contains("10ms"));
        let refused = Error::Transport {
            message: "API request failed: connection refused".into(),
            status: None,
            timed_out: false,
            source: None,
        };
        assert!(!refused.is_timeout());
        assert!(!Error::Api("Request timed out".into()).is_timeout());
    }
}
