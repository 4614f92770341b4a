//! Error types for the engine.
//!
//! Parsing itself never fails for any string input: malformed syntax
//! degrades to literal text and resource exhaustion degrades to a flat-text
//! fallback. Errors are reserved for caller-contract violations.
use thiserror::Error;

/// Main error type for the engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarkdownError {
    /// The caller supplied a contradictory or unusable option set.
    #[error("invalid options: {message}")]
    InvalidOptions { message: String },

    /// The input exceeds the configured size limit.
    #[error("input of {size} bytes exceeds maximum allowed size of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },
}

/// Convenience alias for results in this crate.
pub type Result<T> = std::result::Result<T, MarkdownError>;

impl MarkdownError {
    /// Creates an invalid-options error.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        MarkdownError::InvalidOptions {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_limit() {
        let err = MarkdownError::InputTooLarge { size: 10, limit: 5 };
        let text = format!("{err}");
        assert!(text.contains("exceeds maximum allowed size"));
        assert!(text.contains('5'));
    }

    #[test]
    fn invalid_options_constructor() {
        let err = MarkdownError::invalid_options("bad");
        assert_eq!(
            err,
            MarkdownError::InvalidOptions {
                message: "bad".to_string()
            }
        );
    }
}
