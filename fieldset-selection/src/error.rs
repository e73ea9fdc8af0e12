//! Error types for selection parsing and configuration loading.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for selection operations.
pub type SelectionResult<T> = Result<T, SelectionError>;

/// Errors that can occur while parsing a selection string or loading configuration.
#[derive(Error, Debug, Diagnostic)]
pub enum SelectionError {
    /// The selection string is not well formed (only reported under the strict policy).
    #[error("malformed selection: {message}")]
    #[diagnostic(code(fieldset::selection::malformed))]
    Malformed {
        #[source_code]
        src: String,
        #[label("error here")]
        span: miette::SourceSpan,
        message: String,
    },

    /// The selection nests deeper than the configured limit.
    #[error("selection nests {depth} levels deep, the limit is {limit}")]
    #[diagnostic(
        code(fieldset::selection::too_deep),
        help("request fewer nested levels or raise `selection.max_depth`")
    )]
    TooDeep { depth: usize, limit: usize },

    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(fieldset::selection::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(fieldset::selection::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(fieldset::selection::config_error))]
    ConfigError { message: String },
}

impl SelectionError {
    /// Create a malformed-selection error pointing at `src[offset..offset + len]`.
    pub fn malformed(
        src: impl Into<String>,
        offset: usize,
        len: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            src: src.into(),
            span: (offset, len).into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Check if this error was caused by the caller's selection string.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::TooDeep { .. })
    }
}

#[cfg(test)]
#[allow(unused_assignments)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_error() {
        let err = SelectionError::malformed("a{b", 1, 1, "unclosed `{`");

        match err {
            SelectionError::Malformed { src, span, message } => {
                assert_eq!(src, "a{b");
                assert_eq!(span.offset(), 1);
                assert_eq!(span.len(), 1);
                assert_eq!(message, "unclosed `{`");
            }
            _ => panic!("Expected Malformed"),
        }
    }

    #[test]
    fn test_malformed_display() {
        let err = SelectionError::malformed("a}", 1, 1, "unmatched `}`");
        let display = format!("{}", err);
        assert!(display.contains("malformed selection"));
        assert!(display.contains("unmatched `}`"));
    }

    #[test]
    fn test_too_deep_display() {
        let err = SelectionError::TooDeep { depth: 5, limit: 4 };
        let display = format!("{}", err);
        assert!(display.contains('5'));
        assert!(display.contains('4'));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(SelectionError::malformed("}", 0, 1, "x").is_client_error());
        assert!(SelectionError::TooDeep { depth: 2, limit: 1 }.is_client_error());
        assert!(!SelectionError::config("bad").is_client_error());
    }

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = SelectionError::IoError {
            path: "fieldset.toml".to_string(),
            source: io_err,
        };

        let display = format!("{}", err);
        assert!(display.contains("fieldset.toml"));
    }

    #[test]
    fn test_diagnostic_code() {
        let err = SelectionError::malformed("a{", 1, 1, "unclosed");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("fieldset::selection::malformed"));
    }
}
