//! Error types for rendering and planning.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: F{category}{number}
//! - 2xxx: Render errors (field conversion, serialization)
//!
//! Selection and configuration errors are reported by
//! [`SelectionError`](fieldset_selection::SelectionError), which carries its
//! own diagnostic codes.
//!
//! ```rust
//! use fieldset_query::{ErrorCode, RenderError};
//!
//! let err = RenderError::custom("bad value").in_field("email");
//! assert_eq!(err.code(), ErrorCode::FieldConversion);
//! assert_eq!(err.code().code(), "F2001");
//! assert!(err.to_string().contains("email"));
//! ```

use std::fmt;

use thiserror::Error;

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Render errors (2xxx)
    /// A field converter failed (F2001).
    FieldConversion = 2001,
    /// Converting a value to JSON failed (F2002).
    Serialization = 2002,
}

impl ErrorCode {
    /// Get the error code string (e.g., "F2001").
    pub fn code(&self) -> String {
        format!("F{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::FieldConversion => "Field conversion failed",
            Self::Serialization => "Serialization error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while rendering a source object.
///
/// A field that cannot be read is not an error: its getter returns
/// [`SkipField`](crate::fields::SkipField) and the field is left out.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A field's converter failed.
    #[error("failed to render field `{field}`: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Converting a value to JSON failed.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Converter-specific failure.
    #[error("{message}")]
    Custom { message: String },
}

impl RenderError {
    /// Create a converter-specific error.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }

    /// Attach the name of the field that was being rendered.
    pub fn in_field(self, field: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Field { .. } | Self::Custom { .. } => ErrorCode::FieldConversion,
            Self::Serialize(_) => ErrorCode::Serialization,
        }
    }

    /// Dotted path of nested field names leading to the failure.
    pub fn field_path(&self) -> Option<String> {
        let mut path: Vec<&str> = Vec::new();
        let mut current: &(dyn std::error::Error + 'static) = self;
        while let Some(Self::Field { field, source }) = current.downcast_ref::<Self>() {
            path.push(field);
            current = source.as_ref();
        }
        (!path.is_empty()).then(|| path.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::FieldConversion.code(), "F2001");
        assert_eq!(ErrorCode::Serialization.to_string(), "F2002");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::Serialization.description(), "Serialization error");
    }

    #[test]
    fn test_in_field_display() {
        let err = RenderError::custom("not a date").in_field("created_at");
        let display = err.to_string();
        assert!(display.contains("created_at"));
        assert!(display.contains("not a date"));
    }

    #[test]
    fn test_field_path() {
        let err = RenderError::custom("boom").in_field("city").in_field("address");
        assert_eq!(err.field_path().as_deref(), Some("address.city"));
        assert_eq!(RenderError::custom("boom").field_path(), None);
    }

    #[test]
    fn test_render_error_codes() {
        let err = RenderError::custom("boom");
        assert_eq!(err.code(), ErrorCode::FieldConversion);
        assert_eq!(err.in_field("name").code(), ErrorCode::FieldConversion);

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(RenderError::from(json_err).code(), ErrorCode::Serialization);
    }
}
