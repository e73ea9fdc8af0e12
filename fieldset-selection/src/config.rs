//! Configuration file parsing for `fieldset.toml`.
//!
//! ```toml
//! [selection]
//! param = "fields"
//! policy = "strict"
//! max_depth = 8
//!
//! [pagination]
//! limit_param = "page_size"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SelectionError, SelectionResult};
use crate::parser::{BracePolicy, DEFAULT_MAX_DEPTH, ParseOptions};

/// Main configuration structure for `fieldset.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FieldsetConfig {
    /// Selection parsing settings.
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Request parameters carrying pagination hints.
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl FieldsetConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> SelectionResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SelectionError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> SelectionResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| SelectionError::TomlError { source: e })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot reject on its own.
    pub fn validate(&self) -> SelectionResult<()> {
        if self.selection.param.trim().is_empty() {
            return Err(SelectionError::config("`selection.param` must not be empty"));
        }
        if self.selection.max_depth == 0 {
            return Err(SelectionError::config("`selection.max_depth` must be at least 1"));
        }
        Ok(())
    }

    /// Parse options derived from the `[selection]` table.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            policy: self.selection.policy,
            max_depth: self.selection.max_depth,
        }
    }
}

/// `[selection]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    /// Query parameter carrying the selection string.
    #[serde(default = "default_param")]
    pub param: String,

    /// Malformed-input policy.
    #[serde(default)]
    pub policy: BracePolicy,

    /// Maximum brace nesting.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            param: default_param(),
            policy: BracePolicy::default(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_param() -> String {
    "fields".to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// `[pagination]` table.
///
/// These hints are passed through to callers untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationConfig {
    /// Query parameter carrying the page size.
    #[serde(default = "default_limit_param")]
    pub limit_param: String,

    /// Query parameter carrying the page offset.
    #[serde(default = "default_offset_param")]
    pub offset_param: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            limit_param: default_limit_param(),
            offset_param: default_offset_param(),
        }
    }
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_offset_param() -> String {
    "offset".to_string()
}
