//! # fieldset-selection
//!
//! Selection strings and the trees they parse into.
//!
//! This crate provides:
//! - A depth-tracking parser for `name,address{city,zip}` style selections
//! - Lenient and strict handling of malformed braces
//! - Pruning of already-rendered JSON values down to a selection
//! - Readable-field resolution against any field registry
//! - Configuration parser for `fieldset.toml` files
//!
//! ## Example
//!
//! ```rust
//! use fieldset_selection::{Selection, ParseOptions};
//! use serde_json::json;
//!
//! let selection = Selection::parse("a,b{c}");
//! let mut value = json!({"a": 1, "b": {"c": 2, "d": 3}, "e": 4});
//! selection.prune(&mut value);
//! assert_eq!(value, json!({"a": 1, "b": {"c": 2}}));
//!
//! // Strict parsing reports unbalanced braces.
//! assert!(Selection::parse_with("a{b", &ParseOptions::strict()).is_err());
//! ```

pub mod config;
pub mod error;
pub mod node;
pub mod parser;
pub mod prune;

pub use config::FieldsetConfig;
pub use error::{SelectionError, SelectionResult};
pub use node::{Selection, SelectionNode};
pub use parser::{BracePolicy, DEFAULT_MAX_DEPTH, ParseOptions, parse_selection};
pub use prune::{Readable, prune_value, readable_fields};
