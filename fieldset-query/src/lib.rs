//! # fieldset-query
//!
//! Selection-aware serializers and eager-load planning.
//!
//! This crate provides:
//! - A field registry built from getter closures and converters
//! - Serializers that render only the selected fields, nested at any depth
//! - Collection rendering that checks converter capability once per call
//! - A planner that turns a selection into relation directives
//! - A query-object seam applying those directives before the query runs
//!
//! ## Rendering
//!
//! ```rust
//! use std::sync::Arc;
//! use fieldset_query::prelude::*;
//! use serde_json::json;
//!
//! struct Tag { label: String }
//! struct Article { title: String, tags: Vec<Tag> }
//!
//! let tags = Arc::new(Serializer::new("Tag").field(Field::serialize("label", |t: &Tag| &t.label)));
//! let articles = Serializer::new("Article")
//!     .field(Field::serialize("title", |a: &Article| &a.title))
//!     .field(Field::nested_many("tags", |a: &Article| Some(&a.tags), tags))
//!     .relation("tags", [Directive::prefetch("tags")]);
//!
//! let article = Article {
//!     title: "Ownership".into(),
//!     tags: vec![Tag { label: "rust".into() }],
//! };
//!
//! let selection = Selection::parse("tags{label}");
//! let out = articles.render(&article, Some(&selection)).unwrap();
//! assert_eq!(serde_json::Value::Object(out), json!({"tags": [{"label": "rust"}]}));
//! ```
//!
//! ## Planning
//!
//! ```rust
//! use fieldset_query::prelude::*;
//!
//! struct Article { title: String }
//!
//! let articles = Serializer::new("Article")
//!     .field(Field::serialize("title", |a: &Article| &a.title))
//!     .relation("author", [Directive::select("author")]);
//!
//! let query = articles.modify_queryset(QueryPlan::new(), Some(&Selection::parse("title,author")));
//! assert!(query.select_related.contains("author"));
//! ```

pub mod context;
pub mod directive;
pub mod error;
pub mod fields;
pub mod list;
pub mod logging;
pub mod planner;
pub mod queryset;
pub mod serializer;

pub use context::{PageHint, RenderContext};
pub use directive::{Directive, DirectiveKind, Directives, PATH_SEPARATOR};
pub use error::{ErrorCode, RenderError, RenderResult};
pub use fields::{Attribute, Capability, Converter, Field, FieldSet, SkipField, project_attribute};
pub use list::ListSerializer;
pub use planner::{Plan, RelationTable, plan_directives};
pub use queryset::{QueryPlan, QuerySet, apply_directives};
pub use serializer::{Bound, Serializer};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::context::{PageHint, RenderContext};
    pub use crate::directive::{Directive, Directives};
    pub use crate::error::{RenderError, RenderResult};
    pub use crate::fields::{Attribute, Converter, Field, SkipField};
    pub use crate::list::ListSerializer;
    pub use crate::planner::Plan;
    pub use crate::queryset::{QueryPlan, QuerySet, apply_directives};
    pub use crate::serializer::Serializer;
    pub use fieldset_selection::{Selection, parse_selection};
}
