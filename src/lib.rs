//! # fieldset
//!
//! Client-selected partial responses for Rust APIs.
//!
//! Clients ask for exactly the fields they want with a compact selection
//! string such as `name,address{city,zip},friends{name}`. fieldset provides:
//! - A tolerant parser for selection strings, with an opt-in strict mode
//! - Serializers that render only the selected fields, at any depth
//! - A planner that turns the selection into the relations a query must
//!   load eagerly, so rendering never triggers lazy loads
//! - Axum integration reading the selection from the request
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fieldset::prelude::*;
//! use serde_json::json;
//!
//! struct Address { city: String, zip: String }
//! struct User { name: String, address: Address }
//!
//! let address = Arc::new(
//!     Serializer::new("Address")
//!         .field(Field::serialize("city", |a: &Address| &a.city))
//!         .field(Field::serialize("zip", |a: &Address| &a.zip)),
//! );
//! let users = Serializer::new("User")
//!     .field(Field::serialize("name", |u: &User| &u.name))
//!     .field(Field::nested("address", |u: &User| Some(&u.address), address))
//!     .relation("address", [Directive::select("address")]);
//!
//! let user = User {
//!     name: "Ada".into(),
//!     address: Address { city: "London".into(), zip: "N1".into() },
//! };
//!
//! let selection = parse_selection(Some("address{city}"));
//! let out = users.render(&user, Some(&selection)).unwrap();
//! assert_eq!(serde_json::Value::Object(out), json!({"address": {"city": "London"}}));
//!
//! let query = users.modify_queryset(QueryPlan::new(), Some(&selection));
//! assert!(query.select_related.contains("address"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Selection strings: parsing, pruning and configuration.
pub mod selection {
    pub use fieldset_selection::*;
}

/// Serializers, relation planning and the query-object seam.
pub mod query {
    pub use fieldset_query::*;
}

/// Axum integration.
#[cfg(feature = "axum")]
#[cfg_attr(docsrs, doc(cfg(feature = "axum")))]
pub mod axum {
    pub use fieldset_axum::{
        Fields, FieldsRejection, SelectionLayer, SelectionMiddleware, SelectionSettings,
    };
}

pub use fieldset_query::logging;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use fieldset_query::prelude::*;
    pub use fieldset_selection::{BracePolicy, FieldsetConfig, ParseOptions, SelectionError};

    #[cfg(feature = "axum")]
    pub use fieldset_axum::{Fields, SelectionLayer};
}

// Re-export key types at the crate root
pub use fieldset_query::{
    Directive, Directives, Field, QueryPlan, QuerySet, RenderContext, RenderError, Serializer,
    apply_directives,
};
pub use fieldset_selection::{FieldsetConfig, Selection, SelectionError, parse_selection};
