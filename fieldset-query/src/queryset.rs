//! The query-object seam.
//!
//! Planning produces [`Directives`]; a [`QuerySet`] consumes them. Implement
//! the trait for your ORM's query builder, or use [`QueryPlan`] to record the
//! directives and translate them yourself.
//!
//! ```rust
//! use fieldset_query::{Directive, Directives, QueryPlan, apply_directives};
//!
//! let directives: Directives = [Directive::select("author"), Directive::prefetch("tags")]
//!     .into_iter()
//!     .collect();
//!
//! let plan = apply_directives(QueryPlan::new(), &directives);
//! assert!(plan.select_related.contains("author"));
//! assert!(plan.prefetch_related.contains("tags"));
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directive::Directives;

/// A query object that can be told which relations to load eagerly.
///
/// Methods consume and return the query so builder-style ORMs fit directly.
pub trait QuerySet: Sized {
    /// Whether [`select_api_related`](Self::select_api_related) does anything.
    const SUPPORTS_API_RELATED: bool = false;

    /// Join single-valued relations.
    fn select_related(self, paths: &[String]) -> Self;

    /// Fetch multi-valued relations in separate queries.
    fn prefetch_related(self, paths: &[String]) -> Self;

    /// Resolve relations through an external resolver.
    fn select_api_related(self, paths: &[String]) -> Self {
        let _ = paths;
        self
    }
}

/// Apply planned directives to `query`.
///
/// Selects are applied first, then prefetches, then external relations.
/// Empty lists are not applied, and external relations are skipped when the
/// query does not support them.
pub fn apply_directives<Q: QuerySet>(query: Q, directives: &Directives) -> Q {
    let mut query = query;

    if !directives.select.is_empty() {
        query = query.select_related(&directives.select);
    }

    if !directives.prefetch.is_empty() {
        query = query.prefetch_related(&directives.prefetch);
    }

    if !directives.external.is_empty() {
        if Q::SUPPORTS_API_RELATED {
            query = query.select_api_related(&directives.external);
        } else {
            debug!(
                paths = ?directives.external,
                "query does not support external relations, skipping"
            );
        }
    }

    query
}

/// A query object that only records what it was asked to load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Joined relation paths.
    pub select_related: BTreeSet<String>,
    /// Prefetched relation paths.
    pub prefetch_related: BTreeSet<String>,
    /// Externally resolved relation paths.
    pub api_related: BTreeSet<String>,
}

impl QueryPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing has been requested.
    pub fn is_empty(&self) -> bool {
        self.select_related.is_empty() && self.prefetch_related.is_empty() && self.api_related.is_empty()
    }
}

impl QuerySet for QueryPlan {
    const SUPPORTS_API_RELATED: bool = true;

    fn select_related(mut self, paths: &[String]) -> Self {
        self.select_related.extend(paths.iter().cloned());
        self
    }

    fn prefetch_related(mut self, paths: &[String]) -> Self {
        self.prefetch_related.extend(paths.iter().cloned());
        self
    }

    fn select_api_related(mut self, paths: &[String]) -> Self {
        self.api_related.extend(paths.iter().cloned());
        self
    }
}
