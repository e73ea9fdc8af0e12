//! Relation inclusion directives.
//!
//! A directive tells the data-access layer to fetch a relation ahead of use.
//! There are three kinds because they map to three fetch mechanisms with
//! different costs, and they are always kept in separate sequences.
//!
//! ```rust
//! use fieldset_query::Directive;
//!
//! let parent = Directive::select("author");
//! let child = Directive::select("profile");
//! assert_eq!(child.prefixed(Some(&parent)), Some(Directive::select("author__profile")));
//!
//! // Joins below a prefetched relation have to be prefetched too.
//! let parent = Directive::prefetch("comments");
//! assert_eq!(child.prefixed(Some(&parent)), Some(Directive::prefetch("comments__profile")));
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between a parent relation path and a nested one.
pub const PATH_SEPARATOR: &str = "__";

/// The fetch mechanism a directive maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    /// Single-valued relation joined into the main query.
    Select,
    /// Multi-valued relation fetched in a separate query.
    Prefetch,
    /// Relation resolved by an external resolver.
    External,
}

impl DirectiveKind {
    /// Get the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Prefetch => "prefetch",
            Self::External => "external",
        }
    }
}

/// One relation to include, addressed by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    /// Join a single-valued relation.
    Select(String),
    /// Prefetch a multi-valued relation.
    Prefetch(String),
    /// Resolve a relation through an external resolver.
    External(String),
}

impl Directive {
    /// Create a select directive.
    pub fn select(path: impl Into<String>) -> Self {
        Self::Select(path.into())
    }

    /// Create a prefetch directive.
    pub fn prefetch(path: impl Into<String>) -> Self {
        Self::Prefetch(path.into())
    }

    /// Create an external-relation directive.
    pub fn external(path: impl Into<String>) -> Self {
        Self::External(path.into())
    }

    /// The directive kind.
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Self::Select(_) => DirectiveKind::Select,
            Self::Prefetch(_) => DirectiveKind::Prefetch,
            Self::External(_) => DirectiveKind::External,
        }
    }

    /// The relation path.
    pub fn path(&self) -> &str {
        match self {
            Self::Select(path) | Self::Prefetch(path) | Self::External(path) => path,
        }
    }

    /// Resolve this directive below `parent`.
    ///
    /// | parent      | Select        | Prefetch      | External      |
    /// |-------------|---------------|---------------|---------------|
    /// | none        | unchanged     | unchanged     | unchanged     |
    /// | Select(p)   | Select(p__c)  | Prefetch(p__c)| External(p__c)|
    /// | Prefetch(p) | Prefetch(p__c)| Prefetch(p__c)| External(p__c)|
    /// | External(p) | `None`        | `None`        | `None`        |
    ///
    /// Nothing can be joined through an externally resolved relation, so
    /// directives below one are dropped.
    pub fn prefixed(&self, parent: Option<&Directive>) -> Option<Directive> {
        let Some(parent) = parent else {
            return Some(self.clone());
        };
        let path = format!("{}{}{}", parent.path(), PATH_SEPARATOR, self.path());
        match (parent, self) {
            (Self::External(_), _) => None,
            (_, Self::External(_)) => Some(Self::External(path)),
            (Self::Select(_), Self::Select(_)) => Some(Self::Select(path)),
            (Self::Select(_) | Self::Prefetch(_), Self::Prefetch(_))
            | (Self::Prefetch(_), Self::Select(_)) => Some(Self::Prefetch(path)),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind().as_str(), self.path())
    }
}

/// Planned directives, split by kind.
///
/// Each sequence is deduplicated and sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directives {
    /// Paths to join.
    pub select: Vec<String>,
    /// Paths to prefetch.
    pub prefetch: Vec<String>,
    /// Paths to resolve externally.
    pub external: Vec<String>,
}

impl Directives {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no relation needs to be included.
    pub fn is_empty(&self) -> bool {
        self.select.is_empty() && self.prefetch.is_empty() && self.external.is_empty()
    }

    /// Total number of directives.
    pub fn len(&self) -> usize {
        self.select.len() + self.prefetch.len() + self.external.len()
    }

    /// Check if a directive is part of the plan.
    pub fn contains(&self, directive: &Directive) -> bool {
        let paths = match directive.kind() {
            DirectiveKind::Select => &self.select,
            DirectiveKind::Prefetch => &self.prefetch,
            DirectiveKind::External => &self.external,
        };
        paths.binary_search_by(|p| p.as_str().cmp(directive.path())).is_ok()
    }

    /// Iterate over all directives: selects, then prefetches, then externals.
    pub fn iter(&self) -> impl Iterator<Item = Directive> + '_ {
        let select = self.select.iter().cloned().map(Directive::Select);
        let prefetch = self.prefetch.iter().cloned().map(Directive::Prefetch);
        let external = self.external.iter().cloned().map(Directive::External);
        select.chain(prefetch).chain(external)
    }

    /// Split into `(select, prefetch, external)`.
    pub fn into_parts(self) -> (Vec<String>, Vec<String>, Vec<String>) {
        (self.select, self.prefetch, self.external)
    }

    /// Merge another plan into this one.
    pub fn merge(self, other: Directives) -> Self {
        let mut set = DirectiveSet::from(self);
        set.extend(other);
        set.into()
    }
}

impl FromIterator<Directive> for Directives {
    fn from_iter<I: IntoIterator<Item = Directive>>(iter: I) -> Self {
        let mut set = DirectiveSet::default();
        for directive in iter {
            set.insert(directive);
        }
        set.into()
    }
}

/// Deduplicating, sorting accumulator used while planning.
#[derive(Debug, Clone, Default)]
pub(crate) struct DirectiveSet {
    select: BTreeSet<String>,
    prefetch: BTreeSet<String>,
    external: BTreeSet<String>,
}

impl DirectiveSet {
    pub(crate) fn insert(&mut self, directive: Directive) -> bool {
        match directive {
            Directive::Select(path) => self.select.insert(path),
            Directive::Prefetch(path) => self.prefetch.insert(path),
            Directive::External(path) => self.external.insert(path),
        }
    }

    pub(crate) fn extend(&mut self, other: Directives) {
        self.select.extend(other.select);
        self.prefetch.extend(other.prefetch);
        self.external.extend(other.external);
    }
}

impl From<Directives> for DirectiveSet {
    fn from(directives: Directives) -> Self {
        let mut set = Self::default();
        set.extend(directives);
        set
    }
}

impl From<DirectiveSet> for Directives {
    fn from(set: DirectiveSet) -> Self {
        Self {
            select: set.select.into_iter().collect(),
            prefetch: set.prefetch.into_iter().collect(),
            external: set.external.into_iter().collect(),
        }
    }
}
