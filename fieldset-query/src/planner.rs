//! Eager-load planning.
//!
//! A serializer declares, per field, which relations must be fetched to render
//! it. Given a selection, the planner collects the directives of every selected
//! field and walks into nested serializers, prefixing their paths with the
//! parent relation.
//!
//! ```rust
//! use std::sync::Arc;
//! use fieldset_query::{Directive, Field, Serializer};
//! use fieldset_selection::Selection;
//!
//! struct Address { city: String }
//! struct Person { address: Address }
//!
//! let address = Arc::new(
//!     Serializer::new("Address")
//!         .field(Field::serialize("city", |a: &Address| &a.city))
//!         .relation("city", [Directive::select("city")]),
//! );
//! let person = Serializer::new("Person")
//!     .field(Field::nested("address", |p: &Person| Some(&p.address), address))
//!     .relation("address", [Directive::select("addr")]);
//!
//! let plan = person.plan(Some(&Selection::parse("address{city}")));
//! assert_eq!(plan.select, vec!["addr", "addr__city"]);
//! ```

use fieldset_selection::Selection;
use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::directive::{Directive, DirectiveSet, Directives};

/// Field name to the ordered directives needed to render it.
///
/// Only the first directive of a field is used as the parent when planning
/// the nested serializer's relations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationTable {
    entries: IndexMap<SmolStr, Vec<Directive>>,
}

impl RelationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directives for a field, replacing any earlier entry.
    pub fn insert(&mut self, field: impl Into<SmolStr>, directives: impl IntoIterator<Item = Directive>) {
        self.entries
            .insert(field.into(), directives.into_iter().collect());
    }

    /// Directives declared for a field.
    pub fn get(&self, field: &str) -> Option<&[Directive]> {
        self.entries.get(field).map(Vec::as_slice)
    }

    /// Iterate over entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Directive])> {
        self.entries
            .iter()
            .map(|(name, directives)| (name.as_str(), directives.as_slice()))
    }

    /// Number of fields with directives.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N, I> FromIterator<(N, I)> for RelationTable
where
    N: Into<SmolStr>,
    I: IntoIterator<Item = Directive>,
{
    fn from_iter<T: IntoIterator<Item = (N, I)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (field, directives) in iter {
            table.insert(field, directives);
        }
        table
    }
}

/// Something that can compute relation directives for a selection.
///
/// Implemented by [`Serializer`](crate::Serializer); nested fields hold their
/// serializer as a `dyn Plan` so planning can recurse without knowing the
/// nested source type.
pub trait Plan: Send + Sync {
    /// Selection to plan for when none is given.
    fn default_selection(&self) -> Option<&Selection>;

    /// Directives declared per field.
    fn relation_table(&self) -> &RelationTable;

    /// Planner of the component rendered by `field`, if it has one.
    fn nested_planner(&self, field: &str) -> Option<&dyn Plan>;

    /// Compute directives at the top level.
    fn plan(&self, selection: Option<&Selection>) -> Directives {
        self.plan_under(selection, None)
    }

    /// Compute directives below `parent`.
    fn plan_under(&self, selection: Option<&Selection>, parent: Option<&Directive>) -> Directives {
        plan_directives(self, selection, parent)
    }
}

/// Compute the directives `planner` needs for `selection` below `parent`.
///
/// An absent or empty selection falls back to the planner's default
/// selection; with neither, nothing is planned. Directives that cannot live
/// below `parent` are dropped together with everything nested under them.
pub fn plan_directives<P>(planner: &P, selection: Option<&Selection>, parent: Option<&Directive>) -> Directives
where
    P: Plan + ?Sized,
{
    let Some(selection) = Selection::non_empty(selection).or_else(|| planner.default_selection()) else {
        return Directives::new();
    };

    let table = planner.relation_table();
    let mut set = DirectiveSet::default();

    for node in selection {
        let Some(descriptors) = table.get(node.name()) else {
            continue;
        };

        for (index, descriptor) in descriptors.iter().enumerate() {
            let Some(directive) = descriptor.prefixed(parent) else {
                debug!(
                    field = node.name(),
                    descriptor = %descriptor,
                    "dropping directive below external relation"
                );
                continue;
            };

            if index == 0 {
                if let Some(nested) = planner.nested_planner(node.name()) {
                    set.extend(nested.plan_under(node.children(), Some(&directive)));
                }
            }

            set.insert(directive);
        }
    }

    set.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Hand-built planner so the algorithm can be tested without serializers.
    #[derive(Default)]
    struct Table {
        defaults: Option<Selection>,
        relations: RelationTable,
        nested: IndexMap<SmolStr, Table>,
    }

    impl Table {
        fn relation<const N: usize>(mut self, field: &str, directives: [Directive; N]) -> Self {
            self.relations.insert(field, directives);
            self
        }

        fn nested(mut self, field: &str, table: Table) -> Self {
            self.nested.insert(field.into(), table);
            self
        }

        fn defaults(mut self, names: &str) -> Self {
            self.defaults = Some(Selection::parse(names));
            self
        }
    }

    impl Plan for Table {
        fn default_selection(&self) -> Option<&Selection> {
            self.defaults.as_ref()
        }

        fn relation_table(&self) -> &RelationTable {
            &self.relations
        }

        fn nested_planner(&self, field: &str) -> Option<&dyn Plan> {
            self.nested.get(field).map(|t| t as &dyn Plan)
        }
    }

    #[test]
    fn test_no_selection_no_defaults() {
        let table = Table::default().relation("a", [Directive::select("a")]);
        assert!(table.plan(None).is_empty());
        assert!(table.plan(Some(&Selection::new())).is_empty());
    }

    #[test]
    fn test_falls_back_to_defaults() {
        let table = Table::default()
            .relation("a", [Directive::select("a_rel")])
            .relation("b", [Directive::prefetch("b_rel")])
            .defaults("a");

        let plan = table.plan(None);
        assert_eq!(plan.select, vec!["a_rel"]);
        assert!(plan.prefetch.is_empty());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let table = Table::default().relation("a", [Directive::select("a")]);
        let plan = table.plan(Some(&Selection::parse("zzz,a")));
        assert_eq!(plan.select, vec!["a"]);
    }

    #[test]
    fn test_dedup_across_siblings() {
        let table = Table::default()
            .relation("a", [Directive::select("x")])
            .relation("b", [Directive::select("x"), Directive::prefetch("y")]);

        let plan = table.plan(Some(&Selection::parse("a,b")));
        assert_eq!(plan.select, vec!["x"]);
        assert_eq!(plan.prefetch, vec!["y"]);
    }

    #[test]
    fn test_nested_prefix() {
        let address = Table::default().relation("city", [Directive::select("city")]);
        let person = Table::default()
            .relation("address", [Directive::select("addr")])
            .nested("address", address);

        let plan = person.plan(Some(&Selection::parse("address{city}")));
        assert_eq!(plan.select, vec!["addr", "addr__city"]);
    }

    #[test]
    fn test_nested_uses_nested_defaults() {
        let address = Table::default()
            .relation("city", [Directive::select("city")])
            .defaults("city");
        let person = Table::default()
            .relation("address", [Directive::select("addr")])
            .nested("address", address);

        let plan = person.plan(Some(&Selection::parse("address")));
        assert_eq!(plan.select, vec!["addr", "addr__city"]);
    }

    #[test]
    fn test_only_first_descriptor_recurses() {
        let inner = Table::default().relation("x", [Directive::select("x")]);
        let outer = Table::default()
            .relation("f", [Directive::select("first"), Directive::select("second")])
            .nested("f", inner);

        let plan = outer.plan(Some(&Selection::parse("f{x}")));
        assert_eq!(plan.select, vec!["first", "first__x", "second"]);
    }

    #[test]
    fn test_select_below_prefetch_becomes_prefetch() {
        let friend = Table::default().relation("city", [Directive::select("city")]);
        let person = Table::default()
            .relation("friends", [Directive::prefetch("friends")])
            .nested("friends", friend);

        let plan = person.plan(Some(&Selection::parse("friends{city}")));
        assert!(plan.select.is_empty());
        assert_eq!(plan.prefetch, vec!["friends", "friends__city"]);
    }

    #[test]
    fn test_nothing_below_external() {
        let inner = Table::default()
            .relation("x", [Directive::select("x")])
            .relation("y", [Directive::external("y")]);
        let outer = Table::default()
            .relation("remote", [Directive::external("remote")])
            .nested("remote", inner);

        let plan = outer.plan(Some(&Selection::parse("remote{x,y}")));
        assert_eq!(plan.external, vec!["remote"]);
        assert!(plan.select.is_empty());
        assert!(plan.prefetch.is_empty());
    }

    #[test]
    fn test_external_below_select() {
        let inner = Table::default().relation("avatar", [Directive::external("avatar")]);
        let outer = Table::default()
            .relation("author", [Directive::select("author")])
            .nested("author", inner);

        let plan = outer.plan(Some(&Selection::parse("author{avatar}")));
        assert_eq!(plan.select, vec!["author"]);
        assert_eq!(plan.external, vec!["author__avatar"]);
    }

    #[test]
    fn test_relation_table_from_iter() {
        let table: RelationTable = [
            ("a", vec![Directive::select("a")]),
            ("b", vec![Directive::prefetch("b"), Directive::select("c")]),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("b").map(<[Directive]>::len), Some(2));
        assert!(table.get("zzz").is_none());
    }
}
