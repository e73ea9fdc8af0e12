//! Selection tree types.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smol_str::SmolStr;

use crate::error::SelectionError;
use crate::parser::{ParseOptions, Scanner};

/// One requested field, optionally carrying a nested sub-selection.
///
/// A node without children is a leaf: the field is rendered as-is and pruning
/// never descends into its value, even when that value is itself structured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionNode {
    name: SmolStr,
    children: Option<Selection>,
}

impl SelectionNode {
    /// Create a leaf node.
    pub fn leaf(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            children: None,
        }
    }

    /// Create a node with a nested selection.
    ///
    /// An empty nested selection produces a leaf.
    pub fn nested(name: impl Into<SmolStr>, children: Selection) -> Self {
        Self {
            name: name.into(),
            children: (!children.is_empty()).then_some(children),
        }
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The nested selection, if one was requested.
    pub fn children(&self) -> Option<&Selection> {
        self.children.as_ref()
    }

    /// Check if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Number of brace levels below this node.
    pub fn depth(&self) -> usize {
        self.children.as_ref().map_or(0, |c| c.depth() + 1)
    }
}

impl fmt::Display for SelectionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(children) = &self.children {
            write!(f, "{{{}}}", children)?;
        }
        Ok(())
    }
}

/// An ordered set of sibling [`SelectionNode`]s, unique by name.
///
/// The first node registered under a name wins; later nodes with the same name
/// are ignored. Sibling order follows insertion (string) order but carries no
/// meaning downstream, so equality ignores it. Compare the `Display` output
/// when order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    nodes: IndexMap<SmolStr, SelectionNode>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a selection string, tolerating malformed braces.
    ///
    /// See [`ParseOptions`] for the lenient recovery rules.
    pub fn parse(input: &str) -> Self {
        match Self::parse_with(input, &ParseOptions::default()) {
            Ok(selection) => selection,
            // The lenient policy recovers from every malformation.
            Err(_) => Self::new(),
        }
    }

    /// Parse a selection string with explicit options.
    pub fn parse_with(input: &str, options: &ParseOptions) -> Result<Self, SelectionError> {
        Scanner::new(input, options).parse()
    }

    /// Build a flat selection of leaf nodes.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        names.into_iter().map(SelectionNode::leaf).collect()
    }

    /// Add a node. Returns `false` when a sibling with the same name already exists.
    pub fn insert(&mut self, node: SelectionNode) -> bool {
        match self.nodes.entry(node.name.clone()) {
            indexmap::map::Entry::Occupied(_) => {
                tracing::trace!(field = %node.name, "ignoring duplicate selection entry");
                false
            }
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(node);
                true
            }
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, node: SelectionNode) -> Self {
        self.insert(node);
        self
    }

    /// Get a node by name.
    pub fn get(&self, name: &str) -> Option<&SelectionNode> {
        self.nodes.get(name)
    }

    /// Check if a field is selected.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Get the nested selection requested for a field.
    pub fn children_of(&self, name: &str) -> Option<&Selection> {
        self.get(name).and_then(SelectionNode::children)
    }

    /// Iterate over nodes in string order.
    pub fn iter(&self) -> impl Iterator<Item = &SelectionNode> {
        self.nodes.values()
    }

    /// Iterate over the selected names in string order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(SmolStr::as_str)
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest brace nesting in the tree (`a` is 0, `a{b}` is 1).
    pub fn depth(&self) -> usize {
        self.iter().map(SelectionNode::depth).max().unwrap_or(0)
    }

    /// Treat an empty selection the same as an absent one.
    pub fn non_empty(selection: Option<&Selection>) -> Option<&Selection> {
        selection.filter(|s| !s.is_empty())
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

impl FromStr for Selection {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with(s, &ParseOptions::default())
    }
}

impl FromIterator<SelectionNode> for Selection {
    fn from_iter<T: IntoIterator<Item = SelectionNode>>(iter: T) -> Self {
        let mut selection = Self::new();
        for node in iter {
            selection.insert(node);
        }
        selection
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a SelectionNode;
    type IntoIter = indexmap::map::Values<'a, SmolStr, SelectionNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.values()
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_leaf_node() {
        let node = SelectionNode::leaf("name");
        assert_eq!(node.name(), "name");
        assert!(node.is_leaf());
        assert_eq!(node.depth(), 0);
        assert_eq!(node.to_string(), "name");
    }

    #[test]
    fn test_nested_node() {
        let node = SelectionNode::nested("address", Selection::from_names(["city", "zip"]));
        assert!(!node.is_leaf());
        assert_eq!(node.depth(), 1);
        assert_eq!(node.to_string(), "address{city,zip}");
    }

    #[test]
    fn test_nested_with_empty_children_is_leaf() {
        let node = SelectionNode::nested("address", Selection::new());
        assert!(node.is_leaf());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let mut selection = Selection::new();
        assert!(selection.insert(SelectionNode::nested(
            "b",
            Selection::from_names(["c"])
        )));
        assert!(!selection.insert(SelectionNode::leaf("b")));

        assert_eq!(selection.len(), 1);
        assert_eq!(selection.to_string(), "b{c}");
    }

    #[test]
    fn test_from_names() {
        let selection = Selection::from_names(["id", "name", "id"]);
        assert_eq!(selection.len(), 2);
        assert!(selection.iter().all(SelectionNode::is_leaf));
        assert_eq!(selection.names().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn test_lookup() {
        let selection = Selection::new()
            .with(SelectionNode::leaf("a"))
            .with(SelectionNode::nested("b", Selection::from_names(["c"])));

        assert!(selection.contains("a"));
        assert!(!selection.contains("c"));
        assert!(selection.children_of("a").is_none());
        assert_eq!(selection.children_of("b").map(Selection::len), Some(1));
        assert!(selection.get("missing").is_none());
    }

    #[test]
    fn test_depth() {
        assert_eq!(Selection::new().depth(), 0);
        assert_eq!(Selection::from_names(["a", "b"]).depth(), 0);

        let deep = Selection::new().with(SelectionNode::nested(
            "a",
            Selection::new().with(SelectionNode::nested("b", Selection::from_names(["c"]))),
        ));
        assert_eq!(deep.depth(), 2);
    }

    #[test]
    fn test_non_empty() {
        let empty = Selection::new();
        let full = Selection::from_names(["a"]);
        assert!(Selection::non_empty(None).is_none());
        assert!(Selection::non_empty(Some(&empty)).is_none());
        assert!(Selection::non_empty(Some(&full)).is_some());
    }

    #[test]
    fn test_equality_ignores_sibling_order() {
        let left = Selection::from_names(["a", "b"]);
        let right = Selection::from_names(["b", "a"]);
        assert_eq!(left, right);
        assert_ne!(left.to_string(), right.to_string());
    }

    #[test]
    fn test_equality_compares_children() {
        let left = Selection::new().with(SelectionNode::nested("b", Selection::from_names(["c"])));
        let right = Selection::from_names(["b"]);
        assert_ne!(left, right);
    }

    #[test]
    fn test_serde_as_string() {
        let selection: Selection = serde_json::from_str(r#""a,b{c}""#).unwrap();
        assert_eq!(selection.children_of("b").map(Selection::len), Some(1));

        let json = serde_json::to_string(&selection).unwrap();
        assert_eq!(json, r#""a,b{c}""#);
    }
}
