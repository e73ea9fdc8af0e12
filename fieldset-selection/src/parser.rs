//! Depth-tracking scanner for selection strings.
//!
//! The grammar is a comma separated list of items, where an item is either
//! `name` or `name{items}`:
//!
//! ```text
//! selection := item ("," item)*
//! item      := name ("{" selection "}")?
//! ```
//!
//! Commas only split a list at brace depth zero, so `a{b,c},d` has two
//! top-level items.
//!
//! ```rust
//! use fieldset_selection::Selection;
//!
//! let selection = Selection::parse("name,address{city,zip},friends{name}");
//! assert_eq!(selection.len(), 3);
//! assert_eq!(selection.children_of("address").map(|s| s.len()), Some(2));
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::warn;

use crate::error::{SelectionError, SelectionResult};
use crate::node::{Selection, SelectionNode};

/// Default limit on brace nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// How the scanner treats unbalanced braces and other malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BracePolicy {
    /// Recover from malformed input instead of failing.
    ///
    /// - a `}` with no open group is ignored
    /// - an unclosed `{` absorbs the rest of its item as the nested selection
    /// - text after a group's closing brace is discarded
    /// - empty items and empty names are skipped
    #[default]
    Lenient,
    /// Reject malformed input with [`SelectionError::Malformed`].
    Strict,
}

/// Options controlling how selection strings are parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Malformed-input policy.
    pub policy: BracePolicy,
    /// Maximum brace nesting. Deeper groups are an error under the strict
    /// policy and are cut back to leaves under the lenient one.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            policy: BracePolicy::Lenient,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Lenient options with the default depth limit.
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Strict options with the default depth limit.
    pub fn strict() -> Self {
        Self {
            policy: BracePolicy::Strict,
            ..Self::default()
        }
    }

    /// Set the nesting limit.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn is_strict(&self) -> bool {
        self.policy == BracePolicy::Strict
    }
}

/// Parse an optional selection string leniently.
///
/// Absent and empty input both yield an empty selection, which renders every
/// field.
pub fn parse_selection(input: Option<&str>) -> Selection {
    input.map(Selection::parse).unwrap_or_default()
}

/// Byte range `[start, end)` into the source string.
type Range = (usize, usize);

pub(crate) struct Scanner<'a> {
    src: &'a str,
    options: &'a ParseOptions,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(src: &'a str, options: &'a ParseOptions) -> Self {
        Self { src, options }
    }

    pub(crate) fn parse(&self) -> SelectionResult<Selection> {
        if self.src.trim().is_empty() {
            return Ok(Selection::new());
        }
        self.list((0, self.src.len()), 0)
    }

    fn list(&self, range: Range, depth: usize) -> SelectionResult<Selection> {
        let mut selection = Selection::new();
        for item in self.split(range)? {
            if let Some(node) = self.item(item, depth)? {
                selection.insert(node);
            }
        }
        Ok(selection)
    }

    /// Split a range on commas at brace depth zero.
    ///
    /// Bytes are scanned directly: `{`, `}` and `,` are ASCII and never occur
    /// inside a multi-byte UTF-8 sequence.
    fn split(&self, (start, end): Range) -> SelectionResult<Vec<Range>> {
        let bytes = self.src.as_bytes();
        let mut items = Vec::new();
        let mut depth = 0usize;
        let mut item_start = start;

        for (i, &byte) in bytes.iter().enumerate().take(end).skip(start) {
            match byte {
                b'{' => depth += 1,
                b'}' if depth == 0 => {
                    if self.options.is_strict() {
                        return Err(self.malformed(i, 1, "unmatched `}`"));
                    }
                    warn!(offset = i, "ignoring unmatched `}}` in selection");
                }
                b'}' => depth -= 1,
                b',' if depth == 0 => {
                    items.push((item_start, i));
                    item_start = i + 1;
                }
                _ => {}
            }
        }
        items.push((item_start, end));
        Ok(items)
    }

    fn item(&self, (start, end): Range, depth: usize) -> SelectionResult<Option<SelectionNode>> {
        let text = &self.src[start..end];
        let Some(open) = text.find('{').map(|rel| start + rel) else {
            return Ok(self.name(start, end)?.map(SelectionNode::leaf));
        };

        let Some(name) = self.name(start, open)? else {
            return Ok(None);
        };

        let inner = match self.matching_close(open, end) {
            Some(close) => {
                let trailing = &self.src[close + 1..end];
                if !trailing.trim().is_empty() {
                    if self.options.is_strict() {
                        return Err(self.malformed(
                            close + 1,
                            end - close - 1,
                            "unexpected input after `}`",
                        ));
                    }
                    warn!(field = %name, trailing, "discarding input after selection group");
                }
                (open + 1, close)
            }
            None => {
                if self.options.is_strict() {
                    return Err(self.malformed(open, 1, "unclosed `{`"));
                }
                warn!(field = %name, "selection group is never closed");
                (open + 1, end)
            }
        };

        if self.src[inner.0..inner.1].trim().is_empty() {
            return Ok(Some(SelectionNode::leaf(name)));
        }

        let child_depth = depth + 1;
        if child_depth > self.options.max_depth {
            if self.options.is_strict() {
                return Err(SelectionError::TooDeep {
                    depth: child_depth,
                    limit: self.options.max_depth,
                });
            }
            warn!(
                field = %name,
                limit = self.options.max_depth,
                "selection too deep, truncating to a leaf"
            );
            return Ok(Some(SelectionNode::leaf(name)));
        }

        let children = self.list(inner, child_depth)?;
        Ok(Some(SelectionNode::nested(name, children)))
    }

    /// Extract a trimmed field name, or `None` when it is empty.
    fn name(&self, start: usize, end: usize) -> SelectionResult<Option<SmolStr>> {
        let raw = self.src[start..end].trim();
        let name: SmolStr = if raw.contains('}') {
            // Only reachable under the lenient policy, which already skipped
            // the stray brace while splitting.
            raw.chars().filter(|&c| c != '}').collect::<String>().trim().into()
        } else {
            raw.into()
        };

        if name.is_empty() {
            if self.options.is_strict() {
                return Err(self.malformed(start, end - start, "empty field name"));
            }
            return Ok(None);
        }
        Ok(Some(name))
    }

    /// Find the `}` that closes the group opened at `open`.
    fn matching_close(&self, open: usize, end: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, &byte) in self.src.as_bytes().iter().enumerate().take(end).skip(open) {
            match byte {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn malformed(&self, offset: usize, len: usize, message: &str) -> SelectionError {
        SelectionError::malformed(self.src, offset, len, message)
    }
}
