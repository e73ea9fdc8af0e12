//! Per-call rendering context.

use fieldset_selection::Selection;
use serde::{Deserialize, Serialize};

/// Pagination hints that travel with a request.
///
/// The hints are carried through unchanged so a caller can slice its query;
/// rendering and planning never look at them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageHint {
    /// Maximum number of items requested.
    pub limit: Option<u64>,
    /// Number of items to skip.
    pub offset: Option<u64>,
}

impl PageHint {
    /// Create empty hints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the offset.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Check if neither hint is set.
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }
}

/// Context for one render call, usually built from the incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// Selection override for this call.
    pub selection: Option<Selection>,
    /// Pagination hints for this call.
    pub page: Option<PageHint>,
}

impl RenderContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selection override.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Set the pagination hints.
    pub fn with_page(mut self, page: PageHint) -> Self {
        self.page = Some(page);
        self
    }

    /// The selection override, ignoring an empty one.
    pub fn selection(&self) -> Option<&Selection> {
        Selection::non_empty(self.selection.as_ref())
    }

    /// The pagination hints.
    pub fn page(&self) -> Option<PageHint> {
        self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_is_ignored() {
        let ctx = RenderContext::new().with_selection(Selection::new());
        assert!(ctx.selection().is_none());

        let ctx = RenderContext::new().with_selection(Selection::parse("a"));
        assert!(ctx.selection().is_some_and(|s| s.contains("a")));
    }

    #[test]
    fn test_page_hint_builder() {
        let page = PageHint::new().limit(20).offset(40);
        assert_eq!(page.limit, Some(20));
        assert_eq!(page.offset, Some(40));
        assert!(!page.is_empty());
        assert!(PageHint::new().is_empty());

        let ctx = RenderContext::new().with_page(page);
        assert_eq!(ctx.page(), Some(page));
    }
}
