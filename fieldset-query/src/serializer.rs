//! Projected serializers.
//!
//! A [`Serializer`] renders a source object into a JSON object containing
//! only the requested fields, and plans the relations that rendering them
//! will touch.
//!
//! The selection used for a call is resolved in this order:
//!
//! 1. the explicit, non-empty selection passed to the call;
//! 2. the selection carried by a [`RenderContext`];
//! 3. the serializer's default fields;
//! 4. nothing, in which case every readable field is rendered.
//!
//! ```rust
//! use fieldset_query::{Field, Serializer};
//! use fieldset_selection::Selection;
//! use serde_json::json;
//!
//! struct Post { title: String, body: String }
//!
//! let posts = Serializer::new("Post")
//!     .field(Field::serialize("title", |p: &Post| &p.title))
//!     .field(Field::serialize("body", |p: &Post| &p.body))
//!     .default_fields(["title"]);
//!
//! let post = Post { title: "Hello".into(), body: "...".into() };
//! assert_eq!(serde_json::Value::Object(posts.render(&post, None).unwrap()), json!({"title": "Hello"}));
//!
//! let all = Selection::parse("title,body");
//! assert_eq!(posts.render(&post, Some(&all)).unwrap().len(), 2);
//! ```

use std::fmt;
use std::sync::Arc;

use fieldset_selection::{Selection, readable_fields};
use serde_json::{Map, Value};
use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::context::{PageHint, RenderContext};
use crate::directive::{Directive, Directives};
use crate::error::RenderResult;
use crate::fields::{Converter, Field, FieldSet};
use crate::list::ListSerializer;
use crate::planner::{Plan, RelationTable};
use crate::queryset::{QuerySet, apply_directives};

/// Renders `T` as a JSON object restricted to a selection.
pub struct Serializer<T> {
    name: SmolStr,
    fields: FieldSet<T>,
    default_fields: Option<Selection>,
    relations: RelationTable,
}

impl<T> Clone for Serializer<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            fields: self.fields.clone(),
            default_fields: self.default_fields.clone(),
            relations: self.relations.clone(),
        }
    }
}

impl<T> fmt::Debug for Serializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("default_fields", &self.default_fields.as_ref().map(ToString::to_string))
            .field("relations", &self.relations)
            .finish()
    }
}

impl<T> Serializer<T> {
    /// Create a serializer with no fields.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            fields: FieldSet::new(),
            default_fields: None,
            relations: RelationTable::new(),
        }
    }

    /// Register a field. A field with the same name is replaced.
    pub fn field(mut self, field: Field<T>) -> Self {
        self.fields.insert(field);
        self
    }

    /// Fields rendered when no selection is given.
    pub fn default_fields<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.with_default_selection(Selection::from_names(names))
    }

    /// Selection used when none is given. May be nested.
    pub fn with_default_selection(mut self, selection: Selection) -> Self {
        self.default_fields = (!selection.is_empty()).then_some(selection);
        self
    }

    /// Declare the relations a field needs fetched.
    ///
    /// The first directive is also the parent of the nested serializer's own
    /// relations.
    pub fn relation(mut self, field: impl Into<SmolStr>, directives: impl IntoIterator<Item = Directive>) -> Self {
        self.relations.insert(field, directives);
        self
    }

    /// The serializer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registered fields.
    pub fn fields(&self) -> &FieldSet<T> {
        &self.fields
    }

    /// The relation table.
    pub fn relations(&self) -> &RelationTable {
        &self.relations
    }

    /// The default fields, if configured.
    pub fn defaults(&self) -> Option<&Selection> {
        self.default_fields.as_ref()
    }

    /// Resolve the selection a call will use.
    pub fn effective_selection<'a>(
        &'a self,
        explicit: Option<&'a Selection>,
        context: Option<&'a RenderContext>,
    ) -> Option<&'a Selection> {
        Selection::non_empty(explicit)
            .or_else(|| context.and_then(RenderContext::selection))
            .or(self.default_fields.as_ref())
    }

    /// Render `source` restricted to `selection`.
    pub fn render(&self, source: &T, selection: Option<&Selection>) -> RenderResult<Map<String, Value>> {
        self.project(source, self.effective_selection(selection, None))
    }

    /// Render `source`, falling back to the context's selection.
    pub fn render_in(
        &self,
        source: &T,
        selection: Option<&Selection>,
        context: &RenderContext,
    ) -> RenderResult<Map<String, Value>> {
        self.project(source, self.effective_selection(selection, Some(context)))
    }

    /// Render every item of a collection in source order.
    pub fn render_many<'a, I>(&self, items: I, selection: Option<&Selection>) -> RenderResult<Vec<Value>>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let selection = self.effective_selection(selection, None);
        items
            .into_iter()
            .map(|item| self.project(item, selection).map(Value::Object))
            .collect()
    }

    /// Bind a request context for repeated calls.
    pub fn bind<'a>(&'a self, context: &'a RenderContext) -> Bound<'a, T> {
        Bound {
            serializer: self,
            context,
        }
    }

    /// Compute the relation directives needed to render `selection`.
    pub fn plan(&self, selection: Option<&Selection>) -> Directives {
        Plan::plan(self, selection)
    }

    /// Plan `selection` and apply the result to `query`.
    pub fn modify_queryset<Q: QuerySet>(&self, query: Q, selection: Option<&Selection>) -> Q {
        let directives = self.plan(selection);
        debug!(
            serializer = %self.name,
            select = directives.select.len(),
            prefetch = directives.prefetch.len(),
            external = directives.external.len(),
            "applying planned relations"
        );
        apply_directives(query, &directives)
    }

    fn project(&self, source: &T, selection: Option<&Selection>) -> RenderResult<Map<String, Value>> {
        let mut output = Map::new();
        for field in readable_fields(self.fields.iter(), selection) {
            let nested = selection.and_then(|s| s.children_of(field.name()));
            match field.render(source, nested)? {
                Some(value) => {
                    output.insert(field.name().to_owned(), value);
                }
                None => trace!(serializer = %self.name, field = field.name(), "field skipped"),
            }
        }
        Ok(output)
    }
}

impl<T: 'static> Serializer<T> {
    /// A selection-aware converter rendering through this serializer.
    pub fn converter(self: &Arc<Self>) -> Converter<T> {
        let serializer = Arc::clone(self);
        Converter::selection_aware(move |source: &T, selection: Option<&Selection>| {
            serializer.render(source, selection).map(Value::Object)
        })
    }

    /// A collection serializer rendering each item through this serializer.
    pub fn many(self: &Arc<Self>) -> ListSerializer<T> {
        ListSerializer::new(self.converter())
    }
}

impl<T> Plan for Serializer<T> {
    fn default_selection(&self) -> Option<&Selection> {
        self.default_fields.as_ref()
    }

    fn relation_table(&self) -> &RelationTable {
        &self.relations
    }

    fn nested_planner(&self, field: &str) -> Option<&dyn Plan> {
        self.fields.get(field).and_then(Field::planner)
    }
}

/// A serializer bound to one request context.
#[derive(Debug)]
pub struct Bound<'a, T> {
    serializer: &'a Serializer<T>,
    context: &'a RenderContext,
}

impl<T> Clone for Bound<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Bound<'_, T> {}

impl<'a, T> Bound<'a, T> {
    /// The bound serializer.
    pub fn serializer(&self) -> &'a Serializer<T> {
        self.serializer
    }

    /// The bound context.
    pub fn context(&self) -> &'a RenderContext {
        self.context
    }

    /// Pagination hints from the context.
    pub fn page(&self) -> Option<PageHint> {
        self.context.page()
    }

    /// Render `source` with the context's selection.
    pub fn render(&self, source: &T) -> RenderResult<Map<String, Value>> {
        self.serializer.render_in(source, None, self.context)
    }

    /// Render a collection with the context's selection.
    pub fn render_many<'b, I>(&self, items: I) -> RenderResult<Vec<Value>>
    where
        I: IntoIterator<Item = &'b T>,
        T: 'b,
    {
        self.serializer.render_many(items, self.context.selection())
    }

    /// Plan relations for the context's selection.
    pub fn plan(&self) -> Directives {
        self.serializer.plan(self.context.selection())
    }

    /// Apply the planned relations to `query`.
    pub fn modify_queryset<Q: QuerySet>(&self, query: Q) -> Q {
        self.serializer.modify_queryset(query, self.context.selection())
    }
}
