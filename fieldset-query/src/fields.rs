//! Field descriptors and the registry that holds them.
//!
//! A [`Field`] pairs an attribute getter with a [`Converter`]. The converter's
//! capability is fixed when the field is registered: a selection-aware
//! converter receives the nested selection and prunes its own output, a plain
//! converter renders everything and the result is pruned afterwards.
//!
//! ```rust
//! use fieldset_query::{Field, Serializer};
//! use fieldset_selection::Selection;
//! use serde_json::json;
//!
//! struct User {
//!     id: i64,
//!     name: String,
//!     nickname: Option<String>,
//!     password: String,
//! }
//!
//! let users = Serializer::new("User")
//!     .field(Field::serialize("id", |u: &User| &u.id))
//!     .field(Field::serialize("name", |u: &User| &u.name))
//!     .field(Field::optional("nickname", |u: &User| u.nickname.as_ref()))
//!     .field(Field::serialize("password", |u: &User| &u.password).write_only());
//!
//! let user = User { id: 1, name: "Ada".into(), nickname: None, password: "x".into() };
//! let out = users.render(&user, Some(&Selection::parse("name,nickname,password"))).unwrap();
//! assert_eq!(serde_json::Value::Object(out), json!({"name": "Ada", "nickname": null}));
//! ```

use std::fmt;
use std::sync::Arc;

use fieldset_selection::{Readable, Selection, prune_value};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use smol_str::SmolStr;
use tracing::trace;

use crate::error::{RenderError, RenderResult};
use crate::planner::Plan;
use crate::serializer::Serializer;

/// Returned by a getter when the source cannot supply the attribute.
///
/// The field is left out of the output entirely rather than rendered as null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipField;

impl fmt::Display for SkipField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("attribute not available on source")
    }
}

impl std::error::Error for SkipField {}

/// An attribute read from a source object.
#[derive(Debug)]
pub enum Attribute<'a, A: ?Sized> {
    /// No value. Rendered as `null` without calling the converter.
    Null,
    /// A value to hand to the converter.
    Value(&'a A),
    /// A relation known only by its key.
    ///
    /// A missing key is treated exactly like [`Attribute::Null`]; a present key
    /// is handed to the converter like any other value.
    KeyOnly(Option<&'a A>),
}

impl<'a, A: ?Sized> From<Option<&'a A>> for Attribute<'a, A> {
    fn from(value: Option<&'a A>) -> Self {
        value.map_or(Attribute::Null, Attribute::Value)
    }
}

impl<'a, A: ?Sized> From<&'a A> for Attribute<'a, A> {
    fn from(value: &'a A) -> Self {
        Attribute::Value(value)
    }
}

/// Whether a converter understands nested selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Renders everything; the output is pruned afterwards.
    Plain,
    /// Receives the nested selection and renders only what it asks for.
    SelectionAware,
}

type PlainFn<A> = dyn Fn(&A) -> RenderResult<Value> + Send + Sync;
type AwareFn<A> = dyn Fn(&A, Option<&Selection>) -> RenderResult<Value> + Send + Sync;

/// Converts an attribute value into JSON.
pub enum Converter<A: ?Sized> {
    /// Selection-agnostic conversion.
    Plain(Arc<PlainFn<A>>),
    /// Conversion that honours the nested selection itself.
    SelectionAware(Arc<AwareFn<A>>),
}

impl<A: ?Sized> Clone for Converter<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Plain(f) => Self::Plain(Arc::clone(f)),
            Self::SelectionAware(f) => Self::SelectionAware(Arc::clone(f)),
        }
    }
}

impl<A: ?Sized> fmt::Debug for Converter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Converter").field(&self.capability()).finish()
    }
}

impl<A: ?Sized> Converter<A> {
    /// Create a selection-agnostic converter.
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(&A) -> RenderResult<Value> + Send + Sync + 'static,
    {
        Self::Plain(Arc::new(f))
    }

    /// Create a selection-aware converter.
    pub fn selection_aware<F>(f: F) -> Self
    where
        F: Fn(&A, Option<&Selection>) -> RenderResult<Value> + Send + Sync + 'static,
    {
        Self::SelectionAware(Arc::new(f))
    }

    /// The capability this converter was registered with.
    pub fn capability(&self) -> Capability {
        match self {
            Self::Plain(_) => Capability::Plain,
            Self::SelectionAware(_) => Capability::SelectionAware,
        }
    }

    /// Convert a value, restricting the output to `selection`.
    ///
    /// Plain converters render in full and are pruned afterwards.
    pub fn convert(&self, value: &A, selection: Option<&Selection>) -> RenderResult<Value> {
        match self {
            Self::SelectionAware(f) => f(value, selection),
            Self::Plain(f) => {
                let mut output = f(value)?;
                prune_value(&mut output, selection);
                Ok(output)
            }
        }
    }
}

impl<A: Serialize + ?Sized> Converter<A> {
    /// A plain converter backed by `serde::Serialize`.
    pub fn serde() -> Self {
        Self::plain(|value: &A| serde_json::to_value(value).map_err(RenderError::from))
    }
}

/// Render one attribute.
///
/// `Ok(None)` means the field was skipped. Null attributes and key-only
/// placeholders without a key never reach the converter.
pub fn project_attribute<A: ?Sized>(
    field: &str,
    attribute: Result<Attribute<'_, A>, SkipField>,
    converter: &Converter<A>,
    selection: Option<&Selection>,
) -> RenderResult<Option<Value>> {
    let attribute = match attribute {
        Ok(attribute) => attribute,
        Err(SkipField) => {
            trace!(field, "skipping unavailable attribute");
            return Ok(None);
        }
    };

    match attribute {
        Attribute::Null | Attribute::KeyOnly(None) => Ok(Some(Value::Null)),
        Attribute::Value(value) | Attribute::KeyOnly(Some(value)) => converter
            .convert(value, selection)
            .map(Some)
            .map_err(|e| e.in_field(field)),
    }
}

type RenderFn<T> = dyn Fn(&T, Option<&Selection>) -> RenderResult<Option<Value>> + Send + Sync;

fn identity() -> Converter<Value> {
    Converter::plain(|value: &Value| Ok(value.clone()))
}

fn erase<T, F>(f: F) -> Arc<RenderFn<T>>
where
    F: Fn(&T, Option<&Selection>) -> RenderResult<Option<Value>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A renderable field of `T`.
pub struct Field<T> {
    name: SmolStr,
    write_only: bool,
    capability: Capability,
    render: Arc<RenderFn<T>>,
    planner: Option<Arc<dyn Plan>>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            write_only: self.write_only,
            capability: self.capability,
            render: Arc::clone(&self.render),
            planner: self.planner.clone(),
        }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("write_only", &self.write_only)
            .field("capability", &self.capability)
            .field("nested", &self.planner.is_some())
            .finish()
    }
}

impl<T: 'static> Field<T> {
    /// Create a field from a getter and a converter.
    pub fn new<A, G>(name: impl Into<SmolStr>, getter: G, converter: Converter<A>) -> Self
    where
        A: ?Sized + 'static,
        G: for<'a> Fn(&'a T) -> Result<Attribute<'a, A>, SkipField> + Send + Sync + 'static,
    {
        let name = name.into();
        let capability = converter.capability();
        let field = name.clone();
        Self {
            name,
            write_only: false,
            capability,
            render: erase(move |source: &T, selection: Option<&Selection>| {
                project_attribute(&field, getter(source), &converter, selection)
            }),
            planner: None,
        }
    }

    /// A field rendered through `serde::Serialize`.
    pub fn serialize<A, G>(name: impl Into<SmolStr>, getter: G) -> Self
    where
        A: Serialize + ?Sized + 'static,
        G: for<'a> Fn(&'a T) -> &'a A + Send + Sync + 'static,
    {
        Self::new(name, move |source| Ok(Attribute::Value(getter(source))), Converter::serde())
    }

    /// A nullable field rendered through `serde::Serialize`.
    pub fn optional<A, G>(name: impl Into<SmolStr>, getter: G) -> Self
    where
        A: Serialize + ?Sized + 'static,
        G: for<'a> Fn(&'a T) -> Option<&'a A> + Send + Sync + 'static,
    {
        Self::new(name, move |source| Ok(getter(source).into()), Converter::serde())
    }

    /// A field whose getter may report the attribute as unavailable.
    pub fn fallible<A, G>(name: impl Into<SmolStr>, getter: G) -> Self
    where
        A: Serialize + ?Sized + 'static,
        G: for<'a> Fn(&'a T) -> Result<Option<&'a A>, SkipField> + Send + Sync + 'static,
    {
        Self::new(name, move |source| getter(source).map(Attribute::from), Converter::serde())
    }

    /// A value computed from the source, like a method field.
    ///
    /// A computed `null` is treated as a null attribute.
    pub fn computed<G>(name: impl Into<SmolStr>, getter: G) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        let field = name.clone();
        let identity = identity();
        Self {
            name,
            write_only: false,
            capability: Capability::Plain,
            render: erase(move |source: &T, selection: Option<&Selection>| {
                let value = getter(source);
                let attribute = match &value {
                    Value::Null => Attribute::Null,
                    other => Attribute::Value(other),
                };
                project_attribute(&field, Ok(attribute), &identity, selection)
            }),
            planner: None,
        }
    }

    /// A relation represented only by its key, rendered as the key itself.
    pub fn key_only<G>(name: impl Into<SmolStr>, getter: G) -> Self
    where
        G: Fn(&T) -> Option<Value> + Send + Sync + 'static,
    {
        Self::key_only_with(name, getter, identity())
    }

    /// A relation represented only by its key, rendered through `converter`.
    ///
    /// Use this when the key needs formatting, such as building a link from it.
    pub fn key_only_with<G>(
        name: impl Into<SmolStr>,
        getter: G,
        converter: Converter<Value>,
    ) -> Self
    where
        G: Fn(&T) -> Option<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let field = name.clone();
        Self {
            name,
            write_only: false,
            capability: converter.capability(),
            render: erase(move |source: &T, selection: Option<&Selection>| {
                let key = getter(source);
                let attribute = Attribute::KeyOnly(key.as_ref());
                project_attribute(&field, Ok(attribute), &converter, selection)
            }),
            planner: None,
        }
    }

    /// A single related object rendered by another serializer.
    ///
    /// The nested serializer also contributes its relation table to planning.
    pub fn nested<U, G>(name: impl Into<SmolStr>, getter: G, serializer: Arc<Serializer<U>>) -> Self
    where
        U: 'static,
        G: for<'a> Fn(&'a T) -> Option<&'a U> + Send + Sync + 'static,
    {
        let converter = Serializer::converter(&serializer);
        let mut field = Self::new(name, move |source| Ok(getter(source).into()), converter);
        field.planner = Some(serializer);
        field
    }

    /// A collection of related objects rendered by another serializer.
    ///
    /// The getter returns anything whose references iterate the items, so
    /// `Vec<U>`, slices and loaded relation wrappers all work.
    pub fn nested_many<U, C, G>(
        name: impl Into<SmolStr>,
        getter: G,
        serializer: Arc<Serializer<U>>,
    ) -> Self
    where
        U: 'static,
        C: ?Sized + 'static,
        for<'x> &'x C: IntoIterator<Item = &'x U>,
        G: for<'a> Fn(&'a T) -> Option<&'a C> + Send + Sync + 'static,
    {
        let converter = Serializer::converter(&serializer).many();
        let mut field = Self::new(name, move |source| Ok(getter(source).into()), converter);
        field.planner = Some(serializer);
        field
    }

    /// Mark the field as write-only so it is never rendered.
    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    /// Attach a planner for the nested component this field renders.
    pub fn with_planner(mut self, planner: Arc<dyn Plan>) -> Self {
        self.planner = Some(planner);
        self
    }
}

impl<T> Field<T> {
    /// The output name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the field is write-only.
    pub fn is_write_only(&self) -> bool {
        self.write_only
    }

    /// The converter capability fixed at registration.
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// The nested component's planner, if any.
    pub fn planner(&self) -> Option<&dyn Plan> {
        self.planner.as_deref()
    }

    /// Render this field of `source`. `Ok(None)` means the field was skipped.
    pub fn render(&self, source: &T, selection: Option<&Selection>) -> RenderResult<Option<Value>> {
        (self.render)(source, selection)
    }
}

impl<T> Readable for Field<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_write_only(&self) -> bool {
        self.write_only
    }
}

/// Ordered registry of the fields of `T`.
///
/// Registering a name twice replaces the earlier field in place.
pub struct FieldSet<T> {
    fields: IndexMap<SmolStr, Field<T>>,
}

impl<T> Default for FieldSet<T> {
    fn default() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }
}

impl<T> Clone for FieldSet<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<T> fmt::Debug for FieldSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.values()).finish()
    }
}

impl<T> FieldSet<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field.
    pub fn insert(&mut self, field: Field<T>) {
        self.fields.insert(field.name.clone(), field);
    }

    /// Get a field by name.
    pub fn get(&self, name: &str) -> Option<&Field<T>> {
        self.fields.get(name)
    }

    /// Iterate over fields in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Field<T>> {
        self.fields.values()
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T> FromIterator<Field<T>> for FieldSet<T> {
    fn from_iter<I: IntoIterator<Item = Field<T>>>(iter: I) -> Self {
        let mut set = Self::new();
        for field in iter {
            set.insert(field);
        }
        set
    }
}
