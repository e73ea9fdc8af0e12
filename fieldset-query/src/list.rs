//! Collection rendering.

use fieldset_selection::{Selection, prune_value};
use serde_json::Value;

use crate::error::RenderResult;
use crate::fields::Converter;

/// Renders every item of a collection with a child converter.
///
/// The child's capability is checked once per call, not per item: either all
/// items receive the selection, or all items are rendered in full and pruned.
pub struct ListSerializer<U: ?Sized> {
    child: Converter<U>,
}

impl<U: ?Sized> Clone for ListSerializer<U> {
    fn clone(&self) -> Self {
        Self {
            child: self.child.clone(),
        }
    }
}

impl<U: ?Sized> std::fmt::Debug for ListSerializer<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListSerializer")
            .field("child", &self.child)
            .finish()
    }
}

impl<U: ?Sized> ListSerializer<U> {
    /// Wrap a child converter.
    pub fn new(child: Converter<U>) -> Self {
        Self { child }
    }

    /// The child converter.
    pub fn child(&self) -> &Converter<U> {
        &self.child
    }

    /// Render items in source order.
    pub fn render<'a, I>(&self, items: I, selection: Option<&Selection>) -> RenderResult<Vec<Value>>
    where
        I: IntoIterator<Item = &'a U>,
        U: 'a,
    {
        match &self.child {
            Converter::SelectionAware(render) => {
                items.into_iter().map(|item| render(item, selection)).collect()
            }
            Converter::Plain(render) => items
                .into_iter()
                .map(|item| {
                    let mut value = render(item)?;
                    prune_value(&mut value, selection);
                    Ok(value)
                })
                .collect(),
        }
    }
}

impl<U: ?Sized + 'static> ListSerializer<U> {
    /// Turn this list into a selection-aware converter for any collection `C`
    /// whose references iterate `&U`.
    pub fn into_converter<C>(self) -> Converter<C>
    where
        C: ?Sized + 'static,
        for<'x> &'x C: IntoIterator<Item = &'x U>,
    {
        Converter::selection_aware(move |items: &C, selection: Option<&Selection>| {
            self.render(items, selection).map(Value::Array)
        })
    }
}

impl<U: ?Sized + 'static> Converter<U> {
    /// Lift an item converter to a collection converter.
    pub fn many<C>(self) -> Converter<C>
    where
        C: ?Sized + 'static,
        for<'x> &'x C: IntoIterator<Item = &'x U>,
    {
        ListSerializer::new(self).into_converter()
    }
}
