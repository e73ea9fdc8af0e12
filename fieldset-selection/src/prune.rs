//! Applying a selection to data that has already been produced.

use serde_json::Value;

use crate::node::Selection;

impl Selection {
    /// Prune a decoded result in place so it only contains selected keys.
    ///
    /// Objects lose every key that is not selected, and retained keys whose
    /// node carries a nested selection are pruned recursively. Arrays are pruned
    /// element by element. Scalars are left alone. An empty selection keeps
    /// everything.
    pub fn prune(&self, value: &mut Value) {
        if self.is_empty() {
            return;
        }
        match value {
            Value::Object(map) => {
                map.retain(|key, _| self.contains(key));
                for (key, child) in map.iter_mut() {
                    if let Some(children) = self.children_of(key) {
                        children.prune(child);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.prune(item);
                }
            }
            _ => {}
        }
    }
}

/// Prune `value` with an optional selection. `None` keeps everything.
pub fn prune_value(value: &mut Value, selection: Option<&Selection>) {
    if let Some(selection) = selection {
        selection.prune(value);
    }
}

/// A field descriptor that can be filtered by a selection.
pub trait Readable {
    /// Output name of the field.
    fn name(&self) -> &str;

    /// Write-only fields are accepted on input but never rendered.
    fn is_write_only(&self) -> bool;
}

/// Lazily filter descriptors down to the ones that should be rendered.
///
/// Write-only descriptors are always skipped. With a non-empty selection,
/// descriptors whose name is not selected are skipped as well; names in the
/// selection that match no descriptor are ignored.
pub fn readable_fields<'a, I, F>(
    fields: I,
    selection: Option<&'a Selection>,
) -> impl Iterator<Item = &'a F>
where
    I: IntoIterator<Item = &'a F>,
    F: Readable + ?Sized + 'a,
{
    let selection = Selection::non_empty(selection);
    fields.into_iter().filter(move |field| {
        !field.is_write_only() && selection.is_none_or(|s| s.contains(field.name()))
    })
}
