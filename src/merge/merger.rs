//! Recursive deep merge of source trees into a destination.

use tracing::{debug, trace};

use crate::fieldpath::parse_index;
use crate::value::{same_value, Shape, Value, UNDEFINED};

/// Customizer overrides the merge decision for a single field.
///
/// It is consulted for every own key of every source, at every depth, before
/// the default rule runs. Closures with the matching signature implement it.
pub trait Customizer {
    /// Returns the value to assign verbatim, or `None` to apply the default
    /// merge rule. Returning `Some(Value::Undefined)` counts as `None`.
    ///
    /// `existing` is `Undefined` when the destination has no such key.
    /// `destination` and `source` are the collections that own `key`.
    fn customize(
        &mut self,
        existing: &Value,
        incoming: &Value,
        key: &str,
        destination: &Value,
        source: &Value,
    ) -> Option<Value>;
}

impl<F> Customizer for F
where
    F: FnMut(&Value, &Value, &str, &Value, &Value) -> Option<Value>,
{
    fn customize(
        &mut self,
        existing: &Value,
        incoming: &Value,
        key: &str,
        destination: &Value,
        source: &Value,
    ) -> Option<Value> {
        self(existing, incoming, key, destination, source)
    }
}

/// Deep merges `sources` into `destination`, left to right.
///
/// See [`Merger::merge`] for the rules.
pub fn merge<'a>(destination: &'a mut Value, sources: &[&Value]) -> &'a mut Value {
    Merger::new().merge(destination, sources)
}

/// Deep merges `sources` into `destination`, consulting `customizer` for
/// every field.
pub fn merge_with<'a, C: Customizer>(
    destination: &'a mut Value,
    sources: &[&Value],
    mut customizer: C,
) -> &'a mut Value {
    Merger::with_customizer(&mut customizer).merge(destination, sources)
}

/// Merger carries the merge configuration through one recursive merge.
#[derive(Default)]
pub struct Merger<'c> {
    customizer: Option<&'c mut dyn Customizer>,
}

impl<'c> Merger<'c> {
    /// Creates a Merger that applies the default rules only.
    pub fn new() -> Self {
        Merger::default()
    }

    /// Creates a Merger that consults `customizer` for every field.
    pub fn with_customizer(customizer: &'c mut dyn Customizer) -> Self {
        Merger {
            customizer: Some(customizer),
        }
    }

    /// Merges each source into the destination and returns the destination.
    ///
    /// - A scalar destination is returned unmodified; scalar sources are
    ///   skipped. A map destination stays a map when a source is a list: the
    ///   items merge in under their index keys.
    /// - When a source value and the existing value are both collections they
    ///   are merged recursively. A map merged with a list becomes a list first
    ///   (array-like maps keep their indexed entries); a list merged with a
    ///   map becomes an index-keyed map.
    /// - A collection source value over a scalar or missing destination value
    ///   is merged into a fresh empty collection.
    /// - Any other source value is assigned, except that `Undefined` never
    ///   overwrites an existing value and never adds a map key. `Null` does
    ///   overwrite.
    /// - A value equal to the current one is never reassigned.
    pub fn merge<'a>(mut self, destination: &'a mut Value, sources: &[&Value]) -> &'a mut Value {
        if destination.is_scalar() {
            debug!(destination = destination.type_name(), "scalar merge destination, sources ignored");
            return destination;
        }
        for (index, source) in sources.iter().enumerate() {
            if source.is_scalar() {
                trace!(index, source = source.type_name(), "skipping scalar merge source");
                continue;
            }
            if destination.is_map() && source.is_list() {
                // the root keeps its kind; list items land under index keys
                self.merge_entries(destination, source);
            } else {
                self.merge_collection(destination, source);
            }
        }
        destination
    }

    fn merge_collection(&mut self, destination: &mut Value, source: &Value) {
        match source.shape() {
            Shape::Sequence if !destination.is_list() => destination.coerce_to_list(),
            Shape::Mapping if !destination.is_map() => destination.coerce_to_map(),
            _ => {}
        }
        self.merge_entries(destination, source);
    }

    fn merge_entries(&mut self, destination: &mut Value, source: &Value) {
        for (key, incoming) in source.own_entries() {
            let key: &str = &key;
            match self.customize(destination, key, incoming, source) {
                Some(custom) => {
                    let existing = destination.get_key(key).unwrap_or(&UNDEFINED);
                    if !same_value(existing, &custom) {
                        *destination.slot_mut(key) = custom;
                    }
                }
                None => self.merge_field(destination, key, incoming),
            }
        }
    }

    fn customize(
        &mut self,
        destination: &Value,
        key: &str,
        incoming: &Value,
        source: &Value,
    ) -> Option<Value> {
        let customizer = self.customizer.as_deref_mut()?;
        let existing = destination.get_key(key).unwrap_or(&UNDEFINED);
        customizer
            .customize(existing, incoming, key, destination, source)
            .filter(|value| !value.is_undefined())
    }

    fn merge_field(&mut self, destination: &mut Value, key: &str, incoming: &Value) {
        if incoming.is_collection() {
            let slot = destination.slot_mut(key);
            if slot.is_scalar() {
                *slot = incoming.empty_like();
            }
            self.merge_collection(slot, incoming);
            return;
        }

        let unchanged = destination
            .get_key(key)
            .is_some_and(|existing| same_value(existing, incoming));
        if unchanged || (incoming.is_undefined() && !extends_list(destination, key)) {
            return;
        }
        *destination.slot_mut(key) = incoming.clone();
    }
}

/// Returns true if `key` addresses a list slot past its current end.
fn extends_list(destination: &Value, key: &str) -> bool {
    match destination {
        Value::List(items) => parse_index(key).is_some_and(|index| index >= items.len()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_flat_fields() {
        let mut dest = Value::from(json!({ "a": 1, "b": 2 }));
        merge(&mut dest, &[&Value::from(json!({ "b": 3, "c": 4 }))]);
        assert_eq!(dest, Value::from(json!({ "a": 1, "b": 3, "c": 4 })));
        assert_eq!(dest.own_keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_creates_nested_collections() {
        let mut dest = Value::from(json!({ "a": 1 }));
        let source = Value::from(json!({ "a": { "b": [1, { "c": 2 }] } }));
        merge(&mut dest, &[&source]);
        assert_eq!(dest, source);

        let nested = dest.get_key("a").and_then(|a| a.get_key("b")).and_then(Value::as_list).unwrap();
        let original = source.get_key("a").and_then(|a| a.get_key("b")).and_then(Value::as_list).unwrap();
        assert_ne!(nested.as_ptr(), original.as_ptr());
    }

    #[test]
    fn test_merge_list_into_map_becomes_keyed_map() {
        let mut dest = Value::from(json!({ "a": [1, 2] }));
        merge(&mut dest, &[&Value::from(json!({ "a": { "b": 2 } }))]);
        assert_eq!(dest, Value::from(json!({ "a": { "0": 1, "1": 2, "b": 2 } })));
    }

    #[test]
    fn test_merge_list_source_into_map_root_keeps_keys() {
        let mut dest = Value::from(json!({ "a": 1 }));
        merge(&mut dest, &[&Value::from(json!([5, { "b": 2 }]))]);
        assert_eq!(dest, Value::from(json!({ "a": 1, "0": 5, "1": { "b": 2 } })));
        assert_eq!(dest.own_keys(), vec!["a", "0", "1"]);
    }

    #[test]
    fn test_merge_nan_is_not_reassigned() {
        let mut dest = Value::from(json!({}));
        dest.as_map_mut().unwrap().set("a", Value::Float(f64::NAN));
        let mut calls = 0;
        merge_with(
            &mut dest,
            &[&Value::Map([("a", Value::Float(f64::NAN))].into_iter().collect())],
            |_: &Value, incoming: &Value, _: &str, _: &Value, _: &Value| {
                calls += 1;
                Some(incoming.clone())
            },
        );
        assert_eq!(calls, 1);
        assert!(dest.get_key("a").and_then(Value::as_float).unwrap().is_nan());
    }

    #[test]
    fn test_extends_list() {
        let list = Value::from(json!([1, 2]));
        assert!(extends_list(&list, "2"));
        assert!(!extends_list(&list, "1"));
        assert!(!extends_list(&list, "x"));
        assert!(!extends_list(&Value::from(json!({})), "5"));
    }
}
