//! In-place synchronization of a destination tree with a source tree.

use std::fmt;
use tracing::{debug, trace};

use crate::fieldpath::Path;
use crate::value::{deep_copy, deep_equals, Map, Value};

/// SyncOptions configures the hooks consulted by [`sync_object`].
///
/// Both hooks receive the dotted path of the field being considered.
#[derive(Default)]
pub struct SyncOptions<'a> {
    on_field: Option<Box<dyn FnMut(&str) -> bool + 'a>>,
    on_change: Option<Box<dyn FnMut(&str) + 'a>>,
}

impl<'a> SyncOptions<'a> {
    pub fn new() -> Self {
        SyncOptions::default()
    }

    /// Sets the field filter. Returning false for a path leaves that field
    /// and everything below it alone.
    pub fn on_field(mut self, on_field: impl FnMut(&str) -> bool + 'a) -> Self {
        self.on_field = Some(Box::new(on_field));
        self
    }

    /// Sets the hook notified once for every field that is replaced, added or
    /// removed.
    pub fn on_change(mut self, on_change: impl FnMut(&str) + 'a) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }
}

impl fmt::Debug for SyncOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("on_field", &self.on_field.is_some())
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

/// Makes `destination` deep-equal to `source` while touching as little of it
/// as possible.
///
/// Collections present on both sides with the same shape are updated in
/// place, so references into unchanged branches stay valid. Differing fields
/// are replaced with copies of the source and fields missing from the source
/// are removed; lists are truncated from the end. Each replaced, added or
/// removed field is reported through `on_change`.
///
/// When the two roots have different shapes the destination is replaced as a
/// whole and no change is reported.
pub fn sync_object(destination: &mut Value, source: &Value, options: SyncOptions<'_>) {
    let mut syncer = Syncer {
        options,
        path: Path::root(),
    };
    if source.is_collection() && destination.shape() == source.shape() {
        syncer.sync_level(destination, source);
    } else if !deep_equals(destination, source) {
        debug!(
            destination = destination.type_name(),
            source = source.type_name(),
            "sync roots differ in shape, replacing destination"
        );
        *destination = syncer.filtered_copy(source);
    }
}

struct Syncer<'a> {
    options: SyncOptions<'a>,
    path: Path,
}

impl Syncer<'_> {
    fn sync_level(&mut self, destination: &mut Value, source: &Value) {
        for (key, incoming) in source.own_entries() {
            self.path.push(&*key);
            if self.accepts() {
                self.sync_field(destination, &key, incoming);
            }
            self.path.pop();
        }
        self.remove_stale(destination, source);
    }

    fn sync_field(&mut self, destination: &mut Value, key: &str, incoming: &Value) {
        let (unchanged, nested) = match destination.get_key(key) {
            Some(existing) => (
                deep_equals(existing, incoming),
                existing.is_collection() && existing.shape() == incoming.shape(),
            ),
            None => (incoming.is_undefined(), false),
        };
        if unchanged {
            return;
        }
        if nested {
            if let Some(existing) = destination.get_key_mut(key) {
                self.sync_level(existing, incoming);
            }
            return;
        }
        let copy = self.filtered_copy(incoming);
        *destination.slot_mut(key) = copy;
        self.changed();
    }

    /// Drops destination fields the source no longer has.
    fn remove_stale(&mut self, destination: &mut Value, source: &Value) {
        match destination {
            Value::Map(map) => {
                let stale: Vec<String> = map
                    .keys()
                    .filter(|key| source.get_key(key).is_none())
                    .cloned()
                    .collect();
                for key in stale {
                    self.path.push(key.as_str());
                    if self.accepts() {
                        map.delete(&key);
                        self.changed();
                    }
                    self.path.pop();
                }
            }
            Value::List(items) => {
                let keep = source.as_list().map_or(0, Vec::len);
                while items.len() > keep {
                    self.path.push((items.len() - 1).to_string());
                    let accepted = self.accepts();
                    if accepted {
                        items.pop();
                        self.changed();
                    }
                    self.path.pop();
                    if !accepted {
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    /// Copies `value`, which lives at the current path, leaving out every
    /// field the filter rejects. Rejected list items become `Undefined`.
    fn filtered_copy(&mut self, value: &Value) -> Value {
        if self.options.on_field.is_none() {
            return deep_copy(value);
        }
        match value {
            Value::List(items) => {
                let mut copy = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    self.path.push(index.to_string());
                    copy.push(if self.accepts() {
                        self.filtered_copy(item)
                    } else {
                        Value::Undefined
                    });
                    self.path.pop();
                }
                Value::List(copy)
            }
            Value::Map(map) => {
                let mut copy = Map::new();
                for (key, child) in map {
                    self.path.push(key.as_str());
                    if self.accepts() {
                        copy.set(key.clone(), self.filtered_copy(child));
                    }
                    self.path.pop();
                }
                Value::Map(copy)
            }
            scalar => scalar.clone(),
        }
    }

    fn accepts(&mut self) -> bool {
        match self.options.on_field.as_mut() {
            Some(on_field) => on_field(&self.path.to_string()),
            None => true,
        }
    }

    fn changed(&mut self) {
        let field = self.path.to_string();
        trace!(field = %field, "synced field");
        if let Some(on_change) = self.options.on_change.as_mut() {
            on_change(&field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sync_options_debug() {
        let options = SyncOptions::new().on_change(|_| {});
        assert_eq!(
            format!("{:?}", options),
            "SyncOptions { on_field: false, on_change: true }"
        );
    }

    #[test]
    fn test_filtered_copy_drops_rejected_fields() {
        let mut syncer = Syncer {
            options: SyncOptions::new().on_field(|field| field != "a.secret" && field != "list.1"),
            path: Path::root(),
        };
        let value = Value::from(json!({ "a": { "secret": 1, "open": 2 }, "list": [1, 2, 3] }));
        let copy = syncer.filtered_copy(&value);
        assert_eq!(copy.get_key("a"), Some(&Value::from(json!({ "open": 2 }))));
        let list = copy.get_key("list").and_then(Value::as_list).unwrap();
        assert_eq!(list.len(), 3);
        assert!(list[1].is_undefined());
        assert!(syncer.path.is_empty());
    }

    #[test]
    fn test_scalar_roots() {
        let mut dest = Value::Int(1);
        sync_object(&mut dest, &Value::from("x"), SyncOptions::new());
        assert_eq!(dest, Value::from("x"));

        let mut dest = Value::from(json!({ "a": 1 }));
        sync_object(&mut dest, &Value::from(json!([1])), SyncOptions::new());
        assert_eq!(dest, Value::from(json!([1])));
    }
}
