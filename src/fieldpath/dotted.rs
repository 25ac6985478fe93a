//! Conversion of nested trees into dotted form.

use super::Path;
use crate::value::{Map, Shape, Value};

/// CollapseOptions controls how [`collapse_to_dotted_with`] walks a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollapseOptions {
    /// Also record every intermediate collection at its own path.
    ///
    /// `{ foo: { bar: "baz" } }` becomes
    /// `{ "foo": { bar: "baz" }, "foo.bar": "baz" }` instead of
    /// `{ "foo.bar": "baz" }`.
    pub include_redundant_levels: bool,
    /// Treat lists as leaves instead of descending into them.
    ///
    /// `{ foo: ["bar", "baz"] }` becomes `{ "foo": ["bar", "baz"] }` instead
    /// of `{ "foo.0": "bar", "foo.1": "baz" }`.
    pub stop_at_arrays: bool,
}

impl CollapseOptions {
    pub fn include_redundant_levels(mut self, value: bool) -> Self {
        self.include_redundant_levels = value;
        self
    }

    pub fn stop_at_arrays(mut self, value: bool) -> Self {
        self.stop_at_arrays = value;
        self
    }
}

/// Converts a tree into a one-level map from dotted path to leaf value.
pub fn collapse_to_dotted(obj: &Value) -> Map {
    collapse_to_dotted_with(obj, CollapseOptions::default())
}

/// Converts a tree into dotted form with explicit options.
///
/// The walk is depth-first in key order. The root itself is never a key, so a
/// scalar input yields an empty map.
pub fn collapse_to_dotted_with(obj: &Value, options: CollapseOptions) -> Map {
    let mut result = Map::new();
    if obj.is_collection() {
        add_level(obj, &mut Path::root(), options, &mut result);
    }
    result
}

fn add_level(node: &Value, path: &mut Path, options: CollapseOptions, result: &mut Map) {
    let leaf = match node.shape() {
        Shape::Scalar => true,
        Shape::Sequence => options.stop_at_arrays,
        Shape::Mapping => false,
    };
    if (leaf || options.include_redundant_levels) && !path.is_empty() {
        result.set(path.to_string(), node.clone());
    }
    if leaf {
        return;
    }
    for (key, child) in node.own_entries() {
        path.push(key);
        add_level(child, path, options, result);
        path.pop();
    }
}
