//! Diff result tree.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

use crate::fieldpath::Path;
use crate::value::Value;

/// DiffTree holds the differences found across N inputs.
///
/// A leaf carries one value per input, `Null` standing for an input that
/// lacks the field. A branch carries the fields whose values differ below it.
/// The root may be both: when some inputs are scalars it carries their
/// positional values next to the fields that differ among the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffTree {
    values: Option<Vec<Value>>,
    fields: IndexMap<String, DiffTree>,
}

impl DiffTree {
    /// Creates an empty tree: no differences.
    pub fn new() -> Self {
        DiffTree::default()
    }

    /// Creates a leaf holding one value per input.
    pub fn leaf(values: Vec<Value>) -> Self {
        DiffTree {
            values: Some(values),
            fields: IndexMap::new(),
        }
    }

    /// Returns true if no differences were recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_none() && self.fields.is_empty()
    }

    /// Returns true if this node carries values and no fields.
    pub fn is_leaf(&self) -> bool {
        self.values.is_some() && self.fields.is_empty()
    }

    /// Returns the per-input values of this node, if any.
    pub fn values(&self) -> Option<&[Value]> {
        self.values.as_deref()
    }

    pub fn field(&self, name: &str) -> Option<&DiffTree> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &DiffTree)> {
        self.fields.iter().map(|(name, child)| (name.as_str(), child))
    }

    /// Looks up the node at a dotted path below this one.
    pub fn get(&self, path: &str) -> Option<&DiffTree> {
        path.split('.').try_fold(self, |node, segment| node.field(segment))
    }

    /// Returns the dotted path of every leaf, depth-first in discovery order.
    ///
    /// The positional values of a hybrid root have no path and are not listed.
    pub fn paths(&self) -> Vec<String> {
        self.leaves().into_iter().map(|(path, _)| path).collect()
    }

    /// Returns every leaf with its dotted path, depth-first in discovery order.
    pub fn leaves(&self) -> Vec<(String, &DiffTree)> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut Path::root(), &mut leaves);
        leaves
    }

    /// Returns the number of leaves below this node.
    pub fn leaf_count(&self) -> usize {
        self.fields
            .values()
            .map(|child| if child.is_leaf() { 1 } else { child.leaf_count() })
            .sum()
    }

    pub(crate) fn set_values(&mut self, values: Vec<Value>) {
        self.values = Some(values);
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, child: DiffTree) {
        self.fields.insert(name.into(), child);
    }

    fn collect_leaves<'a>(&'a self, path: &mut Path, leaves: &mut Vec<(String, &'a DiffTree)>) {
        for (name, child) in &self.fields {
            path.push(name.as_str());
            if child.is_leaf() {
                leaves.push((path.to_string(), child));
            } else {
                child.collect_leaves(path, leaves);
            }
            path.pop();
        }
    }
}

impl fmt::Display for DiffTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, leaf) in self.leaves() {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{}", path)?;
            if let Some(values) = leaf.values() {
                write!(f, ": ")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    match serde_json::to_string(value) {
                        Ok(json) => write!(f, "{}", json)?,
                        Err(_) => write!(f, "{:?}", value)?,
                    }
                }
            }
        }
        Ok(())
    }
}

impl Serialize for DiffTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.values {
            Some(values) if self.fields.is_empty() => serializer.collect_seq(values),
            values => {
                let positional = values.as_deref().unwrap_or_default();
                let mut map = serializer.serialize_map(Some(positional.len() + self.fields.len()))?;
                for (i, value) in positional.iter().enumerate() {
                    map.serialize_entry(&i.to_string(), value)?;
                }
                for (name, child) in &self.fields {
                    map.serialize_entry(name, child)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> DiffTree {
        let mut nested = DiffTree::new();
        nested.insert("m", DiffTree::leaf(vec![Value::from("n"), Value::from("nop")]));
        nested.insert("o", DiffTree::leaf(vec![Value::Int(1), Value::Null]));
        let mut root = DiffTree::new();
        root.insert("c", DiffTree::leaf(vec![Value::from("d"), Value::Int(1)]));
        root.insert("l", nested);
        root
    }

    #[test]
    fn test_tree_queries() {
        let tree = sample();
        assert!(!tree.is_empty());
        assert!(!tree.is_leaf());
        assert!(DiffTree::new().is_empty());
        assert_eq!(tree.paths(), vec!["c", "l.m", "l.o"]);
        assert_eq!(tree.leaf_count(), 3);
        assert_eq!(
            tree.get("l.m").and_then(DiffTree::values),
            Some(&[Value::from("n"), Value::from("nop")][..])
        );
        assert!(tree.get("l.x").is_none());
        assert!(tree.get("c.d").is_none());
    }

    #[test]
    fn test_serialize_leaves_and_branches() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "c": ["d", 1],
                "l": { "m": ["n", "nop"], "o": [1, null] }
            })
        );
        assert_eq!(serde_json::to_string(&DiffTree::new()).unwrap(), "{}");
    }

    #[test]
    fn test_serialize_hybrid_root() {
        let mut tree = DiffTree::new();
        tree.set_values(vec![Value::Null, Value::from("x")]);
        tree.insert("a", DiffTree::leaf(vec![Value::Int(1), Value::Null]));
        assert_eq!(
            serde_json::to_string(&tree).unwrap(),
            r#"{"0":null,"1":"x","a":[1,null]}"#
        );
        // positional values are not a path
        assert_eq!(tree.paths(), vec!["a"]);
    }

    #[test]
    fn test_display_keys_containing_dots() {
        let mut tree = DiffTree::new();
        tree.insert("a.b", DiffTree::leaf(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(tree.to_string(), "a.b: 1 | 2");
    }

    #[test]
    fn test_display_lists_leaves() {
        assert_eq!(sample().to_string(), "c: \"d\" | 1\nl.m: \"n\" | \"nop\"\nl.o: 1 | null");
    }
}
