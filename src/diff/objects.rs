//! N-way structural diff.

use indexmap::IndexSet;
use tracing::{debug, trace};

use super::DiffTree;
use crate::value::{deep_equals, Value, UNDEFINED};

/// Computes the differences between any number of values.
///
/// Fields whose values are deep-equal across every input are omitted. A field
/// whose values are all collections sharing at least one key is diffed
/// recursively; any other differing field becomes a leaf holding one value
/// per input, with `Null` for inputs that lack the field.
///
/// When every input is equal the result is empty. When some inputs are
/// scalars the root also carries one positional value per input: the scalar
/// itself, or `Null` for collection inputs.
pub fn diff_objects(values: &[&Value]) -> DiffTree {
    let mut tree = DiffTree::new();
    if all_equal(values) {
        return tree;
    }
    if values.iter().any(|value| value.is_scalar()) {
        tree.set_values(
            values
                .iter()
                .map(|value| match value {
                    Value::Undefined | Value::List(_) | Value::Map(_) => Value::Null,
                    scalar => (*scalar).clone(),
                })
                .collect(),
        );
    }
    diff_fields(values, &mut tree);
    debug!(inputs = values.len(), leaves = tree.leaf_count(), "diffed values");
    tree
}

/// Lists the dotted paths of every differing leaf field, in discovery order.
pub fn dotted_diff(values: &[&Value]) -> Vec<String> {
    diff_objects(values).paths()
}

fn diff_fields(values: &[&Value], tree: &mut DiffTree) {
    for key in union_keys(values) {
        let column: Vec<&Value> = values
            .iter()
            .map(|value| value.get_key(&key).unwrap_or(&UNDEFINED))
            .collect();
        if all_equal(&column) {
            continue;
        }
        if descends(&column) {
            let mut child = DiffTree::new();
            diff_fields(&column, &mut child);
            if !child.is_empty() {
                trace!(field = %key, "descending into differing collections");
                tree.insert(key, child);
                continue;
            }
        }
        let leaf = column
            .iter()
            .map(|value| match value {
                Value::Undefined => Value::Null,
                value => (*value).clone(),
            })
            .collect();
        tree.insert(key, DiffTree::leaf(leaf));
    }
}

/// Own keys of every collection input, first occurrence first.
fn union_keys(values: &[&Value]) -> IndexSet<String> {
    values
        .iter()
        .flat_map(|value| value.own_keys())
        .collect()
}

fn all_equal(values: &[&Value]) -> bool {
    match values.split_first() {
        Some((first, rest)) => rest.iter().all(|value| deep_equals(first, value)),
        None => true,
    }
}

/// Returns true if every present value is a collection and some key occurs
/// in at least two of them.
fn descends(column: &[&Value]) -> bool {
    let present: Vec<&Value> = column
        .iter()
        .copied()
        .filter(|value| !value.is_undefined())
        .collect();
    if present.iter().any(|value| value.is_scalar()) {
        return false;
    }
    let mut seen = IndexSet::new();
    present
        .iter()
        .any(|value| value.own_keys().into_iter().any(|key| !seen.insert(key)))
}
