//! Reading and writing values at dotted paths.

use super::is_numeric_segment;
use crate::value::{Map, Value};

/// Splits a dotted path into its parent part and its final segment.
fn split_last(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once('.') {
        Some((parents, last)) => (Some(parents), last),
        None => (None, path),
    }
}

/// Gets the value at a given path.
///
/// A `None` path returns the root. The lookup fails as soon as a scalar is
/// reached before the path is exhausted.
///
/// With `allow_skip_arrays`, a list holding exactly one element is transparent
/// to a non-numeric segment: the walk descends into the element and retries
/// the same segment there. This lets `baz.arr.zip` address
/// `{ baz: { arr: [{ zip: 4 }] } }`.
pub fn get_path<'a>(obj: &'a Value, path: Option<&str>, allow_skip_arrays: bool) -> Option<&'a Value> {
    let Some(path) = path else {
        return Some(obj);
    };
    let segments: Vec<&str> = path.split('.').collect();
    let mut current = obj;
    let mut i = 0;
    while i < segments.len() {
        let segment = segments[i];
        match current {
            Value::List(items)
                if allow_skip_arrays && items.len() == 1 && !is_numeric_segment(segment) =>
            {
                current = &items[0];
            }
            _ => {
                current = current.get_key(segment)?;
                i += 1;
            }
        }
    }
    Some(current)
}

/// Gets a mutable reference to the value at a given path.
pub fn get_path_mut<'a>(obj: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = obj;
    for segment in path.split('.') {
        current = current.get_key_mut(segment)?;
    }
    Some(current)
}

/// Sets the value at a given path, creating parents as necessary.
///
/// A missing or scalar intermediate is replaced by an empty map before
/// descending. The final segment is assigned `value` whatever was there.
/// Numeric segments index into existing lists, padding them with `Undefined`
/// when needed. Returns the same object.
pub fn set_path<'a>(obj: &'a mut Value, path: &str, value: Value) -> &'a mut Value {
    let (parents, last) = split_last(path);
    let mut current = &mut *obj;
    if let Some(parents) = parents {
        for segment in parents.split('.') {
            let slot = current.slot_mut(segment);
            if slot.is_scalar() {
                *slot = Value::Map(Map::new());
            }
            current = slot;
        }
    }
    *current.slot_mut(last) = value;
    obj
}

/// Deletes the value at a given path.
///
/// Does nothing when an intermediate is missing or scalar. Deleting a list
/// element leaves an `Undefined` hole. Returns the same object.
pub fn delete_path<'a>(obj: &'a mut Value, path: &str) -> &'a mut Value {
    let (parents, last) = split_last(path);
    let parent = match parents {
        Some(parents) => walk_collections(&mut *obj, parents),
        None => Some(&mut *obj),
    };
    if let Some(parent) = parent {
        parent.remove_key(last);
    }
    obj
}

fn walk_collections<'a>(obj: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = obj;
    for segment in path.split('.') {
        let next = current.get_key_mut(segment)?;
        if next.is_scalar() {
            return None;
        }
        current = next;
    }
    Some(current)
}
