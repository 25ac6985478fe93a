//! Equality and copy operations over value trees.
//!
//! Trees must be acyclic. Owned `Value` trees cannot form cycles, so the
//! recursion depth is bounded by the depth of the tree.

use super::value::{Map, Value, UNDEFINED};

/// Returns true if the value is not a collection.
pub fn is_scalar(value: &Value) -> bool {
    value.is_scalar()
}

/// Checks whether two scalar values are equal.
///
/// Dates compare by instant and callables by identity. The two numeric
/// variants compare by numeric value; `NaN` equals nothing. No other kinds are
/// coerced, so `0`, `null` and `undefined` are all distinct. Collections are
/// only equal to the very same reference; use [`deep_equals`] to compare them
/// structurally.
pub fn scalar_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Date(x), Value::Date(y)) => x == y,
        (Value::Function(x), Value::Function(y)) => x.ptr_eq(y),
        (Value::List(_), Value::List(_)) | (Value::Map(_), Value::Map(_)) => std::ptr::eq(a, b),
        _ => false,
    }
}

/// Checks for deep structural equality between two values.
///
/// Lists must match element-wise in order. Maps must agree on every key
/// present on either side, with a missing key reading as `Undefined`; key
/// order is ignored. A list never equals a map.
pub fn deep_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| deep_equals(p, q))
        }
        (Value::Map(x), Value::Map(y)) => map_equals(x, y),
        _ if a.is_scalar() && b.is_scalar() => scalar_equals(a, b),
        _ => false,
    }
}

fn map_equals(a: &Map, b: &Map) -> bool {
    fn covered(from: &Map, to: &Map) -> bool {
        from.iter()
            .all(|(key, value)| deep_equals(value, to.get(key).unwrap_or(&UNDEFINED)))
    }
    covered(a, b) && covered(b, a)
}

/// Same-value-zero comparison: like [`deep_equals`] but `NaN` equals `NaN`.
pub(crate) fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) if x.is_nan() && y.is_nan() => true,
        _ => deep_equals(a, b),
    }
}

/// Returns a deep copy of the given value.
///
/// Collections are rebuilt at every depth, so the copy shares no storage with
/// the input. Scalars are opaque: a copied callable still refers to the same
/// function.
pub fn deep_copy(value: &Value) -> Value {
    match value {
        Value::List(items) => Value::List(items.iter().map(deep_copy).collect()),
        Value::Map(map) => Value::Map(
            map.iter()
                .map(|(key, child)| (key.clone(), deep_copy(child)))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep_equals(self, other)
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        map_equals(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Callable;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn date(s: &str) -> Value {
        Value::Date(s.parse::<DateTime<Utc>>().unwrap())
    }

    fn map(entries: Vec<(&str, Value)>) -> Value {
        Value::Map(entries.into_iter().collect())
    }

    #[test]
    fn test_is_scalar() {
        assert!(is_scalar(&Value::Bool(true)));
        assert!(is_scalar(&Value::Bool(false)));
        assert!(is_scalar(&date("2014-01-01T00:00:00Z")));
        assert!(is_scalar(&Value::Int(123)));
        assert!(is_scalar(&Value::Null));
        assert!(is_scalar(&Value::Undefined));
        assert!(is_scalar(&Value::Function(Callable::new(|_| Value::Null))));

        assert!(!is_scalar(&Value::Map(Map::new())));
        assert!(!is_scalar(&Value::List(vec![])));
    }

    #[test]
    fn test_scalar_equals_dates() {
        let date1 = date("2014-01-01T00:00:00Z");
        let date2 = date("2014-01-01T00:00:00Z");
        let date3 = date("2014-01-01T00:00:01Z");
        assert!(scalar_equals(&date1, &date2));
        assert!(!scalar_equals(&date2, &date3));
    }

    #[test]
    fn test_scalar_equals_other_types() {
        let func = Value::Function(Callable::new(|_| Value::Null));
        let obj = Value::Map(Map::new());
        assert!(scalar_equals(&Value::Int(2), &Value::Int(2)));
        assert!(scalar_equals(&Value::Int(2), &Value::Float(2.0)));
        assert!(scalar_equals(&Value::Bool(true), &Value::Bool(true)));
        assert!(scalar_equals(&Value::Null, &Value::Null));
        assert!(scalar_equals(&Value::Undefined, &Value::Undefined));
        assert!(!scalar_equals(&Value::Int(0), &Value::Null));
        assert!(!scalar_equals(&Value::Null, &Value::Undefined));
        assert!(!scalar_equals(&Value::Float(f64::NAN), &Value::Float(f64::NAN)));
        assert!(scalar_equals(&obj, &obj));
        assert!(scalar_equals(&func, &func.clone()));
        assert!(!scalar_equals(&obj, &func));
        assert!(!scalar_equals(&Value::Map(Map::new()), &Value::Map(Map::new())));
    }

    #[test]
    fn test_deep_equals_dates() {
        let date1 = date("2014-01-01T00:00:00Z");
        let date2 = date("2014-01-01T00:00:00Z");
        let date3 = date("2014-01-01T00:00:01Z");
        assert!(deep_equals(&date1, &date2));
        assert!(!deep_equals(&date2, &date3));
        assert!(deep_equals(
            &map(vec![("d", date1.clone())]),
            &map(vec![("d", date2.clone())])
        ));
    }

    #[test]
    fn test_deep_equals_objects() {
        let obj1 = Value::from(json!({ "foo": { "bar": "baz", "biz": [1, 2] } }));
        let obj2 = Value::from(json!({ "foo": { "bar": "baz", "biz": [1, 2] } }));
        let obj3 = Value::from(json!({ "foo": { "bar": "biz" }, "biz": [1, 2] }));
        let obj4 = Value::from(json!({ "foo": { "bar": "biz" }, "biz": [1] }));
        assert!(deep_equals(&obj1, &obj2));
        assert!(!deep_equals(&obj2, &obj3));
        assert!(!deep_equals(&obj3, &obj4));
    }

    #[test]
    fn test_deep_equals_does_not_coerce_types() {
        assert!(deep_equals(
            &map(vec![("a", Value::Null)]),
            &map(vec![("a", Value::Null)])
        ));
        assert!(deep_equals(
            &map(vec![("a", Value::Undefined)]),
            &map(vec![("a", Value::Undefined)])
        ));
        assert!(!deep_equals(
            &map(vec![("a", Value::Null)]),
            &map(vec![("a", Value::Undefined)])
        ));
        assert!(!deep_equals(
            &map(vec![("a", Value::Int(0))]),
            &map(vec![("a", Value::Null)])
        ));
    }

    #[test]
    fn test_deep_equals_missing_key_reads_as_undefined() {
        assert!(deep_equals(&map(vec![("a", Value::Undefined)]), &map(vec![])));
        assert!(!deep_equals(&map(vec![("a", Value::Null)]), &map(vec![])));
    }

    #[test]
    fn test_deep_equals_ignores_key_order_but_not_list_order() {
        let a = Value::from(json!({ "x": 1, "y": 2 }));
        let b = Value::from(json!({ "y": 2, "x": 1 }));
        assert!(deep_equals(&a, &b));
        assert!(!deep_equals(&Value::from(json!([1, 2])), &Value::from(json!([2, 1]))));
    }

    #[test]
    fn test_deep_equals_mixed_shapes() {
        assert!(!deep_equals(&Value::from(json!([])), &Value::from(json!({}))));
        assert!(!deep_equals(&Value::from(json!({})), &Value::Null));
        assert!(!deep_equals(&Value::Undefined, &Value::from(json!([]))));
    }

    #[test]
    fn test_deep_copy() {
        let func = Callable::new(|_| Value::Null);
        let original = map(vec![
            ("foo", Value::from("bar")),
            ("fuzz", Value::Int(123)),
            (
                "biz",
                map(vec![
                    ("dat", date("2014-01-01T00:00:00Z")),
                    ("n", Value::Null),
                    ("u", Value::Undefined),
                    ("f", Value::Function(func.clone())),
                ]),
            ),
            ("arr", Value::from(json!([1, 2]))),
        ]);

        let mut copy = deep_copy(&original);
        assert!(deep_equals(&copy, &original));

        let original_arr = original.get_key("arr").and_then(Value::as_list).unwrap();
        let copied_arr = copy.get_key("arr").and_then(Value::as_list).unwrap();
        assert_ne!(original_arr.as_ptr(), copied_arr.as_ptr());

        let copied_func = copy
            .get_key("biz")
            .and_then(|biz| biz.get_key("f"))
            .and_then(Value::as_function)
            .unwrap();
        assert!(copied_func.ptr_eq(&func));

        *copy.get_key_mut("biz").unwrap().get_key_mut("dat").unwrap() = Value::Int(123);
        assert!(!deep_equals(&copy, &original));
    }
}
