//! Equality queries against documents.

use crate::fieldpath::collapse_to_dotted;
use crate::value::{deep_equals, Value, UNDEFINED};

/// Returns whether the document matches every field of the query.
///
/// Both sides are expected in dotted form. Each query key must map to a
/// deep-equal value in the document; document keys the query does not
/// mention are ignored. A `true` query only matches a `true` document, and a
/// scalar on either side falls back to [`deep_equals`].
pub fn match_dotted_object(doc: &Value, query: &Value) -> bool {
    if matches!(query, Value::Bool(true)) {
        return matches!(doc, Value::Bool(true));
    }
    if query.is_scalar() || doc.is_scalar() {
        return deep_equals(query, doc);
    }
    query.own_entries().into_iter().all(|(key, expected)| {
        deep_equals(doc.get_key(&key).unwrap_or(&UNDEFINED), expected)
    })
}

/// Same as [`match_dotted_object`], but accepts structured documents and
/// queries.
///
/// Both sides are collapsed to dotted form first, so `{ bar: { biz: 12 } }`
/// and `{ "bar.biz": 12 }` are interchangeable queries.
pub fn match_object(doc: &Value, query: &Value) -> bool {
    match_dotted_object(
        &Value::Map(collapse_to_dotted(doc)),
        &Value::Map(collapse_to_dotted(query)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        Value::from(json!({ "foo": "foo", "bar": { "biz": 12 }, "zip": [4, 5] }))
    }

    #[test]
    fn test_match_object() {
        assert!(match_object(
            &doc(),
            &Value::from(json!({ "foo": "foo", "bar.biz": 12, "zip.1": 5 }))
        ));
        assert!(!match_object(
            &doc(),
            &Value::from(json!({ "foo": "foo", "bar.biz": 12, "zip.2": 5 }))
        ));
    }

    #[test]
    fn test_match_object_nested_query() {
        assert!(match_object(&doc(), &Value::from(json!({ "bar": { "biz": 12 } }))));
        assert!(!match_object(&doc(), &Value::from(json!({ "bar": { "biz": 13 } }))));
        assert!(match_object(&doc(), &Value::from(json!({}))));
    }

    #[test]
    fn test_match_dotted_object() {
        assert!(match_dotted_object(
            &doc(),
            &Value::from(json!({ "foo": "foo", "bar": { "biz": 12 }, "zip": [4, 5] }))
        ));
        assert!(!match_dotted_object(
            &doc(),
            &Value::from(json!({ "foo": "foo", "bar": { "biz": 12 }, "zip": [4, 2] }))
        ));
    }

    #[test]
    fn test_match_dotted_object_scalars() {
        assert!(match_dotted_object(&Value::Bool(true), &Value::Bool(true)));
        assert!(!match_dotted_object(&doc(), &Value::Bool(true)));
        assert!(match_dotted_object(&Value::Int(3), &Value::Int(3)));
        assert!(!match_dotted_object(&Value::Int(3), &Value::Null));
        assert!(!match_dotted_object(&Value::Null, &Value::from(json!({}))));
    }

    #[test]
    fn test_match_does_not_coerce() {
        let doc = Value::from(json!({ "a": 0 }));
        assert!(!match_dotted_object(&doc, &Value::from(json!({ "a": null }))));
        assert!(!match_dotted_object(&doc, &Value::from(json!({ "b": null }))));
    }
}
