//! Core value types and operations.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fieldpath::parse_index;

/// The canonical absent value, handed out wherever a lookup misses.
pub(crate) static UNDEFINED: Value = Value::Undefined;

/// Largest length an array-like mapping may claim when coerced to a list.
const MAX_ARRAY_LIKE_LENGTH: usize = u32::MAX as usize;

/// Highest list index a write may pad up to. Larger indices turn the list into
/// an index-keyed map instead of allocating the gap.
const MAX_LIST_INDEX: usize = 1 << 20;

/// Value represents any node of a plain data tree.
///
/// `List` and `Map` are collections and are compared structurally; every other
/// variant is an opaque scalar.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The absent value. Distinct from `Null`.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A point in time, compared by instant.
    Date(DateTime<Utc>),
    /// An opaque callable, compared by identity.
    Function(Callable),
    List(Vec<Value>),
    Map(Map),
}

/// Shape is the structural classification of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar,
    Sequence,
    Mapping,
}

/// Callable is a shareable function value.
///
/// Cloning a callable shares the underlying function, so copies stay
/// identical under [`crate::scalar_equals`].
#[derive(Clone)]
pub struct Callable(Arc<dyn Fn(&[Value]) -> Value + Send + Sync>);

impl Callable {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Callable(Arc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    /// Returns true if both handles point at the same function.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[Function]")
    }
}

/// Map represents a key-value map where keys are strings.
///
/// Keys keep their insertion order. The order is visible when iterating but is
/// ignored by equality.
#[derive(Debug, Clone, Default)]
pub struct Map {
    pub fields: IndexMap<String, Value>,
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Value::Date(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Returns true for every value that is not a list or a map.
    pub fn is_scalar(&self) -> bool {
        self.shape() == Shape::Scalar
    }

    /// Returns true for lists and maps.
    pub fn is_collection(&self) -> bool {
        !self.is_scalar()
    }

    pub fn shape(&self) -> Shape {
        match self {
            Value::List(_) => Shape::Sequence,
            Value::Map(_) => Shape::Mapping,
            _ => Shape::Scalar,
        }
    }

    /// Short name of the variant, used in log output.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Function(_) => "function",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns either numeric variant as a float.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Callable> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up one level below this value.
    ///
    /// Maps are indexed by key, lists by a canonical decimal index. Scalars
    /// have no children.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            Value::List(list) => parse_index(key).and_then(|i| list.get(i)),
            _ => None,
        }
    }

    pub fn get_key_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Value::Map(map) => map.get_mut(key),
            Value::List(list) => parse_index(key).and_then(|i| list.get_mut(i)),
            _ => None,
        }
    }

    /// Returns the own keys of a collection with their values, in order.
    ///
    /// List keys are the indices rendered as strings. Scalars have none.
    pub fn own_entries(&self) -> Vec<(Cow<'_, str>, &Value)> {
        match self {
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| (Cow::Borrowed(k.as_str()), v))
                .collect(),
            Value::List(list) => list
                .iter()
                .enumerate()
                .map(|(i, v)| (Cow::Owned(i.to_string()), v))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn own_keys(&self) -> Vec<String> {
        self.own_entries()
            .into_iter()
            .map(|(k, _)| k.into_owned())
            .collect()
    }

    /// Removes a child and returns it.
    ///
    /// Removing from a list leaves an `Undefined` hole so later indices keep
    /// their position.
    pub fn remove_key(&mut self, key: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.delete(key),
            Value::List(list) => {
                let index = parse_index(key)?;
                list.get_mut(index).map(std::mem::take)
            }
            _ => None,
        }
    }

    /// Returns a writable slot for `key`, creating it when missing.
    ///
    /// Lists grow with `Undefined` padding to reach an index up to
    /// `MAX_LIST_INDEX`. A non-index key or a larger index turns a list into an
    /// index-keyed map, and a scalar becomes an empty map.
    pub(crate) fn slot_mut(&mut self, key: &str) -> &mut Value {
        let list_index = parse_index(key).filter(|index| *index <= MAX_LIST_INDEX);
        let is_list_slot = matches!(self, Value::List(_)) && list_index.is_some();
        if !is_list_slot && !matches!(self, Value::Map(_)) {
            self.coerce_to_map();
            return self.slot_mut(key);
        }
        match self {
            Value::List(list) => {
                let index = list_index.unwrap_or_default();
                if index >= list.len() {
                    list.resize(index + 1, Value::Undefined);
                }
                &mut list[index]
            }
            Value::Map(map) => map.fields.entry(key.to_string()).or_default(),
            _ => unreachable!("non-collection values are coerced to maps above"),
        }
    }

    /// Returns an empty collection of the same shape, or `Undefined` for scalars.
    pub(crate) fn empty_like(&self) -> Value {
        match self {
            Value::List(_) => Value::List(Vec::new()),
            Value::Map(_) => Value::Map(Map::new()),
            _ => Value::Undefined,
        }
    }

    /// Turns this value into a map in place.
    ///
    /// A list keeps its elements under their index keys; scalars are dropped.
    pub(crate) fn coerce_to_map(&mut self) {
        let map = match std::mem::take(self) {
            Value::Map(map) => map,
            Value::List(list) => list
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => Map::new(),
        };
        *self = Value::Map(map);
    }

    /// Turns this value into a list in place.
    ///
    /// A map with a numeric `length` field is array-like and contributes the
    /// entries at keys `0..length`; any other map contributes its values in
    /// order. Scalars are dropped.
    pub(crate) fn coerce_to_list(&mut self) {
        let list = match std::mem::take(self) {
            Value::List(list) => list,
            Value::Map(map) => map_into_list(map),
            _ => Vec::new(),
        };
        *self = Value::List(list);
    }

    /// Returns false for values that have no serialized form inside a map.
    fn is_serialized(&self) -> bool {
        !matches!(self, Value::Undefined | Value::Function(_))
    }
}

fn map_into_list(mut map: Map) -> Vec<Value> {
    match map.get("length").and_then(array_like_length) {
        Some(length) => (0..length)
            .map(|i| map.fields.swap_remove(&i.to_string()).unwrap_or_default())
            .collect(),
        None => map.fields.into_values().collect(),
    }
}

fn array_like_length(length: &Value) -> Option<usize> {
    let length = match length {
        Value::Int(n) => usize::try_from(*n).ok()?,
        Value::Float(f) if f.is_finite() && f.fract() == 0.0 && *f >= 0.0 => *f as usize,
        _ => return None,
    };
    (length <= MAX_ARRAY_LIKE_LENGTH).then_some(length)
}

impl Map {
    pub fn new() -> Self {
        Map {
            fields: IndexMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    /// Sets a field, returning the previous value. Existing keys keep their position.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Removes a field, preserving the order of the remaining keys.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.fields.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.values()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Map {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Callable> for Value {
    fn from(f: Callable) -> Self {
        Value::Function(f)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(list)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null | Value::Function(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(d) => {
                serializer.serialize_str(&d.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::List(items) => serializer.collect_seq(items),
            Value::Map(map) => map.serialize(serializer),
        }
    }
}

impl Serialize for Map {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().filter(|(_, v)| v.is_serialized()))
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON or YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Value, A::Error> {
        let mut map = Map::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.set(key, value);
        }
        Ok(Value::Map(map))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Parse a value from JSON.
pub fn from_json(json: &str) -> Result<Value> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize a value to JSON.
pub fn to_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Serialize a value to indented JSON.
pub fn to_json_pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Parse a value from YAML. JSON input is accepted as well.
pub fn from_yaml(yaml: &str) -> Result<Value> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Serialize a value to YAML.
pub fn to_yaml(value: &Value) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Read a JSON or YAML document from disk.
pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
    from_yaml(&content)
}
