//! Dynamic argument values.
//!
//! Raw request data (query pairs, path captures, decoded body fields) and resolved handler
//! arguments share one representation: [`Value`], collected by name into [`Arguments`].
//! Handlers read typed values back with [`Arguments::get_as`] and [`Arguments::model`].

use std::collections::HashMap;
use std::collections::hash_map;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// A raw or resolved argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Bytes),
    List(Vec<Value>),
    /// A value taken verbatim from a JSON body
    Json(serde_json::Value),
    /// A validated structured value
    Model(Model),
}

impl Value {
    /// Returns true for `Null` and JSON `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::Json(serde_json::Value::Null))
    }

    /// Returns the text if this value is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Json(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Converts the value into JSON.
    ///
    /// Byte payloads render as (lossy) UTF-8 strings and non-finite floats as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f).map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()),
            Value::List(values) => serde_json::Value::Array(values.iter().map(Value::to_json).collect()),
            Value::Json(json) => json.clone(),
            Value::Model(model) => model.to_json(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Bytes(value)
    }
}

impl From<Model> for Value {
    fn from(value: Model) -> Self {
        Value::Model(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Json(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(option: Option<T>) -> Self {
        option.map_or(Value::Null, Into::into)
    }
}

/// A validated structured value: the schema name and its fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    fields: Vec<(String, Value)>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    /// Appends a field, replacing an earlier field with the same name
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(name, _)| name == field).map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The field mapping as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        let map = self.fields.iter().map(|(name, value)| (name.clone(), value.to_json())).collect();
        serde_json::Value::Object(map)
    }

    /// Decodes the field mapping into a typed struct
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[derive(Error, Debug)]
pub enum ArgumentError {
    #[error("argument `{name}` is not a valid {expected}")]
    Mismatch { name: String, expected: &'static str },

    #[error("argument `{name}` can't be decoded: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Types that can be read back from a [`Value`].
pub trait FromValue: Sized {
    /// Type name used in error messages
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "str";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            Value::Json(json) => json.as_i64(),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    #[allow(clippy::cast_precision_loss, reason = "integers are accepted where floats are expected")]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Json(json) => json.as_f64(),
            _ => None,
        }
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Json(json) => json.as_bool(),
            _ => None,
        }
    }
}

impl FromValue for Bytes {
    const EXPECTED: &'static str = "bytes";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bytes(bytes) => Some(bytes.clone()),
            Value::Str(s) | Value::Json(serde_json::Value::String(s)) => Some(Bytes::from(s.clone())),
            _ => None,
        }
    }
}

impl FromValue for Model {
    const EXPECTED: &'static str = "model";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Model(model) => Some(model.clone()),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() { Some(None) } else { T::from_value(value).map(Some) }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(values) => values.iter().map(T::from_value).collect(),
            Value::Json(serde_json::Value::Array(values)) => {
                values.iter().map(|json| T::from_value(&Value::Json(json.clone()))).collect()
            }
            _ => None,
        }
    }
}

/// Named argument values, either raw (merged request sources) or resolved (handler input).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    inner: HashMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spreads the top-level keys of a JSON object
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        object.into_iter().map(|(key, json)| (key, Value::Json(json))).collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.inner.get(name)
    }

    /// Returns the value unless it is absent or null
    pub fn get_present(&self, name: &str) -> Option<&Value> {
        self.inner.get(name).filter(|value| !value.is_null())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.inner.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Merges `other` into `self`; on key collision the value from `other` wins.
    pub fn merge(&mut self, other: Arguments) {
        self.inner.extend(other.inner);
    }

    /// Reads a typed value; an absent argument reads as `Null`, so `Option<T>` yields `None`.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T, ArgumentError> {
        let value = self.inner.get(name).unwrap_or(&Value::Null);
        T::from_value(value).ok_or_else(|| ArgumentError::Mismatch { name: name.to_owned(), expected: T::EXPECTED })
    }

    /// Decodes a structured argument (a validated model or a JSON value) into `T`.
    pub fn model<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArgumentError> {
        let json = match self.inner.get(name) {
            Some(Value::Model(model)) => model.to_json(),
            Some(Value::Json(json)) => json.clone(),
            _ => return Err(ArgumentError::Mismatch { name: name.to_owned(), expected: "model" }),
        };

        serde_json::from_value(json).map_err(|source| ArgumentError::Decode { name: name.to_owned(), source })
    }
}

impl FromIterator<(String, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self { inner: iter.into_iter().collect() }
    }
}

impl IntoIterator for Arguments {
    type Item = (String, Value);
    type IntoIter = hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}
