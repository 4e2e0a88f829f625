//! Model validation.
//!
//! Structured parameters are validated through the [`ModelValidator`] capability so that
//! applications can plug in their own rules. [`SchemaValidator`] is the default: it checks
//! every field of a [`ModelSchema`] and reports all failures at once, each with the path of
//! the offending field.

use serde::Serialize;

use crate::extract::convert;
use crate::schema::{ModelSchema, ParamType};
use crate::value::{Arguments, Model, Value};

/// One step of a field path: a mapping key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathItem {
    Key(String),
    Index(usize),
}

impl From<&str> for PathItem {
    fn from(key: &str) -> Self {
        PathItem::Key(key.to_owned())
    }
}

impl From<usize> for PathItem {
    fn from(index: usize) -> Self {
        PathItem::Index(index)
    }
}

/// A single validation failure, serialized as `{"loc": [...], "msg": "...", "type": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<PathItem>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: Vec<PathItem>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { loc, msg: msg.into(), kind: kind.into() }
    }

    pub fn missing(loc: Vec<PathItem>) -> Self {
        Self::new(loc, "field required", "value_error.missing")
    }

    /// The type error reported when a value can't be read as `ty`
    pub fn invalid_type(loc: Vec<PathItem>, ty: &ParamType) -> Self {
        let (msg, kind) = match ty {
            ParamType::Int => ("value is not a valid integer", "type_error.integer"),
            ParamType::Float => ("value is not a valid float", "type_error.float"),
            ParamType::Bool => ("value could not be parsed to a boolean", "type_error.bool"),
            ParamType::Str => ("str type expected", "type_error.str"),
            ParamType::Bytes => ("byte type expected", "type_error.bytes"),
            ParamType::List(_) => ("value is not a valid list", "type_error.list"),
            ParamType::Model(_) => ("value is not a valid dict", "type_error.dict"),
            ParamType::Any => ("value is not valid", "type_error"),
        };
        Self::new(loc, msg, kind)
    }
}

/// Validates a raw argument mapping against a model schema.
#[cfg_attr(test, mockall::automock)]
pub trait ModelValidator: Send + Sync {
    fn validate(&self, schema: &ModelSchema, raw: &Arguments) -> Result<Model, Vec<FieldError>>;
}

/// The default schema-driven validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl ModelValidator for SchemaValidator {
    fn validate(&self, schema: &ModelSchema, raw: &Arguments) -> Result<Model, Vec<FieldError>> {
        let mut errors = Vec::new();
        let model = check_model(schema, raw, &[], &mut errors);
        if errors.is_empty() { Ok(model) } else { Err(errors) }
    }
}

fn check_model(schema: &ModelSchema, raw: &Arguments, loc: &[PathItem], errors: &mut Vec<FieldError>) -> Model {
    let mut model = Model::new(schema.name());

    for field in schema.fields() {
        let field_loc = extend(loc, PathItem::Key(field.name().to_owned()));
        let value = match raw.get_present(field.name()) {
            Some(value) => check_value(value, field.ty(), &field_loc, errors),
            None => field.absent_value().unwrap_or_else(|| {
                errors.push(FieldError::missing(field_loc));
                Value::Null
            }),
        };
        model.set(field.name(), value);
    }

    model
}

fn check_value(value: &Value, ty: &ParamType, loc: &[PathItem], errors: &mut Vec<FieldError>) -> Value {
    match ty {
        ParamType::Model(schema) => match mapping_of(value) {
            Some(nested) => Value::Model(check_model(schema, &nested, loc, errors)),
            None => {
                errors.push(FieldError::invalid_type(loc.to_vec(), ty));
                Value::Null
            }
        },
        ParamType::List(inner) => match convert::elements(value) {
            Some(items) => Value::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| check_value(item, inner, &extend(loc, PathItem::Index(index)), errors))
                    .collect(),
            ),
            None => {
                errors.push(FieldError::invalid_type(loc.to_vec(), ty));
                Value::Null
            }
        },
        scalar => convert::scalar(value, scalar).unwrap_or_else(|| {
            errors.push(FieldError::invalid_type(loc.to_vec(), scalar));
            Value::Null
        }),
    }
}

/// Reads a value as a field mapping: a JSON object or an already validated model.
pub(crate) fn mapping_of(value: &Value) -> Option<Arguments> {
    match value {
        Value::Json(serde_json::Value::Object(object)) => Some(Arguments::from_json_object(object.clone())),
        Value::Model(model) => Some(model.fields().map(|(name, value)| (name.to_owned(), value.clone())).collect()),
        _ => None,
    }
}

fn extend(loc: &[PathItem], item: PathItem) -> Vec<PathItem> {
    let mut path = Vec::with_capacity(loc.len() + 1);
    path.extend_from_slice(loc);
    path.push(item);
    path
}
