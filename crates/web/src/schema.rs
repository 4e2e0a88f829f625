//! Declared parameter schemas.
//!
//! Every endpoint carries an ordered list of [`Param`]s describing the arguments its handler
//! expects. Structured parameters refer to a [`ModelSchema`], whose fields use the same shape
//! and may nest further models or lists.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// The declared type of a parameter or model field.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    Str,
    Int,
    Float,
    Bool,
    Bytes,
    Any,
    List(Box<ParamType>),
    Model(Arc<ModelSchema>),
}

impl ParamType {
    pub fn list(inner: ParamType) -> Self {
        ParamType::List(Box::new(inner))
    }

    pub fn model(schema: ModelSchema) -> Self {
        ParamType::Model(Arc::new(schema))
    }

    /// The name used in error bodies: `str`, `int`, `list[int]`, a model's name, ...
    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn as_model(&self) -> Option<&ModelSchema> {
        match self {
            ParamType::Model(schema) => Some(schema),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Str => f.write_str("str"),
            ParamType::Int => f.write_str("int"),
            ParamType::Float => f.write_str("float"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::Any => f.write_str("any"),
            ParamType::List(inner) => write!(f, "list[{inner}]"),
            ParamType::Model(schema) => f.write_str(schema.name()),
        }
    }
}

/// How an absent argument is treated.
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    Required,
    /// Absent binds `Null`
    Optional,
    /// Absent binds the given value
    Default(Value),
}

/// A declared handler parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    ty: ParamType,
    requirement: Requirement,
}

/// Model fields have the same shape as handler parameters.
pub type Field = Param;

impl Param {
    pub fn required(name: impl Into<String>, ty: ParamType) -> Self {
        Self { name: name.into(), ty, requirement: Requirement::Required }
    }

    pub fn optional(name: impl Into<String>, ty: ParamType) -> Self {
        Self { name: name.into(), ty, requirement: Requirement::Optional }
    }

    pub fn with_default(name: impl Into<String>, ty: ParamType, default: impl Into<Value>) -> Self {
        Self { name: name.into(), ty, requirement: Requirement::Default(default.into()) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    pub fn is_required(&self) -> bool {
        matches!(self.requirement, Requirement::Required)
    }

    /// The value bound when the argument is absent, `None` if it is required
    pub fn absent_value(&self) -> Option<Value> {
        match &self.requirement {
            Requirement::Required => None,
            Requirement::Optional => Some(Value::Null),
            Requirement::Default(value) => Some(value.clone()),
        }
    }
}

/// A named structured type with ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    name: String,
    fields: Vec<Field>,
}

impl ModelSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}
