//! Argument resolution.
//!
//! Raw arguments are collected from three sources and merged with a fixed precedence:
//! query string, then path captures, then the decoded body, a later source winning on a
//! name collision. [`resolve_arguments`] then binds the merged mapping to an endpoint's
//! declared parameters, in declaration order, stopping at the first failure.
//!
//! # Example
//! ```
//! # use lite_web::extract::resolve_arguments;
//! # use lite_web::schema::{Param, ParamType};
//! # use lite_web::validate::SchemaValidator;
//! # use lite_web::value::{Arguments, Value};
//! let params = [Param::required("x", ParamType::Int), Param::optional("y", ParamType::Str)];
//!
//! let mut raw = Arguments::new();
//! raw.insert("x", "42");
//!
//! let args = resolve_arguments(&params, &raw, &SchemaValidator).unwrap();
//! assert_eq!(args.get("x"), Some(&Value::Int(42)));
//! assert_eq!(args.get("y"), Some(&Value::Null));
//! ```

mod body;
pub(crate) mod convert;
mod multipart;
mod query;

pub use body::{decode_body, read_body};
pub use multipart::parse_multipart;
pub use query::parse_query;

use crate::error::ParseError;
use crate::schema::{Param, ParamType};
use crate::validate::{FieldError, ModelValidator, mapping_of};
use crate::value::{Arguments, Value};

/// Binds `raw` to the declared `params`.
///
/// Structured parameters are validated from the whole raw mapping, every other parameter
/// is looked up by name and converted to its declared type.
pub fn resolve_arguments(
    params: &[Param],
    raw: &Arguments,
    validator: &dyn ModelValidator,
) -> Result<Arguments, ParseError> {
    let mut resolved = Arguments::new();

    for param in params {
        let value = match param.ty() {
            ParamType::Model(schema) => {
                let absent = schema.fields().iter().all(|field| raw.get_present(field.name()).is_none());
                if absent && !param.is_required() {
                    param.absent_value().unwrap_or(Value::Null)
                } else {
                    validator.validate(schema, raw).map(Value::Model).map_err(ParseError::validation_failed)?
                }
            }
            ParamType::Bytes => match raw.get_present(param.name()) {
                Some(value) => convert::verbatim_bytes(value),
                None => param.absent_value().unwrap_or(Value::Null),
            },
            ty => match raw.get_present(param.name()) {
                None => param
                    .absent_value()
                    .ok_or_else(|| ParseError::missing_required(param.name(), ty))?,
                Some(value) => coerce(value, ty, validator).map_err(|e| match e {
                    CoerceError::Mismatch => ParseError::conversion_failed(param.name(), ty, value.to_json()),
                    CoerceError::Invalid(errors) => ParseError::validation_failed(errors),
                })?,
            },
        };

        resolved.insert(param.name(), value);
    }

    Ok(resolved)
}

enum CoerceError {
    Mismatch,
    Invalid(Vec<FieldError>),
}

fn coerce(value: &Value, ty: &ParamType, validator: &dyn ModelValidator) -> Result<Value, CoerceError> {
    match ty {
        ParamType::Model(schema) => {
            let mapping = mapping_of(value).ok_or(CoerceError::Mismatch)?;
            validator.validate(schema, &mapping).map(Value::Model).map_err(CoerceError::Invalid)
        }
        ParamType::List(inner) => convert::elements(value)
            .ok_or(CoerceError::Mismatch)?
            .iter()
            .map(|item| coerce(item, inner, validator))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        scalar => convert::scalar(value, scalar).ok_or(CoerceError::Mismatch),
    }
}
