//! Coercion of raw values into declared scalar types.
//!
//! Raw values come either as text (query strings, path captures, form parts) or as JSON
//! taken from a body. Both are accepted for every scalar type.

use bytes::Bytes;

use crate::schema::ParamType;
use crate::value::Value;

/// Converts `value` to the scalar type `ty`.
///
/// A multi-valued raw value converts its last element. Returns `None` when the value
/// can't be read as `ty`, and always for list and model types.
pub(crate) fn scalar(value: &Value, ty: &ParamType) -> Option<Value> {
    let value = last(value)?;

    match ty {
        ParamType::Any => Some(value),
        ParamType::Int => to_int(&value).map(Value::Int),
        ParamType::Float => to_float(&value).map(Value::Float),
        ParamType::Bool => to_bool(&value).map(Value::Bool),
        ParamType::Str => to_str(&value).map(Value::Str),
        ParamType::Bytes => match value {
            Value::Bytes(bytes) => Some(Value::Bytes(bytes)),
            Value::Str(s) | Value::Json(serde_json::Value::String(s)) => Some(Value::Bytes(Bytes::from(s))),
            _ => None,
        },
        ParamType::List(_) | ParamType::Model(_) => None,
    }
}

/// Reads a value as a sequence; a single value becomes a one-element list.
pub(crate) fn elements(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::List(values) => Some(values.clone()),
        Value::Json(serde_json::Value::Array(values)) => Some(values.iter().cloned().map(Value::Json).collect()),
        Value::Json(serde_json::Value::Object(_)) | Value::Model(_) => None,
        other => Some(vec![other.clone()]),
    }
}

/// Binds a byte parameter verbatim; text becomes its UTF-8 bytes.
pub(crate) fn verbatim_bytes(value: &Value) -> Value {
    match value {
        Value::Str(s) | Value::Json(serde_json::Value::String(s)) => Value::Bytes(Bytes::from(s.clone())),
        other => other.clone(),
    }
}

/// Parses the accepted boolean spellings, case-insensitively.
pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn last(value: &Value) -> Option<Value> {
    match value {
        Value::List(values) => values.last().cloned(),
        Value::Json(serde_json::Value::Array(values)) => values.last().cloned().map(Value::Json),
        other => Some(other.clone()),
    }
}

fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Str(s) | Value::Json(serde_json::Value::String(s)) => s.trim().parse().ok(),
        Value::Json(serde_json::Value::Number(n)) => n.as_i64(),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss, reason = "integers are accepted where floats are expected")]
fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::Str(s) | Value::Json(serde_json::Value::String(s)) => s.trim().parse().ok(),
        Value::Json(serde_json::Value::Number(n)) => n.as_f64(),
        _ => None,
    }
}

fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) | Value::Json(serde_json::Value::Bool(b)) => Some(*b),
        Value::Int(0) => Some(false),
        Value::Int(1) => Some(true),
        Value::Str(s) | Value::Json(serde_json::Value::String(s)) => parse_bool(s),
        Value::Json(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn to_str(value: &Value) -> Option<String> {
    match value {
        Value::Str(s) | Value::Json(serde_json::Value::String(s)) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Json(json @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => Some(json.to_string()),
        Value::Bytes(bytes) => std::str::from_utf8(bytes).ok().map(str::to_owned),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn int_from_text_and_json() {
        assert_eq!(scalar(&Value::from(" 42 "), &ParamType::Int), Some(Value::Int(42)));
        assert_eq!(scalar(&Value::Json(json!(-7)), &ParamType::Int), Some(Value::Int(-7)));
        assert_eq!(scalar(&Value::from("abc"), &ParamType::Int), None);
        assert_eq!(scalar(&Value::Json(json!(1.5)), &ParamType::Int), None);
    }

    #[test]
    fn float_accepts_integers() {
        assert_eq!(scalar(&Value::from("2.5"), &ParamType::Float), Some(Value::Float(2.5)));
        assert_eq!(scalar(&Value::Json(json!(3)), &ParamType::Float), Some(Value::Float(3.0)));
        assert_eq!(scalar(&Value::from("x"), &ParamType::Float), None);
    }

    #[test]
    fn bool_spellings() {
        for text in ["true", "TRUE", "1", "yes", "On"] {
            assert_eq!(scalar(&Value::from(text), &ParamType::Bool), Some(Value::Bool(true)), "{text}");
        }
        for text in ["false", "0", "no", "OFF"] {
            assert_eq!(scalar(&Value::from(text), &ParamType::Bool), Some(Value::Bool(false)), "{text}");
        }
        assert_eq!(scalar(&Value::from("maybe"), &ParamType::Bool), None);
        assert_eq!(scalar(&Value::Json(json!(true)), &ParamType::Bool), Some(Value::Bool(true)));
    }

    #[test]
    fn str_renders_json_scalars() {
        assert_eq!(scalar(&Value::Json(json!(12)), &ParamType::Str), Some(Value::Str("12".into())));
        assert_eq!(scalar(&Value::Json(json!(false)), &ParamType::Str), Some(Value::Str("false".into())));
        assert_eq!(scalar(&Value::Json(json!({"a": 1})), &ParamType::Str), None);
    }

    #[test]
    fn multi_valued_scalar_uses_last_element() {
        let value = Value::List(vec![Value::from("1"), Value::from("2")]);

        assert_eq!(scalar(&value, &ParamType::Int), Some(Value::Int(2)));
        assert_eq!(scalar(&Value::List(vec![]), &ParamType::Int), None);
    }

    #[test]
    fn single_value_becomes_one_element_list() {
        assert_eq!(elements(&Value::from("a")), Some(vec![Value::from("a")]));
        assert_eq!(elements(&Value::Json(json!([1, 2]))).map(|items| items.len()), Some(2));
        assert_eq!(elements(&Value::Json(json!({"a": 1}))), None);
    }

    #[test]
    fn bytes_are_bound_verbatim() {
        assert_eq!(verbatim_bytes(&Value::from("hi")), Value::Bytes(Bytes::from_static(b"hi")));
        assert_eq!(verbatim_bytes(&Value::Json(serde_json::json!("abc"))), Value::Bytes(Bytes::from_static(b"abc")));
        assert_eq!(verbatim_bytes(&Value::Int(3)), Value::Int(3));
    }
}
