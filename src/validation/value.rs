//! Typed parameter values and string coercion.

use serde::{Deserialize, Serialize};

/// A parameter value after coercion.
///
/// Deserializes from plain YAML/JSON scalars, so rule defaults and enum
/// members can be written as `18`, `true` or `"admin"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
    #[default]
    Absent,
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// Declared parameter type. Unrecognised names behave like `String`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueType {
    Int,
    Bool,
    #[default]
    String,
}

impl From<String> for ValueType {
    fn from(name: String) -> Self {
        ValueType::from(name.as_str())
    }
}

impl From<&str> for ValueType {
    fn from(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "int" => ValueType::Int,
            "bool" => ValueType::Bool,
            _ => ValueType::String,
        }
    }
}

impl From<ValueType> for String {
    fn from(ty: ValueType) -> Self {
        match ty {
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::String => "string",
        }
        .to_string()
    }
}

impl ValueType {
    /// Coerce a non-empty raw string. Parse failures give the zero value.
    pub fn coerce(self, raw: &str) -> Value {
        match self {
            ValueType::Int => Value::Int(raw.parse().unwrap_or(0)),
            ValueType::Bool => Value::Bool(parse_bool(raw).unwrap_or(false)),
            ValueType::String => Value::String(raw.to_string()),
        }
    }
}

/// Boolean literals accepted in request parameters.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_coercion() {
        assert_eq!(ValueType::Int.coerce("42"), Value::Int(42));
        assert_eq!(ValueType::Int.coerce("-7"), Value::Int(-7));
        assert_eq!(ValueType::Int.coerce("+3"), Value::Int(3));
        assert_eq!(ValueType::Int.coerce("forty"), Value::Int(0));
        assert_eq!(ValueType::Int.coerce("1.5"), Value::Int(0));
    }

    #[test]
    fn test_bool_coercion() {
        for truthy in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(ValueType::Bool.coerce(truthy), Value::Bool(true), "{truthy}");
        }
        for falsy in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(ValueType::Bool.coerce(falsy), Value::Bool(false), "{falsy}");
        }
        assert_eq!(ValueType::Bool.coerce("yes"), Value::Bool(false));
        assert_eq!(ValueType::Bool.coerce("tRuE"), Value::Bool(false));
    }

    #[test]
    fn test_unknown_type_passes_through() {
        assert_eq!(ValueType::from("Float"), ValueType::String);
        assert_eq!(ValueType::from("INT"), ValueType::Int);
        assert_eq!(ValueType::String.coerce("abc"), Value::from("abc"));
    }

    #[test]
    fn test_value_from_scalars() {
        let values: Vec<Value> = serde_json::from_str(r#"[18, true, "admin", null]"#).unwrap();
        assert_eq!(
            values,
            vec![Value::Int(18), Value::Bool(true), Value::from("admin"), Value::Absent]
        );
    }
}
