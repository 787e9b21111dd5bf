//! Conversion between variants and JSON.
//!
//! JSON is how hosts feed payloads from text (command lines, config files).
//! A top-level `null` is `Variant::None`; a `null` inside an array is a
//! null element. Host references have no JSON form of their own and are
//! written as their entity's full name.

use serde_json::{Number, Value};

use crate::error::CoreError;
use crate::variant::{Payload, Variant};

impl Variant {
    /// Build a variant from a JSON value.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        match value {
            Value::Null => Ok(Self::None),
            Value::Bool(b) => Ok(Self::Boolean(*b)),
            Value::Number(n) => number_to_variant(n),
            Value::String(s) => Ok(Self::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Null => Ok(None),
                    other => Self::from_json(other).map(Some),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Array),
            Value::Object(_) => Err(CoreError::UnsupportedJson { kind: "object" }),
        }
    }

    /// Build a payload from a JSON array. Each element becomes one slot,
    /// with `null` read as `Variant::None`.
    pub fn payload_from_json(value: &Value) -> Result<Payload, CoreError> {
        let Value::Array(items) = value else {
            return Err(CoreError::UnsupportedJson {
                kind: json_kind(value),
            });
        };
        items.iter().map(Self::from_json).collect()
    }

    /// Render this variant as JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Self::None => Value::Null,
            Self::Boolean(b) => Value::Bool(*b),
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => Number::from_f64(f64::from(*f)).map_or(Value::Null, Value::Number),
            Self::String(s) => Value::String(s.clone()),
            Self::TypeRef(r) => r.full_name().map_or(Value::Null, Value::String),
            Self::ObjectRef(r) => r.full_name().map_or(Value::Null, Value::String),
            Self::Array(elements) => Value::Array(
                elements
                    .iter()
                    .map(|element| element.as_ref().map_or(Value::Null, Variant::to_json))
                    .collect(),
            ),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null payload",
        Value::Bool(_) => "boolean payload",
        Value::Number(_) => "number payload",
        Value::String(_) => "string payload",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn number_to_variant(n: &Number) -> Result<Variant, CoreError> {
    if n.is_f64() {
        return Ok(Variant::Float(n.as_f64().unwrap_or_default() as f32));
    }
    n.as_i64()
        .and_then(|i| i32::try_from(i).ok())
        .map(Variant::Integer)
        .ok_or_else(|| CoreError::IntegerOutOfRange {
            value: n.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Variant::from_json(&json!(null)).unwrap(), Variant::None);
        assert_eq!(Variant::from_json(&json!(42)).unwrap(), Variant::Integer(42));
        assert_eq!(Variant::from_json(&json!(2.5)).unwrap(), Variant::Float(2.5));
        assert_eq!(Variant::from_json(&json!("x")).unwrap(), Variant::string("x"));
    }

    #[test]
    fn test_from_json_array_keeps_null_elements() {
        let value = Variant::from_json(&json!([1, null, "a"])).unwrap();
        assert_eq!(
            value,
            Variant::array([Some(Variant::Integer(1)), None, Some(Variant::string("a"))])
        );
    }

    #[test]
    fn test_from_json_rejects_objects_and_wide_integers() {
        assert!(matches!(
            Variant::from_json(&json!({"a": 1})),
            Err(CoreError::UnsupportedJson { kind: "object" })
        ));
        assert!(matches!(
            Variant::from_json(&json!(5_000_000_000_i64)),
            Err(CoreError::IntegerOutOfRange { .. })
        ));
        assert!(Variant::from_json(&json!([[{"nested": true}]])).is_err());
    }

    #[test]
    fn test_payload_from_json() {
        let payload = Variant::payload_from_json(&json!([1, null, [true]])).unwrap();
        assert_eq!(
            payload,
            vec![
                Variant::Integer(1),
                Variant::None,
                Variant::array([Some(Variant::Boolean(true))]),
            ]
        );
        assert!(matches!(
            Variant::payload_from_json(&json!("x")),
            Err(CoreError::UnsupportedJson { kind: "string payload" })
        ));
    }

    #[test]
    fn test_none_element_reads_back_as_null_slot() {
        let value = Variant::array([Some(Variant::None)]);
        assert_eq!(value.to_json(), json!([null]));
        assert_eq!(
            Variant::from_json(&value.to_json()).unwrap(),
            Variant::array([None])
        );
    }

    #[test]
    fn test_to_json() {
        let value = Variant::array([Some(Variant::Boolean(true)), None, Some(Variant::Float(0.5))]);
        assert_eq!(value.to_json(), json!([true, null, 0.5]));
        assert_eq!(Variant::Integer(-3).to_json(), json!(-3));
    }
}
