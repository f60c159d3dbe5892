//! Coercion and serialization for the built-in scalar set.
//!
//! Custom scalars either pass values through untouched or gate them behind
//! the `is_valid` predicate on their [`ScalarType`]; the five built-ins get
//! real format checks here.

use async_graphql_value::{ConstValue, Name};

use super::{ScalarParser, ScalarType};
use crate::error::Error;

/// The scalars every schema carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinScalar {
    Int,
    Float,
    String,
    Boolean,
    Id,
}

impl BuiltinScalar {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Int" => Some(BuiltinScalar::Int),
            "Float" => Some(BuiltinScalar::Float),
            "String" => Some(BuiltinScalar::String),
            "Boolean" => Some(BuiltinScalar::Boolean),
            "ID" => Some(BuiltinScalar::Id),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinScalar::Int => "Int",
            BuiltinScalar::Float => "Float",
            BuiltinScalar::String => "String",
            BuiltinScalar::Boolean => "Boolean",
            BuiltinScalar::Id => "ID",
        }
    }

    /// Whether an already-coerced value inhabits this scalar.
    pub fn is_valid(&self, value: &ConstValue) -> bool {
        match self {
            BuiltinScalar::Int => matches!(value, ConstValue::Number(n) if as_int32(n).is_some()),
            BuiltinScalar::Float => matches!(value, ConstValue::Number(_)),
            BuiltinScalar::String => matches!(value, ConstValue::String(_)),
            BuiltinScalar::Boolean => matches!(value, ConstValue::Boolean(_)),
            BuiltinScalar::Id => match value {
                ConstValue::String(_) => true,
                ConstValue::Number(n) => !n.is_f64(),
                _ => false,
            },
        }
    }

    /// Coerce an input value (literal or payload; the rules coincide for
    /// scalars). `Int` is 32-bit per the GraphQL spec.
    pub fn parse(&self, value: ConstValue) -> Result<ConstValue, Error> {
        match (self, value) {
            (BuiltinScalar::Int, ConstValue::Number(n)) => match as_int32(&n) {
                Some(_) => Ok(ConstValue::Number(n)),
                None => Err(Error::new(format!(
                    r#"Expected type "Int", found {n}."#
                ))),
            },
            (BuiltinScalar::Float, ConstValue::Number(n)) => Ok(ConstValue::Number(n)),
            (BuiltinScalar::String, ConstValue::String(s)) => Ok(ConstValue::String(s)),
            (BuiltinScalar::Boolean, ConstValue::Boolean(b)) => Ok(ConstValue::Boolean(b)),
            (BuiltinScalar::Id, ConstValue::String(s)) => Ok(ConstValue::String(s)),
            (BuiltinScalar::Id, ConstValue::Number(n)) if !n.is_f64() => {
                Ok(ConstValue::String(n.to_string()))
            }
            (scalar, value) => Err(Error::new(format!(
                r#"Expected type "{}", found {value}."#,
                scalar.name()
            ))),
        }
    }

    /// Serialize a resolver value onto the wire representation.
    pub fn serialize(&self, value: serde_json::Value) -> Result<ConstValue, Error> {
        use serde_json::Value as Json;
        match (self, value) {
            (BuiltinScalar::Int, Json::Number(n)) if as_int32(&n).is_some() => {
                Ok(ConstValue::Number(n))
            }
            (BuiltinScalar::Float, Json::Number(n)) => Ok(ConstValue::Number(n)),
            (BuiltinScalar::String, Json::String(s)) => Ok(ConstValue::String(s)),
            (BuiltinScalar::Boolean, Json::Bool(b)) => Ok(ConstValue::Boolean(b)),
            (BuiltinScalar::Id, Json::String(s)) => Ok(ConstValue::String(s)),
            (BuiltinScalar::Id, Json::Number(n)) if !n.is_f64() => {
                Ok(ConstValue::String(n.to_string()))
            }
            (scalar, value) => Err(Error::new(format!(
                r#"Cannot serialize {value} as "{}""#,
                scalar.name()
            ))),
        }
    }
}

fn as_int32(n: &serde_json::Number) -> Option<i32> {
    n.as_i64().and_then(|v| i32::try_from(v).ok())
}

/// Coerce an input value against a scalar type.
pub fn parse_scalar(scalar: &ScalarType, value: ConstValue) -> Result<ConstValue, Error> {
    if let Some(builtin) = BuiltinScalar::from_name(&scalar.name) {
        return builtin.parse(value);
    }
    match scalar.parser {
        ScalarParser::PassThrough => Ok(value),
        ScalarParser::Validated => match scalar.is_valid {
            Some(is_valid) if !is_valid(&value) => Err(Error::new(format!(
                r#"Expected type "{}", found {value}."#,
                scalar.name
            ))),
            _ => Ok(value),
        },
    }
}

/// Predicate version of [`parse_scalar`], used by validation before raising
/// errors.
pub fn can_parse_scalar(scalar: &ScalarType, value: &ConstValue) -> bool {
    if let Some(builtin) = BuiltinScalar::from_name(&scalar.name) {
        return builtin.is_valid(value);
    }
    match scalar.parser {
        ScalarParser::PassThrough => true,
        ScalarParser::Validated => scalar.is_valid.map_or(true, |is_valid| is_valid(value)),
    }
}

/// Serialize a resolver value against a scalar type.
pub fn serialize_scalar(
    scalar: &ScalarType,
    value: serde_json::Value,
) -> Result<ConstValue, Error> {
    if let Some(builtin) = BuiltinScalar::from_name(&scalar.name) {
        return builtin.serialize(value);
    }
    let value = ConstValue::from_json(value)?;
    if let (ScalarParser::Validated, Some(is_valid)) = (scalar.parser, scalar.is_valid) {
        if !is_valid(&value) {
            return Err(Error::new(format!(
                r#"Cannot serialize {value} as "{}""#,
                scalar.name
            )));
        }
    }
    Ok(value)
}

/// Serialize an enum-typed resolver value: accept either the external name or
/// an internal value and emit the external name.
pub fn serialize_enum(
    enum_type: &super::EnumType,
    value: serde_json::Value,
) -> Result<ConstValue, Error> {
    if let serde_json::Value::String(name) = &value {
        if enum_type.value(name).is_some() {
            return Ok(ConstValue::Enum(Name::new(name)));
        }
    }
    if let Some(enum_value) = enum_type.value_by_internal(&value) {
        return Ok(ConstValue::Enum(Name::new(&enum_value.name)));
    }
    Err(Error::new(format!(
        r#"Cannot serialize {value} as "{}""#,
        enum_type.name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_is_32_bit() {
        assert!(BuiltinScalar::Int.parse(ConstValue::Number(1.into())).is_ok());
        assert!(BuiltinScalar::Int
            .parse(ConstValue::Number(serde_json::Number::from(i64::from(i32::MAX) + 1)))
            .is_err());
        assert!(BuiltinScalar::Int
            .parse(ConstValue::String("1".into()))
            .is_err());
    }

    #[test]
    fn id_accepts_strings_and_integers() {
        assert_eq!(
            BuiltinScalar::Id.parse(ConstValue::Number(42.into())).unwrap(),
            ConstValue::String("42".into())
        );
        assert!(BuiltinScalar::Id.parse(ConstValue::Boolean(true)).is_err());
    }

    #[test]
    fn serialize_round_trips_parsed_literals() {
        // serialize(parse(v)) is the canonical form of v for the built-ins.
        let cases = [
            (BuiltinScalar::Int, serde_json::json!(7)),
            (BuiltinScalar::Float, serde_json::json!(1.5)),
            (BuiltinScalar::String, serde_json::json!("dog")),
            (BuiltinScalar::Boolean, serde_json::json!(true)),
        ];
        for (scalar, json) in cases {
            let parsed = scalar.parse(ConstValue::from_json(json.clone()).unwrap()).unwrap();
            let serialized = scalar.serialize(parsed.into_json().unwrap()).unwrap();
            assert_eq!(serialized.into_json().unwrap(), json);
        }
    }

    #[test]
    fn float_accepts_integer_numbers() {
        assert!(BuiltinScalar::Float.serialize(serde_json::json!(3)).is_ok());
        assert!(BuiltinScalar::Float.serialize(serde_json::json!("3")).is_err());
    }
}
