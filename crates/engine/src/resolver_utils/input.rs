//! Input coercion.
//!
//! One procedure serves both literal arguments (with variables already
//! substituted) and payload variables; the mode picks the enum matching
//! rules, which is the only place the two paths differ.

use std::borrow::{Borrow, Cow};

use async_graphql_value::{ConstValue, Name};
use indexmap::IndexMap;

use crate::{
    error::Error,
    registry::{scalars, EnumType, MetaInputValue, MetaType, MetaTypeName, Registry},
};

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub enum InputResolveMode {
    /// Query-literal coercion: enum members are literal names, matched
    /// case-sensitively.
    #[default]
    Literal,
    /// Variables-payload coercion: enum members may arrive as strings and
    /// match case-insensitively.
    Payload,
}

/// Coerce a possibly-absent input against its declaration. Returns `None`
/// when the value is absent, nullable, and has no default.
pub fn resolve_input(
    registry: &Registry,
    arg_name: &str,
    meta_input_value: &MetaInputValue,
    value: Option<ConstValue>,
    mode: InputResolveMode,
) -> Result<Option<ConstValue>, Error> {
    resolve_maybe_absent_input(
        ResolveContext {
            registry,
            path: PathNode::new(arg_name),
            ty: Cow::Borrowed(meta_input_value.ty.as_str()),
            allow_list_coercion: true,
            default_value: meta_input_value.default_value.as_ref(),
        },
        value,
        mode,
    )
}

#[derive(Clone, Copy)]
struct PathNode<'a> {
    name: &'a str,
    previous: Option<&'a PathNode<'a>>,
}

impl<'a> PathNode<'a> {
    fn new(name: &'a str) -> PathNode<'a> {
        PathNode {
            name,
            previous: None,
        }
    }

    fn with(&'a self, name: &'a str) -> PathNode<'a> {
        PathNode {
            name,
            previous: Some(self),
        }
    }

    fn into_vec(&self) -> Vec<String> {
        let mut previous = self.previous.map(PathNode::into_vec).unwrap_or_default();
        previous.push(self.name.to_string());
        previous
    }
}

#[derive(Clone)]
struct ResolveContext<'a> {
    registry: &'a Registry,
    path: PathNode<'a>,
    /// Expected GraphQL type.
    ty: Cow<'a, str>,
    /// Whether a single value may still be wrapped into a one-element list
    /// at this point. Nested lists with several elements forfeit it:
    /// `[[Int]]` with value `[1, 2, 3]` is an error, not `[[1], [2], [3]]`.
    allow_list_coercion: bool,
    default_value: Option<&'a ConstValue>,
}

impl<'a> ResolveContext<'a> {
    fn with_input(&'a self, path: &'a str, input: &'a MetaInputValue) -> ResolveContext<'a> {
        ResolveContext {
            registry: self.registry,
            path: self.path.with(path),
            ty: Cow::Borrowed(input.ty.as_str()),
            allow_list_coercion: true,
            default_value: input.default_value.as_ref(),
        }
    }

    fn input_error(&self, expected: &str) -> Error {
        Error::new(format!(
            "{expected} for {}",
            self.path.into_vec().join(".")
        ))
    }
}

fn resolve_maybe_absent_input(
    rctx: ResolveContext<'_>,
    value: Option<ConstValue>,
    mode: InputResolveMode,
) -> Result<Option<ConstValue>, Error> {
    match value.or_else(|| rctx.default_value.cloned()) {
        Some(value) => resolve_present_input(rctx, value, mode).map(Some),
        None => {
            if matches!(MetaTypeName::create(rctx.ty.borrow()), MetaTypeName::NonNull(_)) {
                Err(rctx.input_error("Unexpected null value"))
            } else {
                Ok(None)
            }
        }
    }
}

fn resolve_present_input(
    rctx: ResolveContext<'_>,
    value: ConstValue,
    mode: InputResolveMode,
) -> Result<ConstValue, Error> {
    match MetaTypeName::create(rctx.ty.borrow()) {
        MetaTypeName::NonNull(type_name) => {
            if matches!(value, ConstValue::Null) {
                return Err(rctx.input_error("Unexpected null value"));
            }
            resolve_present_input(
                ResolveContext {
                    ty: Cow::Borrowed(type_name),
                    ..rctx
                },
                value,
                mode,
            )
        }
        MetaTypeName::List(type_name) => {
            if matches!(value, ConstValue::Null) {
                return Ok(value);
            }
            if let ConstValue::List(list) = value {
                let rctx = ResolveContext {
                    ty: Cow::Borrowed(type_name),
                    allow_list_coercion: list.len() <= 1,
                    default_value: None,
                    ..rctx
                };
                let mut items = Vec::with_capacity(list.len());
                for (index, element) in list.into_iter().enumerate() {
                    let path = index.to_string();
                    let rctx = ResolveContext {
                        path: rctx.path.with(&path),
                        ..rctx.clone()
                    };
                    items.push(resolve_present_input(rctx, element, mode)?);
                }
                Ok(ConstValue::List(items))
            } else if rctx.allow_list_coercion {
                Ok(ConstValue::List(vec![resolve_present_input(
                    ResolveContext {
                        ty: Cow::Borrowed(type_name),
                        allow_list_coercion: true,
                        default_value: None,
                        ..rctx
                    },
                    value,
                    mode,
                )?]))
            } else {
                Err(rctx.input_error("Expected a List"))
            }
        }
        MetaTypeName::Named(type_name) => {
            if matches!(value, ConstValue::Null) {
                return Ok(value);
            }
            let Some(ty) = rctx.registry.lookup_type(type_name) else {
                return Err(rctx.input_error(&format!("Unknown input type {type_name}")));
            };
            match ty {
                MetaType::InputObject(input_object) => {
                    if let ConstValue::Object(mut fields) = value {
                        let mut map = IndexMap::with_capacity(fields.len());
                        for meta_input_value in input_object.input_fields.values() {
                            if let Some(field_value) = resolve_maybe_absent_input(
                                rctx.with_input(&meta_input_value.name, meta_input_value),
                                fields.shift_remove(&Name::new(&meta_input_value.name)),
                                mode,
                            )? {
                                map.insert(Name::new(&meta_input_value.name), field_value);
                            }
                        }
                        Ok(ConstValue::Object(map))
                    } else {
                        Err(rctx.input_error("Expected an Object"))
                    }
                }
                MetaType::Enum(enum_type) => resolve_input_enum(rctx, value, enum_type, mode),
                MetaType::Scalar(scalar) => scalars::parse_scalar(scalar, value)
                    .map_err(|error| rctx.input_error(&error.message)),
                _ => Err(rctx.input_error(&format!(
                    "Internal Error: Unsupported input type {type_name}"
                ))),
            }
        }
    }
}

fn resolve_input_enum(
    rctx: ResolveContext<'_>,
    value: ConstValue,
    ty: &EnumType,
    mode: InputResolveMode,
) -> Result<ConstValue, Error> {
    let meta_value = match (&value, mode) {
        (ConstValue::Enum(name), InputResolveMode::Literal) => ty.value(name.as_str()),
        (ConstValue::Enum(name), InputResolveMode::Payload) => {
            ty.value_ignore_case(name.as_str())
        }
        (ConstValue::String(string), InputResolveMode::Payload) => {
            ty.value_ignore_case(string.as_str())
        }
        (ConstValue::String(_), InputResolveMode::Literal) => {
            return Err(rctx.input_error(&format!(
                "Enum {} cannot be coerced from a string literal",
                ty.name
            )));
        }
        _ => {
            return Err(rctx.input_error(&format!(
                "Expected an enum, not a {}",
                const_value_kind_str(&value)
            )));
        }
    };

    let meta_value = meta_value.ok_or_else(|| {
        rctx.input_error(&format!("Unknown enum value {value} for enum {}", ty.name))
    })?;
    Ok(ConstValue::Enum(Name::new(&meta_value.name)))
}

fn const_value_kind_str(value: &ConstValue) -> &'static str {
    match value {
        ConstValue::Null => "null",
        ConstValue::Number(_) => "number",
        ConstValue::String(_) => "string",
        ConstValue::Boolean(_) => "boolean",
        ConstValue::Binary(_) => "binary",
        ConstValue::Enum(_) => "enum",
        ConstValue::List(_) => "list",
        ConstValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MetaEnumValue;

    fn test_registry() -> Registry {
        let mut registry = Registry::new();
        registry.insert_type(EnumType::new(
            "DogCommand",
            [
                MetaEnumValue::new("SIT"),
                MetaEnumValue::new("HEEL"),
            ],
        ));
        registry
    }

    #[test]
    fn literal_enum_lookup_is_case_sensitive() {
        let registry = test_registry();
        let input = MetaInputValue::new("cmd", "DogCommand");
        let sit = resolve_input(
            &registry,
            "cmd",
            &input,
            Some(ConstValue::Enum(Name::new("SIT"))),
            InputResolveMode::Literal,
        )
        .unwrap();
        assert_eq!(sit, Some(ConstValue::Enum(Name::new("SIT"))));

        let lower = resolve_input(
            &registry,
            "cmd",
            &input,
            Some(ConstValue::Enum(Name::new("sit"))),
            InputResolveMode::Literal,
        );
        assert!(lower.is_err());
    }

    #[test]
    fn payload_enum_lookup_is_case_insensitive() {
        let registry = test_registry();
        let input = MetaInputValue::new("cmd", "DogCommand");
        let sit = resolve_input(
            &registry,
            "cmd",
            &input,
            Some(ConstValue::String("sit".to_string())),
            InputResolveMode::Payload,
        )
        .unwrap();
        // The canonical member name comes back out.
        assert_eq!(sit, Some(ConstValue::Enum(Name::new("SIT"))));
    }

    #[test]
    fn single_value_coerces_to_one_element_list() {
        let registry = test_registry();
        let input = MetaInputValue::new("tags", "[String]");
        let coerced = resolve_input(
            &registry,
            "tags",
            &input,
            Some(ConstValue::String("dog".to_string())),
            InputResolveMode::Payload,
        )
        .unwrap();
        assert_eq!(
            coerced,
            Some(ConstValue::List(vec![ConstValue::String("dog".to_string())]))
        );
    }

    #[test]
    fn non_null_rejects_absent_value() {
        let registry = test_registry();
        let input = MetaInputValue::new("req", "Int!");
        let missing = resolve_input(&registry, "req", &input, None, InputResolveMode::Literal);
        assert!(missing.is_err());
    }

    #[test]
    fn defaults_fill_absent_values() {
        let registry = test_registry();
        let input = MetaInputValue::new("limit", "Int").with_default(ConstValue::Number(10.into()));
        let coerced =
            resolve_input(&registry, "limit", &input, None, InputResolveMode::Payload).unwrap();
        assert_eq!(coerced, Some(ConstValue::Number(10.into())));
    }
}
