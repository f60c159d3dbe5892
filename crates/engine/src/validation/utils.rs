use bracken_parser::types::Value;

use crate::registry::{scalars, MetaType, MetaTypeName, Registry};

/// Where a variable usage or fragment spread was recorded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

/// Variable names referenced anywhere inside a literal value.
pub fn referenced_variables(value: &Value) -> Vec<&str> {
    value
        .referenced_variables()
        .into_iter()
        .map(|name| name.as_str())
        .collect()
}

/// Check a literal against a declared input type, returning the first
/// problem as a human-readable reason. Variable references are skipped here;
/// their compatibility is the business of `VariablesInAllowedPosition`.
pub fn is_valid_literal_value(
    registry: &Registry,
    type_name: &str,
    value: &Value,
) -> Option<String> {
    if let Value::Variable(_) = value {
        return None;
    }
    match MetaTypeName::create(type_name) {
        MetaTypeName::NonNull(inner) => match value {
            Value::Null => Some(format!("Expected type '{type_name}', found null.")),
            _ => is_valid_literal_value(registry, inner, value),
        },
        MetaTypeName::List(inner) => match value {
            Value::Null => None,
            Value::List(items) => items.iter().enumerate().find_map(|(index, item)| {
                is_valid_literal_value(registry, inner, item)
                    .map(|reason| format!("In element #{}: [{reason}]", index + 1))
            }),
            // A single value coerces to a one-element list.
            _ => is_valid_literal_value(registry, inner, value),
        },
        MetaTypeName::Named(name) => {
            if let Value::Null = value {
                return None;
            }
            let Some(ty) = registry.lookup_type(name) else {
                return Some(format!("Unknown type '{name}'."));
            };
            match ty {
                MetaType::Scalar(scalar) => {
                    let const_value = value.clone().into_const()?;
                    if scalars::can_parse_scalar(scalar, &const_value) {
                        None
                    } else {
                        Some(format!("Expected type '{name}', found {value}."))
                    }
                }
                MetaType::Enum(enum_type) => match value {
                    // Literal lookup is case-sensitive; a string literal is
                    // not an enum literal.
                    Value::Enum(member) => {
                        if enum_type.value(member.as_str()).is_some() {
                            None
                        } else {
                            Some(format!("Expected type '{name}', found {value}."))
                        }
                    }
                    _ => Some(format!("Expected type '{name}', found {value}.")),
                },
                MetaType::InputObject(input_object) => match value {
                    Value::Object(fields) => {
                        for (field_name, _) in fields {
                            if !input_object
                                .input_fields
                                .contains_key(field_name.node.as_str())
                            {
                                return Some(format!(
                                    "In field \"{}\": Unknown field.",
                                    field_name.node
                                ));
                            }
                        }
                        for input_field in input_object.input_fields.values() {
                            let provided = fields
                                .iter()
                                .find(|(field_name, _)| {
                                    field_name.node.as_str() == input_field.name
                                })
                                .map(|(_, field_value)| field_value);
                            match provided {
                                Some(field_value) => {
                                    if let Some(reason) = is_valid_literal_value(
                                        registry,
                                        input_field.ty.as_str(),
                                        field_value,
                                    ) {
                                        return Some(format!(
                                            "In field \"{}\": [{reason}]",
                                            input_field.name
                                        ));
                                    }
                                }
                                None => {
                                    if input_field.ty.is_non_null()
                                        && input_field.default_value.is_none()
                                    {
                                        return Some(format!(
                                            "Missing required field \"{}\" of type \"{}\".",
                                            input_field.name, input_field.ty
                                        ));
                                    }
                                }
                            }
                        }
                        None
                    }
                    _ => Some(format!("Expected type '{name}', found {value}.")),
                },
                _ => Some(format!("Type '{name}' is not an input type.")),
            }
        }
    }
}

/// The scopes reachable from `start` through fragment spreads, `start`
/// included. Used by the rules that track variable or fragment usage across
/// fragment boundaries.
pub fn reachable_scopes<'a>(
    start: Scope<'a>,
    spreads: &std::collections::HashMap<Scope<'a>, Vec<&'a str>>,
) -> std::collections::HashSet<Scope<'a>> {
    let mut reachable = std::collections::HashSet::new();
    let mut queue = vec![start];
    while let Some(scope) = queue.pop() {
        if !reachable.insert(scope) {
            continue;
        }
        if let Some(targets) = spreads.get(&scope) {
            for target in targets {
                queue.push(Scope::Fragment(target));
            }
        }
    }
    reachable
}
