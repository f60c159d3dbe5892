//! Variable coercion.
//!
//! Turns the request's variables payload into the read-only table the
//! executor consumes, one declaration at a time: a missing value falls back
//! to the declared default (parsed as a literal), a missing non-null
//! variable is an error, and everything else goes through payload
//! coercion against the declared type. Undeclared payload keys are
//! ignored.

use async_graphql_value::{Name, Variables};
use bracken_parser::types::OperationDefinition;

use crate::{
    error::{ErrorKind, ServerError},
    registry::{MetaInputValue, Registry},
    resolver_utils::{resolve_input, InputResolveMode},
};

pub fn coerce_variables(
    registry: &Registry,
    operation: &OperationDefinition,
    variables: &Variables,
) -> Result<Variables, Vec<ServerError>> {
    let mut coerced = Variables::default();
    let mut errors = Vec::new();

    for definition in &operation.variable_definitions {
        let name = definition.node.name.node.as_str();
        let declared_type = definition.node.var_type.node.to_string();
        let meta_input = MetaInputValue::new(name, declared_type.as_str());

        let (provided, mode) = match variables.get(name) {
            Some(value) => (Some(value.clone()), InputResolveMode::Payload),
            None => match definition.node.default_value() {
                Some(default) => match default.clone().into_const() {
                    Some(default) => (Some(default), InputResolveMode::Literal),
                    None => {
                        errors.push(
                            ServerError::new(
                                format!(
                                    "Variable \"${name}\" has a default value that cannot be resolved"
                                ),
                                ErrorKind::VariableCoercion,
                                Some(definition.pos),
                            ),
                        );
                        continue;
                    }
                },
                None => {
                    if declared_type.ends_with('!') {
                        errors.push(ServerError::new(
                            format!(
                                "Variable \"${name}\" of required type \"{declared_type}\" was not provided"
                            ),
                            ErrorKind::VariableCoercion,
                            Some(definition.pos),
                        ));
                    }
                    continue;
                }
            },
        };

        match resolve_input(registry, name, &meta_input, provided, mode) {
            Ok(Some(value)) => {
                coerced.insert(Name::new(name), value);
            }
            Ok(None) => {}
            Err(error) => {
                errors.push(ServerError::new(
                    format!(
                        "Variable \"${name}\" of type \"{declared_type}\" is invalid: {}",
                        error.message
                    ),
                    ErrorKind::VariableCoercion,
                    Some(definition.pos),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_value::ConstValue;
    use bracken_parser::parse_query;

    use super::*;

    fn operation(query: &str) -> OperationDefinition {
        parse_query(query).unwrap().operations.remove(0).node
    }

    fn registry() -> Registry {
        Registry::new()
    }

    #[test]
    fn missing_non_null_variable_is_an_error() {
        let operation = operation("query Q($id: ID!) { __typename }");
        let errors =
            coerce_variables(&registry(), &operation, &Variables::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::VariableCoercion);
        assert!(errors[0].message.contains("$id"));
        assert!(errors[0].message.contains("ID!"));
        assert!(!errors[0].locations.is_empty());
    }

    #[test]
    fn default_fills_missing_value() {
        let operation = operation("query Q($limit: Int = 10) { __typename }");
        let coerced =
            coerce_variables(&registry(), &operation, &Variables::default()).unwrap();
        assert_eq!(coerced.get("limit"), Some(&ConstValue::Number(10.into())));
    }

    #[test]
    fn undeclared_keys_are_ignored() {
        let operation = operation("query Q($limit: Int = 1) { __typename }");
        let mut variables = Variables::default();
        variables.insert(Name::new("unrelated"), ConstValue::Boolean(true));
        let coerced = coerce_variables(&registry(), &operation, &variables).unwrap();
        assert!(coerced.get("unrelated").is_none());
    }

    #[test]
    fn invalid_payload_value_names_variable_and_type() {
        let operation = operation("query Q($limit: Int) { __typename }");
        let mut variables = Variables::default();
        variables.insert(Name::new("limit"), ConstValue::String("ten".to_string()));
        let errors = coerce_variables(&registry(), &operation, &variables).unwrap_err();
        assert!(errors[0].message.contains("$limit"));
        assert!(errors[0].message.contains("\"Int\""));
    }
}
