//! Executable-document parsing.
//!
//! The grammar itself is handled by [`async-graphql-parser`]; this crate owns
//! the document model the engine works with and converts the parser's output
//! into it. Parse failures keep their source positions so they can be turned
//! into located diagnostics.
//!
//! [`async-graphql-parser`]: https://crates.io/crates/async-graphql-parser

mod pos;
pub mod types;

use async_graphql_parser::types as ext;
pub use async_graphql_value::{ConstValue, Name, Number, Variables};
pub use pos::{Pos, Positioned};

use types::{
    Directive, Document, Field, FragmentDefinition, FragmentSpread, InlineFragment,
    OperationDefinition, OperationType, Selection, SelectionSet, Type, TypeCondition, Value,
    VariableDefinition,
};

/// A syntax error in a query document.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
    positions: Vec<Pos>,
}

impl ParseError {
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Positions the error refers to, if the grammar front-end reported any.
    pub fn positions(&self) -> &[Pos] {
        &self.positions
    }
}

impl From<async_graphql_parser::Error> for ParseError {
    fn from(error: async_graphql_parser::Error) -> Self {
        let positions = error.positions().into_iter().map(Into::into).collect();
        Self {
            message: error.to_string(),
            positions,
        }
    }
}

/// Parse a query source into a [`Document`].
///
/// Structural errors the grammar already rejects (duplicate operation or
/// fragment names, an anonymous operation next to named ones) surface here as
/// [`ParseError`]s rather than reaching the validator.
pub fn parse_query(source: impl AsRef<str>) -> Result<Document, ParseError> {
    let document = async_graphql_parser::parse_query(source)?;

    let mut operations = Vec::new();
    match document.operations {
        ext::DocumentOperations::Single(operation) => {
            operations.push(convert_operation(None, operation));
        }
        ext::DocumentOperations::Multiple(map) => {
            // The grammar front-end keys named operations by name; source
            // positions restore declaration order.
            let mut named: Vec<_> = map.into_iter().collect();
            named.sort_by_key(|(_, operation)| (operation.pos.line, operation.pos.column));
            for (name, operation) in named {
                operations.push(convert_operation(Some(name), operation));
            }
        }
    }

    let mut fragments: Vec<_> = document
        .fragments
        .into_iter()
        .map(|(name, fragment)| convert_fragment(name, fragment))
        .collect();
    fragments.sort_by_key(|fragment| fragment.pos);

    Ok(Document {
        operations,
        fragments,
    })
}

fn convert_operation(
    name: Option<Name>,
    operation: Positioned2<ext::OperationDefinition>,
) -> Positioned<OperationDefinition> {
    let pos: Pos = operation.pos.into();
    let node = operation.node;
    Positioned::new(
        OperationDefinition {
            ty: convert_operation_type(node.ty),
            name: name.map(|name| Positioned::new(name, pos)),
            variable_definitions: node
                .variable_definitions
                .into_iter()
                .map(convert_variable_definition)
                .collect(),
            directives: node.directives.into_iter().map(convert_directive).collect(),
            selection_set: convert_selection_set(node.selection_set),
        },
        pos,
    )
}

fn convert_operation_type(ty: ext::OperationType) -> OperationType {
    match ty {
        ext::OperationType::Query => OperationType::Query,
        ext::OperationType::Mutation => OperationType::Mutation,
        ext::OperationType::Subscription => OperationType::Subscription,
    }
}

fn convert_fragment(
    name: Name,
    fragment: Positioned2<ext::FragmentDefinition>,
) -> Positioned<FragmentDefinition> {
    let pos: Pos = fragment.pos.into();
    let node = fragment.node;
    Positioned::new(
        FragmentDefinition {
            name: Positioned::new(name, pos),
            type_condition: convert_type_condition(node.type_condition),
            directives: node.directives.into_iter().map(convert_directive).collect(),
            selection_set: convert_selection_set(node.selection_set),
        },
        pos,
    )
}

fn convert_variable_definition(
    definition: Positioned2<ext::VariableDefinition>,
) -> Positioned<VariableDefinition> {
    let pos: Pos = definition.pos.into();
    let node = definition.node;
    Positioned::new(
        VariableDefinition {
            name: convert_name(node.name),
            var_type: convert_type(node.var_type),
            default_value: node
                .default_value
                .map(|value| Positioned::new(Value::from(value.node), value.pos.into())),
        },
        pos,
    )
}

fn convert_type(ty: Positioned2<ext::Type>) -> Positioned<Type> {
    let pos: Pos = ty.pos.into();
    Positioned::new(convert_type_inner(ty.node), pos)
}

fn convert_type_inner(ty: ext::Type) -> Type {
    Type {
        base: match ty.base {
            ext::BaseType::Named(name) => types::BaseType::Named(name),
            ext::BaseType::List(inner) => {
                types::BaseType::List(Box::new(convert_type_inner(*inner)))
            }
        },
        nullable: ty.nullable,
    }
}

fn convert_selection_set(
    selection_set: Positioned2<ext::SelectionSet>,
) -> Positioned<SelectionSet> {
    let pos: Pos = selection_set.pos.into();
    Positioned::new(
        SelectionSet {
            items: selection_set
                .node
                .items
                .into_iter()
                .map(convert_selection)
                .collect(),
        },
        pos,
    )
}

fn convert_selection(selection: Positioned2<ext::Selection>) -> Positioned<Selection> {
    let pos: Pos = selection.pos.into();
    let node = match selection.node {
        ext::Selection::Field(field) => Selection::Field(convert_field(field)),
        ext::Selection::FragmentSpread(spread) => {
            let spread_pos: Pos = spread.pos.into();
            Selection::FragmentSpread(Positioned::new(
                FragmentSpread {
                    fragment_name: convert_name(spread.node.fragment_name),
                    directives: spread
                        .node
                        .directives
                        .into_iter()
                        .map(convert_directive)
                        .collect(),
                },
                spread_pos,
            ))
        }
        ext::Selection::InlineFragment(fragment) => {
            let fragment_pos: Pos = fragment.pos.into();
            Selection::InlineFragment(Positioned::new(
                InlineFragment {
                    type_condition: fragment.node.type_condition.map(convert_type_condition),
                    directives: fragment
                        .node
                        .directives
                        .into_iter()
                        .map(convert_directive)
                        .collect(),
                    selection_set: convert_selection_set(fragment.node.selection_set),
                },
                fragment_pos,
            ))
        }
    };
    Positioned::new(node, pos)
}

fn convert_field(field: Positioned2<ext::Field>) -> Positioned<Field> {
    let pos: Pos = field.pos.into();
    let node = field.node;
    Positioned::new(
        Field {
            alias: node.alias.map(convert_name),
            name: convert_name(node.name),
            arguments: node
                .arguments
                .into_iter()
                .map(|(name, value)| (convert_name(name), convert_value(value)))
                .collect(),
            directives: node.directives.into_iter().map(convert_directive).collect(),
            selection_set: convert_selection_set(node.selection_set),
        },
        pos,
    )
}

fn convert_directive(directive: Positioned2<ext::Directive>) -> Positioned<Directive> {
    let pos: Pos = directive.pos.into();
    let node = directive.node;
    Positioned::new(
        Directive {
            name: convert_name(node.name),
            arguments: node
                .arguments
                .into_iter()
                .map(|(name, value)| (convert_name(name), convert_value(value)))
                .collect(),
        },
        pos,
    )
}

fn convert_type_condition(
    condition: Positioned2<ext::TypeCondition>,
) -> Positioned<TypeCondition> {
    let pos: Pos = condition.pos.into();
    Positioned::new(
        TypeCondition {
            on: convert_name(condition.node.on),
        },
        pos,
    )
}

fn convert_name(name: Positioned2<Name>) -> Positioned<Name> {
    let pos: Pos = name.pos.into();
    Positioned::new(name.node, pos)
}

fn convert_value(value: Positioned2<async_graphql_value::Value>) -> Positioned<Value> {
    let pos: Pos = value.pos.into();
    Positioned::new(convert_value_inner(value.node, pos), pos)
}

fn convert_value_inner(value: async_graphql_value::Value, pos: Pos) -> Value {
    use async_graphql_value::Value as Ext;
    match value {
        Ext::Variable(name) => Value::Variable(name),
        Ext::Null => Value::Null,
        Ext::Number(number) => Value::Number(number),
        Ext::String(string) => Value::String(string),
        Ext::Boolean(boolean) => Value::Boolean(boolean),
        Ext::Binary(bytes) => Value::String(String::from_utf8_lossy(bytes.as_ref()).into_owned()),
        Ext::Enum(name) => Value::Enum(name),
        Ext::List(items) => Value::List(
            items
                .into_iter()
                .map(|item| convert_value_inner(item, pos))
                .collect(),
        ),
        // The grammar front-end keeps object fields in a map, so individual
        // keys lose their own positions; the literal's position stands in.
        Ext::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(name, value)| {
                    (
                        Positioned::new(name, pos),
                        convert_value_inner(value, pos),
                    )
                })
                .collect(),
        ),
    }
}

type Positioned2<T> = async_graphql_parser::Positioned<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positions() {
        let document = parse_query("{\n  hero {\n    name\n  }\n}").unwrap();
        assert_eq!(document.operations.len(), 1);
        let operation = &document.operations[0].node;
        assert!(operation.name.is_none());
        let field = match &operation.selection_set.node.items[0].node {
            Selection::Field(field) => field,
            other => panic!("expected a field, got {other:?}"),
        };
        assert_eq!(field.node.name.node.as_str(), "hero");
        assert_eq!(field.pos, Pos::new(2, 3));
        let name = match &field.node.selection_set.node.items[0].node {
            Selection::Field(field) => field,
            other => panic!("expected a field, got {other:?}"),
        };
        assert_eq!(name.pos, Pos::new(3, 5));
    }

    #[test]
    fn parses_arguments_and_values() {
        let document =
            parse_query(r#"{ search(filter: { term: "dog", limit: 3 }, tags: [A, B]) }"#).unwrap();
        let operation = &document.operations[0].node;
        let field = match &operation.selection_set.node.items[0].node {
            Selection::Field(field) => field,
            other => panic!("expected a field, got {other:?}"),
        };
        let filter = field.node.get_argument("filter").unwrap();
        match &filter.node {
            Value::Object(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].0.node.as_str(), "term");
            }
            other => panic!("expected an object, got {other:?}"),
        }
        assert_eq!(
            field.node.get_argument("tags").unwrap().node.to_string(),
            "[A, B]"
        );
    }

    #[test]
    fn rejects_syntax_errors_with_positions() {
        let error = parse_query("{ hero { }").unwrap_err();
        assert!(!error.message().is_empty());
    }

    #[test]
    fn definitions_keep_declaration_order() {
        let document = parse_query(
            "query Zeta { hero { ...b } }\nquery Alpha { hero { ...a } }\nfragment b on Hero { name }\nfragment a on Hero { name }",
        )
        .unwrap();
        let operation_names: Vec<_> = document
            .operations
            .iter()
            .map(|operation| operation.node.name.as_ref().unwrap().node.as_str())
            .collect();
        assert_eq!(operation_names, ["Zeta", "Alpha"]);
        let fragment_names: Vec<_> = document
            .fragments
            .iter()
            .map(|fragment| fragment.node.name.node.as_str())
            .collect();
        assert_eq!(fragment_names, ["b", "a"]);
    }

    #[test]
    fn value_display_round_trip() {
        let value = Value::List(vec![
            Value::String("one".into()),
            Value::Number(2.into()),
        ]);
        assert_eq!(value.to_string(), r#"["one", 2]"#);
    }
}
