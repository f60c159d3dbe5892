use std::collections::HashMap;

use async_graphql_value::Name;
use bracken_parser::{
    types::{Document, FragmentDefinition, FragmentSpread, OperationDefinition, Value, VariableDefinition},
    Pos, Positioned,
};

use crate::{
    registry::{MetaType, MetaTypeName, Registry},
    validation::{
        utils::{reachable_scopes, Scope},
        visitor::{Visitor, VisitorContext},
    },
};

/// A variable may only be used where a type compatible with its declaration
/// is expected, respecting nullability; a declared default makes a nullable
/// variable acceptable in a non-null position.
#[derive(Default)]
pub struct VariableInAllowedPosition<'a> {
    spreads: HashMap<Scope<'a>, Vec<&'a str>>,
    variable_usages: HashMap<Scope<'a>, Vec<(&'a str, Pos, String)>>,
    variable_definitions: Vec<(Option<&'a str>, Vec<&'a Positioned<VariableDefinition>>)>,
    current_scope: Option<Scope<'a>>,
}

/// Record every variable reference inside `value` together with the input
/// type expected at that spot.
fn collect_usages<'a>(
    registry: &Registry,
    expected: &str,
    value: &'a Value,
    pos: Pos,
    usages: &mut Vec<(&'a str, Pos, String)>,
) {
    match value {
        Value::Variable(name) => usages.push((name.as_str(), pos, expected.to_string())),
        Value::List(items) => {
            let unwrapped = MetaTypeName::create(expected).unwrap_non_null();
            let element = match unwrapped {
                MetaTypeName::List(inner) => inner,
                // Single-value list coercion: elements share the list's
                // expected type.
                _ => expected,
            };
            for item in items {
                collect_usages(registry, element, item, pos, usages);
            }
        }
        Value::Object(fields) => {
            let name = MetaTypeName::concrete_typename(expected);
            let Some(MetaType::InputObject(input_object)) = registry.lookup_type(name) else {
                return;
            };
            for (field_name, field_value) in fields {
                if let Some(input_field) =
                    input_object.input_fields.get(field_name.node.as_str())
                {
                    collect_usages(registry, input_field.ty.as_str(), field_value, pos, usages);
                }
            }
        }
        _ => {}
    }
}

impl<'a> Visitor<'a> for VariableInAllowedPosition<'a> {
    fn enter_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        let name = operation
            .node
            .name
            .as_ref()
            .map(|name| name.node.as_str());
        self.current_scope = Some(Scope::Operation(name));
        self.variable_definitions
            .push((name, operation.node.variable_definitions.iter().collect()));
    }

    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        self.current_scope = Some(Scope::Fragment(fragment.node.name.node.as_str()));
    }

    fn enter_fragment_spread(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        fragment_spread: &'a Positioned<FragmentSpread>,
    ) {
        if let Some(scope) = self.current_scope {
            self.spreads
                .entry(scope)
                .or_default()
                .push(fragment_spread.node.fragment_name.node.as_str());
        }
    }

    fn enter_argument(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        _name: &'a Positioned<Name>,
        value: &'a Positioned<Value>,
    ) {
        let (Some(scope), Some(expected)) = (self.current_scope, ctx.current_input_type()) else {
            return;
        };
        let usages = self.variable_usages.entry(scope).or_default();
        collect_usages(
            ctx.registry,
            &expected.to_string(),
            &value.node,
            value.pos,
            usages,
        );
    }

    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, _doc: &'a Document) {
        for (operation_name, definitions) in &self.variable_definitions {
            let reachable = reachable_scopes(Scope::Operation(*operation_name), &self.spreads);
            for scope in &reachable {
                let Some(usages) = self.variable_usages.get(scope) else {
                    continue;
                };
                for (variable, usage_pos, expected) in usages {
                    let Some(definition) = definitions
                        .iter()
                        .find(|definition| definition.node.name.node.as_str() == *variable)
                    else {
                        continue;
                    };

                    let mut variable_type = definition.node.var_type.node.to_string();
                    // A default promotes the variable to non-null for
                    // position checking.
                    if definition.node.default_value.is_some() && !variable_type.ends_with('!') {
                        variable_type.push('!');
                    }

                    if !MetaTypeName::create(expected)
                        .is_subtype(&MetaTypeName::create(&variable_type))
                    {
                        ctx.report_error(
                            vec![definition.pos, *usage_pos],
                            format!(
                                "Variable \"${variable}\" of type \"{}\" used in position expecting type \"{expected}\"",
                                definition.node.var_type.node
                            ),
                        );
                    }
                }
            }
        }
    }
}
