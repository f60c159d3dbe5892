use std::collections::{HashMap, HashSet};

use async_graphql_value::Name;
use bracken_parser::{
    types::{Document, FragmentDefinition, FragmentSpread, OperationDefinition, Value},
    Pos, Positioned,
};

use crate::validation::{
    utils::{reachable_scopes, referenced_variables, Scope},
    visitor::{Visitor, VisitorContext},
};

/// Every variable used by an operation, including through fragments it
/// spreads, must be declared by that operation.
#[derive(Default)]
pub struct NoUndefinedVariables<'a> {
    defined_variables: Vec<(Option<&'a str>, Pos, HashSet<&'a str>)>,
    used_variables: HashMap<Scope<'a>, Vec<(&'a str, Pos)>>,
    spreads: HashMap<Scope<'a>, Vec<&'a str>>,
    current_scope: Option<Scope<'a>>,
}

impl<'a> Visitor<'a> for NoUndefinedVariables<'a> {
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
        self.defined_variables
            .push((name, operation.pos, HashSet::new()));

        for variable_definition in &operation.node.variable_definitions {
            if let Some((_, _, defined)) = self.defined_variables.last_mut() {
                defined.insert(variable_definition.node.name.node.as_str());
            }
        }
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
        _ctx: &mut VisitorContext<'a>,
        _name: &'a Positioned<Name>,
        value: &'a Positioned<Value>,
    ) {
        if let Some(scope) = self.current_scope {
            let usages = self.used_variables.entry(scope).or_default();
            for variable in referenced_variables(&value.node) {
                usages.push((variable, value.pos));
            }
        }
    }

    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, _doc: &'a Document) {
        for (operation_name, operation_pos, defined) in &self.defined_variables {
            let reachable = reachable_scopes(Scope::Operation(*operation_name), &self.spreads);
            let mut reported: HashSet<&str> = HashSet::new();
            for scope in &reachable {
                let Some(usages) = self.used_variables.get(scope) else {
                    continue;
                };
                for (variable, pos) in usages {
                    if !defined.contains(variable) && reported.insert(variable) {
                        let message = match operation_name {
                            Some(operation_name) => format!(
                                "Variable \"${variable}\" is not defined by operation \"{operation_name}\""
                            ),
                            None => format!("Variable \"${variable}\" is not defined"),
                        };
                        ctx.report_error(vec![*pos, *operation_pos], message);
                    }
                }
            }
        }
    }
}
