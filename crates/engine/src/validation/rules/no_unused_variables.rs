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

/// Every variable an operation declares must be used somewhere reachable
/// from it. Diagnostics come out in declaration order.
#[derive(Default)]
pub struct NoUnusedVariables<'a> {
    defined_variables: Vec<(Option<&'a str>, Vec<(&'a str, Pos)>)>,
    used_variables: HashMap<Scope<'a>, HashSet<&'a str>>,
    spreads: HashMap<Scope<'a>, Vec<&'a str>>,
    current_scope: Option<Scope<'a>>,
}

impl<'a> Visitor<'a> for NoUnusedVariables<'a> {
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
        self.defined_variables.push((
            name,
            operation
                .node
                .variable_definitions
                .iter()
                .map(|variable_definition| {
                    (
                        variable_definition.node.name.node.as_str(),
                        variable_definition.pos,
                    )
                })
                .collect(),
        ));
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
            self.used_variables
                .entry(scope)
                .or_default()
                .extend(referenced_variables(&value.node));
        }
    }

    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, _doc: &'a Document) {
        for (operation_name, defined) in &self.defined_variables {
            let reachable = reachable_scopes(Scope::Operation(*operation_name), &self.spreads);
            let used: HashSet<&str> = reachable
                .iter()
                .filter_map(|scope| self.used_variables.get(scope))
                .flatten()
                .copied()
                .collect();

            for (variable, pos) in defined {
                if !used.contains(variable) {
                    let message = match operation_name {
                        Some(operation_name) => format!(
                            "Variable \"${variable}\" is not used by operation \"{operation_name}\""
                        ),
                        None => format!("Variable \"${variable}\" is not used"),
                    };
                    ctx.report_error(vec![*pos], message);
                }
            }
        }
    }
}
