use std::collections::HashMap;

use bracken_parser::{
    types::{Document, FragmentDefinition, FragmentSpread, OperationDefinition},
    Pos, Positioned,
};

use crate::validation::{
    utils::{reachable_scopes, Scope},
    visitor::{Visitor, VisitorContext},
};

/// Every fragment definition must be reachable from some operation.
#[derive(Default)]
pub struct NoUnusedFragments<'a> {
    operations: Vec<Option<&'a str>>,
    defined_fragments: Vec<(&'a str, Pos)>,
    spreads: HashMap<Scope<'a>, Vec<&'a str>>,
    current_scope: Option<Scope<'a>>,
}

impl<'a> Visitor<'a> for NoUnusedFragments<'a> {
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
        self.operations.push(name);
    }

    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        let name = fragment.node.name.node.as_str();
        self.current_scope = Some(Scope::Fragment(name));
        self.defined_fragments.push((name, fragment.pos));
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

    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, _doc: &'a Document) {
        let mut reachable = std::collections::HashSet::new();
        for operation_name in &self.operations {
            reachable.extend(reachable_scopes(
                Scope::Operation(*operation_name),
                &self.spreads,
            ));
        }

        for (fragment, pos) in &self.defined_fragments {
            if !reachable.contains(&Scope::Fragment(fragment)) {
                ctx.report_error(
                    vec![*pos],
                    format!("Fragment \"{fragment}\" is never used"),
                );
            }
        }
    }
}
