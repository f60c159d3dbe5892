use bracken_parser::{
    types::{
        Directive, Field, FragmentDefinition, InlineFragment, OperationDefinition, OperationType,
        Selection, VariableDefinition,
    },
    Positioned,
};

use crate::{
    registry::DirectiveLocation,
    validation::visitor::{Visitor, VisitorContext},
};

/// Directives must exist and be permitted at the location they appear in.
#[derive(Default)]
pub struct KnownDirectives {
    location_stack: Vec<DirectiveLocation>,
}

impl<'a> Visitor<'a> for KnownDirectives {
    fn enter_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        self.location_stack.push(match operation.node.ty {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        });
    }

    fn exit_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _operation: &'a Positioned<OperationDefinition>,
    ) {
        self.location_stack.pop();
    }

    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment: &'a Positioned<FragmentDefinition>,
    ) {
        self.location_stack.push(DirectiveLocation::FragmentDefinition);
    }

    fn exit_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment: &'a Positioned<FragmentDefinition>,
    ) {
        self.location_stack.pop();
    }

    fn enter_variable_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _variable_definition: &'a Positioned<VariableDefinition>,
    ) {
        self.location_stack.push(DirectiveLocation::VariableDefinition);
    }

    fn exit_variable_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _variable_definition: &'a Positioned<VariableDefinition>,
    ) {
        self.location_stack.pop();
    }

    fn enter_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {
        self.location_stack.push(DirectiveLocation::Field);
    }

    fn exit_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {
        self.location_stack.pop();
    }

    fn enter_selection(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        selection: &'a Positioned<Selection>,
    ) {
        if let Selection::FragmentSpread(_) = &selection.node {
            self.location_stack.push(DirectiveLocation::FragmentSpread);
        }
    }

    fn exit_selection(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        selection: &'a Positioned<Selection>,
    ) {
        if let Selection::FragmentSpread(_) = &selection.node {
            self.location_stack.pop();
        }
    }

    fn enter_inline_fragment(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _inline_fragment: &'a Positioned<InlineFragment>,
    ) {
        self.location_stack.push(DirectiveLocation::InlineFragment);
    }

    fn exit_inline_fragment(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _inline_fragment: &'a Positioned<InlineFragment>,
    ) {
        self.location_stack.pop();
    }

    fn enter_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Positioned<Directive>,
    ) {
        let name = directive.node.name.node.as_str();
        let Some(directive_def) = ctx.registry.directive(name) else {
            ctx.report_error(vec![directive.pos], format!("Unknown directive \"{name}\""));
            return;
        };
        if let Some(location) = self.location_stack.last() {
            if !directive_def.locations.contains(location) {
                ctx.report_error(
                    vec![directive.pos],
                    format!("Directive \"{name}\" may not be used on {location}"),
                );
            }
        }
    }
}
