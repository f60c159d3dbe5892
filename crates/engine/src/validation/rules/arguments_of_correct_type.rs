use async_graphql_value::Name;
use bracken_parser::{
    types::{Directive, Field, Value},
    Positioned,
};
use indexmap::IndexMap;

use crate::{
    registry::MetaInputValue,
    validation::{
        utils::is_valid_literal_value,
        visitor::{Visitor, VisitorContext},
    },
};

/// Literal argument values must be accepted by the declared argument type.
#[derive(Default)]
pub struct ArgumentsOfCorrectType<'a> {
    current_args: Option<&'a IndexMap<String, MetaInputValue>>,
}

impl<'a> Visitor<'a> for ArgumentsOfCorrectType<'a> {
    fn enter_directive(&mut self, ctx: &mut VisitorContext<'a>, directive: &'a Positioned<Directive>) {
        self.current_args = ctx
            .registry
            .directive(directive.node.name.node.as_str())
            .map(|directive_def| &directive_def.args);
    }

    fn exit_directive(&mut self, _ctx: &mut VisitorContext<'a>, _directive: &'a Positioned<Directive>) {
        self.current_args = None;
    }

    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        self.current_args = ctx
            .parent_type()
            .and_then(|ty| ty.field_by_name(field.node.name.node.as_str()))
            .map(|field_def| &field_def.args);
    }

    fn exit_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {
        self.current_args = None;
    }

    fn enter_argument(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Positioned<Name>,
        value: &'a Positioned<Value>,
    ) {
        let Some(argument) = self
            .current_args
            .and_then(|args| args.get(name.node.as_str()))
        else {
            return;
        };

        if let Some(reason) =
            is_valid_literal_value(ctx.registry, argument.ty.as_str(), &value.node)
        {
            ctx.report_error(
                vec![value.pos],
                format!(
                    "Invalid value for argument \"{}\" of type \"{}\", found {}: {reason}",
                    argument.name, argument.ty, value.node
                ),
            );
        }
    }
}
