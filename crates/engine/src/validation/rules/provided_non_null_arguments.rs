use bracken_parser::{
    types::{Directive, Field},
    Positioned,
};

use crate::validation::visitor::{Visitor, VisitorContext};

/// Non-null arguments without defaults must be supplied on fields and
/// directives.
pub struct ProvidedNonNullArguments;

impl<'a> Visitor<'a> for ProvidedNonNullArguments {
    fn enter_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Positioned<Directive>,
    ) {
        let Some(directive_def) = ctx.registry.directive(directive.node.name.node.as_str())
        else {
            return;
        };
        for argument in directive_def.args.values() {
            if argument.ty.is_non_null()
                && argument.default_value.is_none()
                && directive.node.get_argument(&argument.name).is_none()
            {
                ctx.report_error(
                    vec![directive.pos],
                    format!(
                        "Directive \"@{}\" argument \"{}\" of type \"{}\" is required but not provided",
                        directive.node.name.node, argument.name, argument.ty
                    ),
                );
            }
        }
    }

    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        let Some(field_def) = ctx
            .parent_type()
            .and_then(|ty| ty.field_by_name(field.node.name.node.as_str()))
        else {
            return;
        };
        for argument in field_def.args.values() {
            if argument.ty.is_non_null()
                && argument.default_value.is_none()
                && field.node.get_argument(&argument.name).is_none()
            {
                ctx.report_error(
                    vec![field.pos],
                    format!(
                        "Field \"{}\" argument \"{}\" of type \"{}\" is required but not provided",
                        field.node.name.node, argument.name, argument.ty
                    ),
                );
            }
        }
    }
}
