use bracken_parser::{
    types::{FragmentDefinition, InlineFragment},
    Positioned,
};

use crate::validation::visitor::{Visitor, VisitorContext};

/// Fragment type conditions must name composite types; conditioning on a
/// scalar or enum can never select anything.
pub struct FragmentsOnCompositeTypes;

impl<'a> Visitor<'a> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        if let Some(current_type) = ctx.current_type() {
            if !current_type.is_composite() {
                ctx.report_error(
                    vec![fragment.pos],
                    format!(
                        "Fragment \"{}\" cannot condition on non composite type \"{}\"",
                        fragment.node.name.node,
                        fragment.node.type_condition.node.on.node
                    ),
                );
            }
        }
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        inline_fragment: &'a Positioned<InlineFragment>,
    ) {
        if let (Some(condition), Some(current_type)) = (
            &inline_fragment.node.type_condition,
            ctx.current_type(),
        ) {
            if !current_type.is_composite() {
                ctx.report_error(
                    vec![inline_fragment.pos],
                    format!(
                        "Fragment cannot condition on non composite type \"{}\"",
                        condition.node.on.node
                    ),
                );
            }
        }
    }
}
