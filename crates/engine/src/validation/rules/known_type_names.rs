use bracken_parser::{
    types::{FragmentDefinition, InlineFragment, VariableDefinition},
    Pos, Positioned,
};

use crate::validation::visitor::{Visitor, VisitorContext};

/// Every named type reference in the document must resolve in the schema.
pub struct KnownTypeNames;

fn check_known(ctx: &mut VisitorContext<'_>, name: &str, pos: Pos) {
    if ctx.registry.lookup_type(name).is_none() {
        ctx.report_error(vec![pos], format!("Unknown type \"{name}\""));
    }
}

impl<'a> Visitor<'a> for KnownTypeNames {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        let condition = &fragment.node.type_condition;
        check_known(ctx, condition.node.on.node.as_str(), condition.pos);
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        variable_definition: &'a Positioned<VariableDefinition>,
    ) {
        let var_type = &variable_definition.node.var_type;
        check_known(ctx, var_type.node.named_type().as_str(), var_type.pos);
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        inline_fragment: &'a Positioned<InlineFragment>,
    ) {
        if let Some(condition) = &inline_fragment.node.type_condition {
            check_known(ctx, condition.node.on.node.as_str(), condition.pos);
        }
    }
}
