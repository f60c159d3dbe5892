use bracken_parser::{types::VariableDefinition, Positioned};

use crate::validation::visitor::{Visitor, VisitorContext};

/// Variables must be declared with input types: scalars, enums and input
/// objects, possibly wrapped.
pub struct VariablesAreInputTypes;

impl<'a> Visitor<'a> for VariablesAreInputTypes {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        variable_definition: &'a Positioned<VariableDefinition>,
    ) {
        let named_type = variable_definition.node.var_type.node.named_type();
        if let Some(ty) = ctx.registry.lookup_type(named_type.as_str()) {
            if !ty.is_input() {
                ctx.report_error(
                    vec![variable_definition.pos],
                    format!(
                        "Variable \"${}\" cannot be of non-input type \"{}\"",
                        variable_definition.node.name.node,
                        variable_definition.node.var_type.node
                    ),
                );
            }
        }
    }
}
