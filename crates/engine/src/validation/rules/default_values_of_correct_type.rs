use bracken_parser::{types::VariableDefinition, Positioned};

use crate::validation::{
    utils::is_valid_literal_value,
    visitor::{Visitor, VisitorContext},
};

/// Variable default values must match the declared type, and non-null
/// variables may not declare defaults at all.
pub struct DefaultValuesOfCorrectType;

impl<'a> Visitor<'a> for DefaultValuesOfCorrectType {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        variable_definition: &'a Positioned<VariableDefinition>,
    ) {
        let Some(default_value) = &variable_definition.node.default_value else {
            return;
        };
        let var_type = &variable_definition.node.var_type.node;

        if !var_type.nullable {
            ctx.report_error(
                vec![variable_definition.pos],
                format!(
                    "Variable \"${}\" of type \"{var_type}\" is required and cannot have a default value",
                    variable_definition.node.name.node
                ),
            );
            return;
        }

        if let Some(reason) =
            is_valid_literal_value(ctx.registry, &var_type.to_string(), &default_value.node)
        {
            ctx.report_error(
                vec![default_value.pos],
                format!(
                    "Invalid default value for variable \"{}\" of type \"{var_type}\", found {}: {reason}",
                    variable_definition.node.name.node, default_value.node
                ),
            );
        }
    }
}
