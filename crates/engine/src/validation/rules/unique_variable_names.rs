use std::collections::HashMap;

use bracken_parser::{
    types::{OperationDefinition, VariableDefinition},
    Pos, Positioned,
};

use crate::validation::visitor::{Visitor, VisitorContext};

/// Variable names must be unique within one operation.
#[derive(Default)]
pub struct UniqueVariableNames<'a> {
    names: HashMap<&'a str, Pos>,
}

impl<'a> Visitor<'a> for UniqueVariableNames<'a> {
    fn enter_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _operation: &'a Positioned<OperationDefinition>,
    ) {
        self.names.clear();
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        variable_definition: &'a Positioned<VariableDefinition>,
    ) {
        let name = variable_definition.node.name.node.as_str();
        match self.names.get(name) {
            Some(first) => ctx.report_error(
                vec![*first, variable_definition.pos],
                format!("There can be only one variable named \"${name}\""),
            ),
            None => {
                self.names.insert(name, variable_definition.pos);
            }
        }
    }
}
