use std::collections::HashMap;

use bracken_parser::{types::OperationDefinition, Pos, Positioned};

use crate::validation::visitor::{Visitor, VisitorContext};

/// Named operations must be unique within a document.
#[derive(Default)]
pub struct UniqueOperationNames<'a> {
    names: HashMap<&'a str, Pos>,
}

impl<'a> Visitor<'a> for UniqueOperationNames<'a> {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        let Some(name) = &operation.node.name else {
            return;
        };
        match self.names.get(name.node.as_str()) {
            Some(first) => ctx.report_error(
                vec![*first, operation.pos],
                format!("There can be only one operation named \"{}\"", name.node),
            ),
            None => {
                self.names.insert(name.node.as_str(), operation.pos);
            }
        }
    }
}
