use bracken_parser::{
    types::{Document, OperationDefinition},
    Positioned,
};

use crate::validation::visitor::{Visitor, VisitorContext};

/// If any operation is unnamed, it must be the only operation in the
/// document.
#[derive(Default)]
pub struct LoneAnonymousOperation {
    operation_count: usize,
}

impl<'a> Visitor<'a> for LoneAnonymousOperation {
    fn enter_document(&mut self, _ctx: &mut VisitorContext<'a>, doc: &'a Document) {
        self.operation_count = doc.operations.len();
    }

    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        if operation.node.name.is_none() && self.operation_count > 1 {
            ctx.report_error(
                vec![operation.pos],
                "This anonymous operation must be the only defined operation",
            );
        }
    }
}
