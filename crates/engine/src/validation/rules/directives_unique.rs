use std::collections::HashMap;

use bracken_parser::{
    types::{Directive, FragmentDefinition, OperationDefinition, Selection},
    Pos, Positioned,
};

use crate::validation::visitor::{Visitor, VisitorContext};

/// A directive may appear at most once per location.
pub struct DirectivesUnique;

fn check_duplicates(ctx: &mut VisitorContext<'_>, directives: &[Positioned<Directive>]) {
    let mut seen: HashMap<&str, Pos> = HashMap::new();
    for directive in directives {
        let name = directive.node.name.node.as_str();
        match seen.get(name) {
            Some(first) => ctx.report_error(
                vec![*first, directive.pos],
                format!("Directive \"{name}\" can only be used once at this location"),
            ),
            None => {
                seen.insert(name, directive.pos);
            }
        }
    }
}

impl<'a> Visitor<'a> for DirectivesUnique {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        check_duplicates(ctx, &operation.node.directives);
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        check_duplicates(ctx, &fragment.node.directives);
    }

    fn enter_selection(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        selection: &'a Positioned<Selection>,
    ) {
        check_duplicates(ctx, selection.node.directives());
    }
}
