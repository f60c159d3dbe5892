use std::collections::HashMap;

use bracken_parser::{types::FragmentDefinition, Pos, Positioned};

use crate::validation::visitor::{Visitor, VisitorContext};

/// Fragment names must be unique within a document.
#[derive(Default)]
pub struct UniqueFragmentNames<'a> {
    names: HashMap<&'a str, Pos>,
}

impl<'a> Visitor<'a> for UniqueFragmentNames<'a> {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        let name = fragment.node.name.node.as_str();
        match self.names.get(name) {
            Some(first) => ctx.report_error(
                vec![*first, fragment.pos],
                format!("There can be only one fragment named \"{name}\""),
            ),
            None => {
                self.names.insert(name, fragment.pos);
            }
        }
    }
}
