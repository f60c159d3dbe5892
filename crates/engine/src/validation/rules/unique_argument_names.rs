use std::collections::HashMap;

use async_graphql_value::Name;
use bracken_parser::{
    types::{Directive, Field, Value},
    Pos, Positioned,
};

use crate::validation::visitor::{Visitor, VisitorContext};

/// Argument names must be unique per field or directive.
#[derive(Default)]
pub struct UniqueArgumentNames<'a> {
    names: HashMap<&'a str, Pos>,
}

impl<'a> Visitor<'a> for UniqueArgumentNames<'a> {
    fn enter_directive(&mut self, _ctx: &mut VisitorContext<'a>, _directive: &'a Positioned<Directive>) {
        self.names.clear();
    }

    fn enter_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {
        self.names.clear();
    }

    fn enter_argument(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Positioned<Name>,
        _value: &'a Positioned<Value>,
    ) {
        match self.names.get(name.node.as_str()) {
            Some(first) => ctx.report_error(
                vec![*first, name.pos],
                format!("There can be only one argument named \"{}\"", name.node),
            ),
            None => {
                self.names.insert(name.node.as_str(), name.pos);
            }
        }
    }
}
