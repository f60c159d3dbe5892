use std::collections::HashMap;

use async_graphql_value::Name;
use bracken_parser::{
    types::{Value, VariableDefinition},
    Positioned,
};

use crate::validation::visitor::{Visitor, VisitorContext};

/// Input-object literals may not repeat a field name. Object literals are
/// pair lists in the AST precisely so both sites can be reported here.
pub struct UniqueInputFieldNames;

fn check_value(ctx: &mut VisitorContext<'_>, value: &Value) {
    match value {
        Value::List(items) => {
            for item in items {
                check_value(ctx, item);
            }
        }
        Value::Object(fields) => {
            let mut seen: HashMap<&str, &Positioned<Name>> = HashMap::new();
            for (name, field_value) in fields {
                match seen.get(name.node.as_str()) {
                    Some(first) => ctx.report_error(
                        vec![first.pos, name.pos],
                        format!("There can be only one input field named \"{}\"", name.node),
                    ),
                    None => {
                        seen.insert(name.node.as_str(), name);
                    }
                }
                check_value(ctx, field_value);
            }
        }
        _ => {}
    }
}

impl<'a> Visitor<'a> for UniqueInputFieldNames {
    fn enter_argument(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        _name: &'a Positioned<Name>,
        value: &'a Positioned<Value>,
    ) {
        check_value(ctx, &value.node);
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        variable_definition: &'a Positioned<VariableDefinition>,
    ) {
        if let Some(default_value) = &variable_definition.node.default_value {
            check_value(ctx, &default_value.node);
        }
    }
}
