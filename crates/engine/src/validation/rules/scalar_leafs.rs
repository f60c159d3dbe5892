use bracken_parser::{types::Field, Positioned};

use crate::validation::visitor::{Visitor, VisitorContext};

/// Leaf fields must not carry sub-selections; composite fields must.
pub struct ScalarLeafs;

impl<'a> Visitor<'a> for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        // The field's own type was pushed by the walk; for unknown fields
        // there is nothing to check.
        let Some(ty) = ctx.current_type() else {
            return;
        };
        let field_name = &field.node.name.node;
        let has_selections = !field.node.selection_set.node.items.is_empty();

        if ty.is_leaf() && has_selections {
            ctx.report_error(
                vec![field.pos],
                format!(
                    "Field \"{field_name}\" must not have a selection since type \"{}\" has no subfields",
                    ty.name()
                ),
            );
        } else if !ty.is_leaf() && !has_selections {
            ctx.report_error(
                vec![field.pos],
                format!(
                    "Field \"{field_name}\" of type \"{}\" must have a selection of subfields. Did you mean \"{field_name} {{ ... }}\"?",
                    ty.name()
                ),
            );
        }
    }
}
