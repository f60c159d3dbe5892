use bracken_parser::{types::Field, Positioned};

use crate::{
    registry::MetaType,
    validation::{
        suggestion::make_suggestion,
        visitor::{Visitor, VisitorContext},
    },
};

/// Selected fields must exist on the containing type. Close misses get
/// type-condition and field-name suggestions.
pub struct FieldsOnCorrectType;

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        let Some(parent_type) = ctx.parent_type() else {
            return;
        };
        let field_name = field.node.name.node.as_str();
        if field_name.starts_with("__") || !parent_type.is_composite() {
            // Meta fields are handled by the executor; non-composite parents
            // are reported by other rules.
            return;
        }
        if parent_type.field_by_name(field_name).is_some() {
            return;
        }

        let mut message = format!(
            "Unknown field \"{field_name}\" on type \"{}\".",
            parent_type.name()
        );
        if let Some(suggestion) = suggest_types(ctx, parent_type, field_name) {
            message.push(' ');
            message.push_str(&suggestion);
        } else if let Some(suggestion) = make_suggestion(
            "Did you mean",
            parent_type
                .fields()
                .iter()
                .flat_map(|fields| fields.keys())
                .map(String::as_str),
            field_name,
        ) {
            message.push(' ');
            message.push_str(&suggestion);
        }
        ctx.report_error(vec![field.pos], message);
    }
}

/// For abstract parents, suggest the possible types that do declare the
/// field.
fn suggest_types(
    ctx: &VisitorContext<'_>,
    parent_type: &MetaType,
    field_name: &str,
) -> Option<String> {
    let possible_types = parent_type.possible_types()?;
    let candidates: Vec<&str> = possible_types
        .iter()
        .filter(|type_name| {
            ctx.registry
                .lookup_type(type_name)
                .and_then(|ty| ty.field_by_name(field_name))
                .is_some()
        })
        .map(String::as_str)
        .take(5)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let list = candidates
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("Did you mean to use an inline fragment on {list}?"))
}
