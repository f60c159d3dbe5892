//! Selection-set execution.
//!
//! `collect_fields` flattens a selection set into an ordered response-key
//! map, expanding fragments whose type condition applies and honouring
//! `@skip`/`@include`. Field entries execute concurrently for queries and
//! strictly in order for the mutation root; the response layout is fixed by
//! collection order before anything is scheduled.

use async_graphql_value::{ConstValue, Name};
use bracken_parser::{
    types::{Directive, Field, Selection, SelectionSet, Value},
    Pos, Positioned,
};
use futures_util::future::join_all;
use indexmap::IndexMap;

use super::field::resolve_field;
use crate::{
    context::{Context, ContextExt, ContextSelectionSet},
    error::{ErrorKind, ServerError, ServerResult},
    registry::{MetaType, Registry, ResolvedValue},
};

pub(crate) type FieldGroups<'a> = IndexMap<&'a str, Vec<&'a Positioned<Field>>>;

/// Execute a selection set against a concrete composite type, resolving
/// entries concurrently.
pub async fn resolve_container<'a>(
    ctx: &ContextSelectionSet<'a>,
    parent_value: &ResolvedValue,
) -> ServerResult<ConstValue> {
    execute_selection_sets(ctx, &[ctx.item], parent_value, false).await
}

/// Execute a selection set one entry at a time, in collection order. Used
/// for the mutation root, where each resolver completes before the next
/// starts.
pub async fn resolve_container_serial<'a>(
    ctx: &ContextSelectionSet<'a>,
    parent_value: &ResolvedValue,
) -> ServerResult<ConstValue> {
    execute_selection_sets(ctx, &[ctx.item], parent_value, true).await
}

/// Execute several co-resident selection sets (field nodes merged under one
/// response key) as a single response object.
pub(crate) async fn execute_selection_sets<'a>(
    ctx: &ContextSelectionSet<'a>,
    selection_sets: &[&'a Positioned<SelectionSet>],
    parent_value: &ResolvedValue,
    serial: bool,
) -> ServerResult<ConstValue> {
    let mut groups = FieldGroups::new();
    let mut visited_fragments = std::collections::HashSet::new();
    for selection_set in selection_sets.iter().copied() {
        collect_fields(ctx, selection_set, &mut groups, &mut visited_fragments)?;
    }

    let first_pos = selection_sets.first().map(|set| set.pos);
    let mut response = IndexMap::with_capacity(groups.len());

    if ctx.is_canceled() {
        ctx.add_error(canceled_error(ctx, first_pos));
        return Ok(ConstValue::Object(response));
    }

    if serial {
        for (response_key, field_nodes) in &groups {
            if ctx.is_canceled() {
                ctx.add_error(canceled_error(ctx, first_pos));
                break;
            }
            let value = resolve_field(ctx, field_nodes, parent_value).await?;
            response.insert(Name::new(response_key), value);
        }
    } else {
        let futures = groups
            .iter()
            .map(|(_, field_nodes)| resolve_field(ctx, field_nodes, parent_value));
        let results = join_all(futures).await;
        for ((response_key, _), result) in groups.iter().zip(results) {
            response.insert(Name::new(response_key), result?);
        }
    }

    Ok(ConstValue::Object(response))
}

fn canceled_error(ctx: &ContextSelectionSet<'_>, pos: Option<Pos>) -> ServerError {
    ctx.set_error_path(ServerError::new(
        "Request was canceled",
        ErrorKind::Canceled,
        pos,
    ))
}

/// CollectFields over one selection set, appending into `groups` so merged
/// selection sets share one response layout.
fn collect_fields<'a>(
    ctx: &ContextSelectionSet<'a>,
    selection_set: &'a Positioned<SelectionSet>,
    groups: &mut FieldGroups<'a>,
    visited_fragments: &mut std::collections::HashSet<&'a str>,
) -> ServerResult<()> {
    for selection in &selection_set.node.items {
        if is_skipped(ctx, selection.node.directives())? {
            continue;
        }
        match &selection.node {
            Selection::Field(field) => {
                groups
                    .entry(field.node.response_key().node.as_str())
                    .or_default()
                    .push(field);
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.node.fragment_name.node.as_str();
                if !visited_fragments.insert(name) {
                    continue;
                }
                let Some(fragment) = ctx.get_fragment(name) else {
                    return Err(ServerError::new(
                        format!("Unknown fragment \"{name}\""),
                        ErrorKind::Internal,
                        Some(spread.pos),
                    ));
                };
                if type_condition_applies(
                    ctx.registry(),
                    ctx.ty,
                    fragment.node.type_condition.node.on.node.as_str(),
                ) {
                    collect_fields(ctx, &fragment.node.selection_set, groups, visited_fragments)?;
                }
            }
            Selection::InlineFragment(inline) => {
                let applies = match &inline.node.type_condition {
                    Some(condition) => type_condition_applies(
                        ctx.registry(),
                        ctx.ty,
                        condition.node.on.node.as_str(),
                    ),
                    None => true,
                };
                if applies {
                    collect_fields(ctx, &inline.node.selection_set, groups, visited_fragments)?;
                }
            }
        }
    }
    Ok(())
}

/// A type condition applies when it names the concrete type itself, an
/// interface it implements, or a union it belongs to.
fn type_condition_applies(registry: &Registry, ty: &MetaType, condition: &str) -> bool {
    if ty.name() == condition {
        return true;
    }
    registry
        .lookup_type(condition)
        .map(|condition_type| condition_type.is_possible_type(ty.name()))
        .unwrap_or(false)
}

/// Evaluate `@skip`/`@include`; `@skip(if: true)` wins over
/// `@include(if: true)`.
fn is_skipped(
    ctx: &ContextSelectionSet<'_>,
    directives: &[Positioned<Directive>],
) -> ServerResult<bool> {
    if let Some(condition) = directive_condition(ctx, directives, "skip")? {
        if condition {
            return Ok(true);
        }
    }
    if let Some(condition) = directive_condition(ctx, directives, "include")? {
        if !condition {
            return Ok(true);
        }
    }
    Ok(false)
}

fn directive_condition(
    ctx: &ContextSelectionSet<'_>,
    directives: &[Positioned<Directive>],
    name: &str,
) -> ServerResult<Option<bool>> {
    let Some(directive) = directives
        .iter()
        .find(|directive| directive.node.name.node.as_str() == name)
    else {
        return Ok(None);
    };
    let condition = directive.node.get_argument("if");
    let value = match condition.map(|value| &value.node) {
        Some(Value::Boolean(boolean)) => Some(*boolean),
        Some(Value::Variable(variable)) => match ctx.var_value(variable.as_str()) {
            ConstValue::Boolean(boolean) => Some(boolean),
            _ => None,
        },
        _ => None,
    };
    match value {
        Some(value) => Ok(Some(value)),
        // Validation guarantees a Boolean! here; anything else is a bug.
        None => Err(ServerError::new(
            format!("Directive @{name} expects a Boolean `if` argument"),
            ErrorKind::Internal,
            Some(directive.pos),
        )),
    }
}
