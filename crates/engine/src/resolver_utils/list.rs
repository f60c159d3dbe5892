//! List completion.

use async_graphql_value::ConstValue;
use bracken_parser::{types::Field, Positioned};
use futures_util::future::join_all;

use super::field::complete_value;
use crate::{
    context::{ContextExt, ContextField},
    error::{ErrorKind, ServerError, ServerResult},
    query_path::QueryPath,
    registry::{MetaTypeName, ResolvedValue},
};

/// Complete a list value element-wise, each element under its index in the
/// response path. A failing element of a non-null element type nullifies
/// the whole list; failures of nullable elements become null entries with
/// a recorded error.
pub(crate) async fn complete_list<'a>(
    ctx_field: &ContextField<'a>,
    element_type: &str,
    field_nodes: &[&'a Positioned<Field>],
    value: ResolvedValue,
    path: &QueryPath,
) -> ServerResult<ConstValue> {
    let items = match value.take() {
        serde_json::Value::Array(items) => items,
        // Strings are not iterables here.
        other => {
            return Err(ServerError::new(
                format!(
                    "Expected a list for field `{}`, found {}",
                    ctx_field.item.node.name.node,
                    json_kind_str(&other)
                ),
                ErrorKind::ListExpected,
                Some(ctx_field.item.pos),
            )
            .with_path(path.clone()));
        }
    };

    let futures = items.into_iter().enumerate().map(|(index, item)| {
        let element_path = path.child(index);
        async move {
            complete_value(
                ctx_field,
                element_type,
                field_nodes,
                ResolvedValue::new(item),
                &element_path,
            )
            .await
        }
    });
    let results = join_all(futures).await;

    let element_is_non_null = MetaTypeName::create(element_type).is_non_null();
    let mut completed = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(value) => completed.push(value),
            Err(error) if !element_is_non_null => {
                ctx_field.add_error(error);
                completed.push(ConstValue::Null);
            }
            Err(error) => return Err(error),
        }
    }
    Ok(ConstValue::List(completed))
}

fn json_kind_str(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}
