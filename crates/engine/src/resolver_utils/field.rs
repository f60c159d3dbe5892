//! Field execution and value completion.

use async_graphql_value::{ConstValue, Name};
use async_recursion::async_recursion;
use bracken_parser::{types::Field, types::Value, Positioned};
use indexmap::IndexMap;

use super::{
    container::execute_selection_sets,
    input::{resolve_input, InputResolveMode},
    list::complete_list,
};
use crate::{
    context::{Context, ContextExt, ContextField, ContextSelectionSet},
    error::{ErrorKind, ServerError, ServerResult},
    query_path::QueryPath,
    registry::{MetaType, MetaTypeName, ResolvedValue, ResolverContext},
};

/// Resolve one response entry: run the resolver of the first field node and
/// complete its value under the declared type. Field errors on nullable
/// fields are absorbed here; non-null failures propagate to the caller.
pub(crate) async fn resolve_field<'a>(
    ctx: &ContextSelectionSet<'a>,
    field_nodes: &[&'a Positioned<Field>],
    parent_value: &ResolvedValue,
) -> ServerResult<ConstValue> {
    let first = field_nodes[0];
    let field_name = first.node.name.node.as_str();

    if field_name == "__typename" {
        return Ok(ConstValue::String(ctx.ty.name().to_string()));
    }

    let Some(field_def) = ctx.ty.field_by_name(field_name) else {
        // Validation rejects unknown fields up front; anything that still
        // lands here resolves to null for introspection compatibility.
        return Ok(ConstValue::Null);
    };

    let ctx_field = ctx.with_field(first, field_def);

    let completed = match coerce_arguments(&ctx_field) {
        Ok(args) => {
            let resolver_ctx = ResolverContext {
                registry: ctx_field.registry(),
                parent_type: ctx.ty,
                field: field_def,
                field_ast: first,
                args: &args,
                parent_value,
                variables: &ctx_field.query_env.variables,
                data: &ctx_field.query_env.ctx_data,
                cancellation: &ctx_field.query_env.cancellation,
            };
            match field_def.resolver.resolve(resolver_ctx).await {
                Ok(resolved) => {
                    let path = ctx_field.path.clone();
                    complete_value(&ctx_field, field_def.ty.as_str(), field_nodes, resolved, &path)
                        .await
                }
                Err(error) => Err(ctx_field
                    .set_error_path(error.into_server_error(ErrorKind::Resolver, first.pos))),
            }
        }
        Err(error) => Err(error),
    };

    match completed {
        Ok(value) => Ok(value),
        Err(error) if field_def.ty.is_nullable() => {
            ctx_field.add_error(error);
            Ok(ConstValue::Null)
        }
        Err(error) => Err(error),
    }
}

/// Coerce the declared arguments from the field node, substituting
/// variables into literals first.
fn coerce_arguments<'a>(
    ctx_field: &ContextField<'a>,
) -> ServerResult<IndexMap<Name, ConstValue>> {
    let mut args = IndexMap::with_capacity(ctx_field.field.args.len());
    for meta_input in ctx_field.field.args.values() {
        let literal = ctx_field.item.node.get_argument(&meta_input.name);
        let value: Option<ConstValue> = match literal {
            None => None,
            // A bare variable that was never provided counts as an
            // unsupplied argument, not as null.
            Some(positioned) => match &positioned.node {
                Value::Variable(name) => ctx_field
                    .query_env
                    .variables
                    .get(name.as_str())
                    .cloned(),
                node => Some(
                    node.clone()
                        .into_const_with(|name| {
                            Ok::<_, ServerError>(ctx_field.var_value(name.as_str()))
                        })?,
                ),
            },
        };
        match resolve_input(
            ctx_field.registry(),
            &meta_input.name,
            meta_input,
            value,
            InputResolveMode::Literal,
        ) {
            Ok(Some(coerced)) => {
                args.insert(Name::new(&meta_input.name), coerced);
            }
            Ok(None) => {}
            Err(error) => {
                let pos = literal
                    .map(|literal| literal.pos)
                    .unwrap_or(ctx_field.item.pos);
                return Err(ctx_field
                    .set_error_path(error.into_server_error(ErrorKind::LiteralCoercion, pos)));
            }
        }
    }
    Ok(args)
}

/// CompleteValue: turn a resolver value into the response representation of
/// the declared type, enforcing nullability and list semantics.
#[async_recursion]
pub(crate) async fn complete_value<'a>(
    ctx_field: &ContextField<'a>,
    type_name: &str,
    field_nodes: &[&'a Positioned<Field>],
    value: ResolvedValue,
    path: &QueryPath,
) -> ServerResult<ConstValue> {
    match MetaTypeName::create(type_name) {
        MetaTypeName::NonNull(inner) => {
            if value.is_null() {
                Err(ServerError::new(
                    format!(
                        "An error occurred while fetching `{}`, a non-nullable value was expected but no value was found",
                        ctx_field.item.node.name.node
                    ),
                    ErrorKind::NonNullViolation,
                    Some(ctx_field.item.pos),
                )
                .with_path(path.clone()))
            } else {
                complete_value(ctx_field, inner, field_nodes, value, path).await
            }
        }
        _ if value.is_null() => Ok(ConstValue::Null),
        MetaTypeName::List(inner) => {
            complete_list(ctx_field, inner, field_nodes, value, path).await
        }
        MetaTypeName::Named(name) => {
            let Some(ty) = ctx_field.registry().lookup_type(name) else {
                return Err(ServerError::new(
                    format!("Unknown return type \"{name}\""),
                    ErrorKind::Internal,
                    Some(ctx_field.item.pos),
                )
                .with_path(path.clone()));
            };
            match ty {
                MetaType::Scalar(scalar) => {
                    crate::registry::scalars::serialize_scalar(scalar, value.take()).map_err(
                        |error| {
                            ServerError::new(
                                error.message,
                                ErrorKind::Serialization,
                                Some(ctx_field.item.pos),
                            )
                            .with_path(path.clone())
                        },
                    )
                }
                MetaType::Enum(enum_type) => {
                    crate::registry::scalars::serialize_enum(enum_type, value.take()).map_err(
                        |error| {
                            ServerError::new(
                                error.message,
                                ErrorKind::Serialization,
                                Some(ctx_field.item.pos),
                            )
                            .with_path(path.clone())
                        },
                    )
                }
                MetaType::Object(_) => {
                    resolve_object(ctx_field, ty, field_nodes, value, path).await
                }
                MetaType::Interface(_) | MetaType::Union(_) => {
                    let concrete = resolve_concrete_type(ctx_field, ty, &value, path)?;
                    resolve_object(ctx_field, concrete, field_nodes, value, path).await
                }
                MetaType::InputObject(_) => Err(ServerError::new(
                    format!("Input object \"{name}\" cannot be used as an output type"),
                    ErrorKind::Internal,
                    Some(ctx_field.item.pos),
                )
                .with_path(path.clone())),
            }
        }
    }
}

/// Resolve the concrete object type behind an abstract return type, via the
/// type's resolver or the conventional `__typename` discriminator on the
/// value.
fn resolve_concrete_type<'a>(
    ctx_field: &ContextField<'a>,
    abstract_type: &'a MetaType,
    value: &ResolvedValue,
    path: &QueryPath,
) -> ServerResult<&'a MetaType> {
    let resolve_type = match abstract_type {
        MetaType::Interface(interface) => interface.resolve_type,
        MetaType::Union(union_type) => union_type.resolve_type,
        _ => None,
    };
    let concrete_name = resolve_type
        .and_then(|resolve| resolve(value.data_resolved()))
        .or_else(|| {
            value
                .data_resolved()
                .get("__typename")
                .and_then(|name| name.as_str())
                .map(str::to_string)
        });

    let abstract_error = |message: String| {
        ServerError::new(message, ErrorKind::AbstractResolution, Some(ctx_field.item.pos))
            .with_path(path.clone())
    };

    let concrete_name = concrete_name.ok_or_else(|| {
        abstract_error(format!(
            "Abstract type \"{}\" must resolve to an object type at runtime",
            abstract_type.name()
        ))
    })?;

    let concrete = ctx_field
        .registry()
        .lookup_type(&concrete_name)
        .filter(|ty| matches!(ty, MetaType::Object(_)))
        .ok_or_else(|| {
            abstract_error(format!(
                "Abstract type \"{}\" resolved to unknown object type \"{concrete_name}\"",
                abstract_type.name()
            ))
        })?;

    if !abstract_type.is_possible_type(concrete.name()) {
        return Err(abstract_error(format!(
            "Type \"{concrete_name}\" is not a possible type of \"{}\"",
            abstract_type.name()
        )));
    }
    Ok(concrete)
}

/// Collect the sub-selections of every field node under this response key
/// and execute them as one selection set against `ty`.
async fn resolve_object<'a>(
    ctx_field: &ContextField<'a>,
    ty: &'a MetaType,
    field_nodes: &[&'a Positioned<Field>],
    value: ResolvedValue,
    path: &QueryPath,
) -> ServerResult<ConstValue> {
    let selection_sets: Vec<_> = field_nodes
        .iter()
        .map(|field| &field.node.selection_set)
        .collect();
    let ctx_selection_set = ctx_field.with_selection_set(ty, path.clone());
    execute_selection_sets(&ctx_selection_set, &selection_sets, &value, false).await
}
