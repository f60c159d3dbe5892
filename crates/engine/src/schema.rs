//! The schema handle and the request pipeline.

use std::{any::Any, collections::HashMap, sync::Arc};

use async_graphql_value::{ConstValue, Name};
use bracken_parser::{
    parse_query,
    types::{OperationDefinition, OperationType},
    Positioned,
};

use crate::{
    context::{Data, QueryEnv, QueryEnvInner, SchemaEnv},
    error::{ErrorKind, ServerError},
    introspection,
    registry::{MetaType, Registry, ResolvedValue},
    request::Request,
    resolver_utils::{resolve_container, resolve_container_serial},
    response::Response,
    validation::check_rules,
    variables::coerce_variables,
};

/// The registry failed its invariants while building the schema.
#[derive(Debug, thiserror::Error)]
#[error("invalid schema: {}", .0.join("; "))]
pub struct SchemaError(pub Vec<String>);

/// Finishes a [`Registry`] into an executable [`Schema`].
pub struct SchemaBuilder {
    registry: Registry,
    data: Data,
}

impl SchemaBuilder {
    /// Attach schema-scoped data available to every request.
    #[must_use]
    pub fn data<D: Any + Send + Sync>(mut self, data: D) -> Self {
        self.data.insert(data);
        self
    }

    /// Derive interface membership, graft introspection onto the roots and
    /// verify the registry invariants.
    pub fn finish(mut self) -> Result<Schema, SchemaError> {
        let implementations: Vec<(String, String)> = self
            .registry
            .types
            .values()
            .filter_map(|ty| match ty {
                MetaType::Object(object) => Some(
                    object
                        .implements
                        .iter()
                        .map(|interface| (interface.clone(), object.name.clone()))
                        .collect::<Vec<_>>(),
                ),
                _ => None,
            })
            .flatten()
            .collect();
        for (interface_name, object_name) in implementations {
            if let Some(MetaType::Interface(interface)) =
                self.registry.types.get_mut(&interface_name)
            {
                interface.possible_types.insert(object_name);
            }
        }

        introspection::register_introspection_types(&mut self.registry);

        self.registry.check().map_err(SchemaError)?;

        Ok(Schema(SchemaEnv::new(self.registry, self.data)))
    }
}

/// An executable GraphQL schema. Built once, then shared freely; requests
/// never mutate it.
#[derive(Clone)]
pub struct Schema(SchemaEnv);

impl Schema {
    pub fn build(registry: Registry) -> SchemaBuilder {
        SchemaBuilder {
            registry,
            data: Data::default(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.0.registry
    }

    /// Execute a request: parse, validate, coerce variables, then walk the
    /// operation's selection set against the matching root.
    pub async fn execute(&self, request: impl Into<Request>) -> Response {
        let request = request.into();
        let span = tracing::debug_span!(
            "graphql_execute",
            operation_name = request.operation_name.as_deref().unwrap_or_default()
        );
        let _enter = span.enter();

        let doc = match parse_query(&request.query) {
            Ok(doc) => doc,
            Err(error) => return Response::from_errors(vec![error.into()]),
        };

        let operation = match select_operation(&doc.operations, request.operation_name.as_deref())
        {
            Ok(operation) => operation,
            Err(error) => return Response::from_errors(vec![error]),
        };

        if let Err(errors) = check_rules(
            &self.0.registry,
            &doc,
            Some(&request.variables),
            request.fail_fast,
        ) {
            return Response::from_errors(
                errors
                    .into_iter()
                    .map(|error| {
                        ServerError::new(error.message, ErrorKind::Validation, None)
                            .with_locations(error.locations)
                    })
                    .collect(),
            );
        }

        if request.cancellation.is_canceled() {
            return Response::from_errors(vec![ServerError::new(
                "Request was canceled",
                ErrorKind::Canceled,
                Some(operation.pos),
            )]);
        }

        let variables =
            match coerce_variables(&self.0.registry, &operation.node, &request.variables) {
                Ok(variables) => variables,
                Err(errors) => return Response::from_errors(errors),
            };

        let operation_type = operation.node.ty;
        let root = match operation_type {
            OperationType::Query => Some(self.0.registry.query_root()),
            OperationType::Mutation => self.0.registry.mutation_root(),
            OperationType::Subscription => self.0.registry.subscription_root(),
        };
        let Some(root) = root else {
            // The validator already rejects operations without a configured
            // root; reaching this point is a bug.
            return Response::from_errors(vec![ServerError::new(
                format!("Schema is not configured for {operation_type}s"),
                ErrorKind::Internal,
                Some(operation.pos),
            )]);
        };

        let env = QueryEnv::new(QueryEnvInner {
            operation: operation.clone(),
            operation_name: request.operation_name.clone(),
            fragments: fragment_table(&doc),
            variables,
            ctx_data: Arc::new(request.data),
            errors: Default::default(),
            cancellation: request.cancellation.clone(),
        });

        let ctx = env.create_context(&self.0, &env.operation.node.selection_set, root);
        let root_value = ResolvedValue::new(serde_json::Value::Null);

        let result = match operation_type {
            OperationType::Mutation => resolve_container_serial(&ctx, &root_value).await,
            _ => resolve_container(&ctx, &root_value).await,
        };

        let mut errors = env.take_errors();
        match result {
            Ok(data) => Response::new(data, errors),
            Err(error) => {
                errors.push(error);
                Response::new(ConstValue::Null, errors)
            }
        }
    }
}

fn select_operation<'a>(
    operations: &'a [Positioned<OperationDefinition>],
    operation_name: Option<&str>,
) -> Result<&'a Positioned<OperationDefinition>, ServerError> {
    match operation_name {
        Some(name) => operations
            .iter()
            .find(|operation| {
                operation
                    .node
                    .name
                    .as_ref()
                    .is_some_and(|operation_name| operation_name.node.as_str() == name)
            })
            .ok_or_else(|| {
                ServerError::new(
                    format!("Unknown operation named \"{name}\""),
                    ErrorKind::AmbiguousOperation,
                    operations.first().map(|operation| operation.pos),
                )
            }),
        None => match operations {
            [operation] => Ok(operation),
            _ => Err(ServerError::new(
                "Operation name required when the document defines multiple operations",
                ErrorKind::AmbiguousOperation,
                operations.first().map(|operation| operation.pos),
            )),
        },
    }
}

fn fragment_table(
    doc: &bracken_parser::types::Document,
) -> HashMap<Name, Positioned<bracken_parser::types::FragmentDefinition>> {
    let mut fragments = HashMap::new();
    for fragment in &doc.fragments {
        fragments
            .entry(fragment.node.name.node.clone())
            .or_insert_with(|| fragment.clone());
    }
    fragments
}
