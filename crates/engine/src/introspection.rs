//! Introspection support.
//!
//! The meta types (`__Schema`, `__Type`, …) are ordinary registry types
//! whose resolvers derive JSON values from the registry, so introspection
//! queries run through the same executor as everything else. Type
//! references travel between resolvers as `{"__ref": "<type string>"}` and
//! are unfolded one wrapper at a time by `__Type`'s resolvers.

use serde_json::{json, Value as Json};

use crate::registry::{
    Deprecation, EnumType, MetaEnumValue, MetaField, MetaInputValue, MetaType, ObjectType,
    Registry, ResolvedValue, Resolver, ResolverContext,
};

fn type_ref(ty: &str) -> Json {
    json!({ "__ref": ty })
}

fn parent_ref(ctx: &ResolverContext<'_>) -> Option<String> {
    ctx.parent_value
        .data_resolved()
        .get("__ref")
        .and_then(Json::as_str)
        .map(str::to_string)
}

fn deprecation_json(deprecation: &Deprecation) -> (bool, Json) {
    match deprecation {
        Deprecation::NoDeprecated => (false, Json::Null),
        Deprecation::Deprecated { reason } => (
            true,
            reason
                .as_deref()
                .map(|reason| Json::String(reason.to_string()))
                .unwrap_or(Json::Null),
        ),
    }
}

fn input_value_json(input: &MetaInputValue) -> Json {
    json!({
        "name": input.name,
        "description": input.description,
        "type": type_ref(input.ty.as_str()),
        "defaultValue": input
            .default_value
            .as_ref()
            .map(|value| Json::String(value.to_string()))
            .unwrap_or(Json::Null),
    })
}

fn field_json(field: &MetaField) -> Json {
    let (is_deprecated, deprecation_reason) = deprecation_json(&field.deprecation);
    json!({
        "name": field.name,
        "description": field.description,
        "args": field.args.values().map(input_value_json).collect::<Vec<_>>(),
        "type": type_ref(field.ty.as_str()),
        "isDeprecated": is_deprecated,
        "deprecationReason": deprecation_reason,
    })
}

fn include_deprecated(ctx: &ResolverContext<'_>) -> bool {
    matches!(
        ctx.arg("includeDeprecated"),
        Some(async_graphql_value::ConstValue::Boolean(true))
    )
}

fn resolved(value: Json) -> Result<ResolvedValue, crate::error::Error> {
    Ok(ResolvedValue::new(value))
}

/// Look up the meta type a `{"__ref": …}` parent points at.
fn parent_type<'a>(ctx: &ResolverContext<'a>) -> Option<&'a MetaType> {
    let reference = parent_ref(ctx)?;
    ctx.registry.lookup_type(&reference)
}

/// Register the meta types and graft `__schema` / `__type` onto the query
/// root. Called once while the schema is being built.
pub(crate) fn register_introspection_types(registry: &mut Registry) {
    registry.insert_type(EnumType::new(
        "__TypeKind",
        [
            MetaEnumValue::new("SCALAR"),
            MetaEnumValue::new("OBJECT"),
            MetaEnumValue::new("INTERFACE"),
            MetaEnumValue::new("UNION"),
            MetaEnumValue::new("ENUM"),
            MetaEnumValue::new("INPUT_OBJECT"),
            MetaEnumValue::new("LIST"),
            MetaEnumValue::new("NON_NULL"),
        ],
    ));

    registry.insert_type(EnumType::new(
        "__DirectiveLocation",
        [
            MetaEnumValue::new("QUERY"),
            MetaEnumValue::new("MUTATION"),
            MetaEnumValue::new("SUBSCRIPTION"),
            MetaEnumValue::new("FIELD"),
            MetaEnumValue::new("FRAGMENT_DEFINITION"),
            MetaEnumValue::new("FRAGMENT_SPREAD"),
            MetaEnumValue::new("INLINE_FRAGMENT"),
            MetaEnumValue::new("VARIABLE_DEFINITION"),
            MetaEnumValue::new("FIELD_DEFINITION"),
            MetaEnumValue::new("ENUM_VALUE"),
        ],
    ));

    registry.insert_type(
        ObjectType::new(
            "__Schema",
            [
                MetaField::new("types", "[__Type!]!").with_resolver(Resolver::from_fn(|ctx| {
                    resolved(Json::Array(
                        ctx.registry
                            .types
                            .keys()
                            .map(|name| type_ref(name))
                            .collect(),
                    ))
                })),
                MetaField::new("queryType", "__Type!").with_resolver(Resolver::from_fn(|ctx| {
                    resolved(type_ref(&ctx.registry.query_type))
                })),
                MetaField::new("mutationType", "__Type").with_resolver(Resolver::from_fn(|ctx| {
                    resolved(
                        ctx.registry
                            .mutation_type
                            .as_deref()
                            .map(type_ref)
                            .unwrap_or(Json::Null),
                    )
                })),
                MetaField::new("subscriptionType", "__Type").with_resolver(Resolver::from_fn(
                    |ctx| {
                        resolved(
                            ctx.registry
                                .subscription_type
                                .as_deref()
                                .map(type_ref)
                                .unwrap_or(Json::Null),
                        )
                    },
                )),
                MetaField::new("directives", "[__Directive!]!").with_resolver(Resolver::from_fn(
                    |ctx| {
                        resolved(Json::Array(
                            ctx.registry
                                .directives
                                .values()
                                .map(|directive| {
                                    json!({
                                        "name": directive.name,
                                        "description": directive.description,
                                        "locations": directive
                                            .locations
                                            .iter()
                                            .map(|location| location.to_string())
                                            .collect::<Vec<_>>(),
                                        "args": directive
                                            .args
                                            .values()
                                            .map(input_value_json)
                                            .collect::<Vec<_>>(),
                                    })
                                })
                                .collect(),
                        ))
                    },
                )),
            ],
        )
        .with_description("A GraphQL Schema defines the capabilities of a GraphQL server."),
    );

    registry.insert_type(
        ObjectType::new(
            "__Type",
            [
                MetaField::new("kind", "__TypeKind!").with_resolver(Resolver::from_fn(|ctx| {
                    resolved(match parent_ref(&ctx) {
                        Some(reference) if reference.ends_with('!') => json!("NON_NULL"),
                        Some(reference) if reference.starts_with('[') => json!("LIST"),
                        Some(reference) => ctx
                            .registry
                            .lookup_type(&reference)
                            .map(|ty| json!(ty.kind()))
                            .unwrap_or(Json::Null),
                        None => Json::Null,
                    })
                })),
                MetaField::new("name", "String").with_resolver(Resolver::from_fn(|ctx| {
                    resolved(match parent_ref(&ctx) {
                        Some(reference)
                            if !reference.ends_with('!') && !reference.starts_with('[') =>
                        {
                            json!(reference)
                        }
                        _ => Json::Null,
                    })
                })),
                MetaField::new("description", "String").with_resolver(Resolver::from_fn(|ctx| {
                    resolved(
                        parent_type(&ctx)
                            .and_then(MetaType::description)
                            .map(|description| json!(description))
                            .unwrap_or(Json::Null),
                    )
                })),
                MetaField::new("fields", "[__Field!]")
                    .with_argument(
                        MetaInputValue::new("includeDeprecated", "Boolean")
                            .with_default(async_graphql_value::ConstValue::Boolean(false)),
                    )
                    .with_resolver(Resolver::from_fn(|ctx| {
                        let with_deprecated = include_deprecated(&ctx);
                        resolved(
                            parent_type(&ctx)
                                .and_then(MetaType::fields)
                                .map(|fields| {
                                    Json::Array(
                                        fields
                                            .values()
                                            .filter(|field| !field.name.starts_with("__"))
                                            .filter(|field| {
                                                with_deprecated
                                                    || !field.deprecation.is_deprecated()
                                            })
                                            .map(field_json)
                                            .collect(),
                                    )
                                })
                                .unwrap_or(Json::Null),
                        )
                    })),
                MetaField::new("interfaces", "[__Type!]").with_resolver(Resolver::from_fn(
                    |ctx| {
                        resolved(
                            parent_type(&ctx)
                                .map(|ty| match ty {
                                    MetaType::Object(object) => Json::Array(
                                        object
                                            .implements
                                            .iter()
                                            .map(|interface| type_ref(interface))
                                            .collect(),
                                    ),
                                    MetaType::Interface(_) => Json::Array(Vec::new()),
                                    _ => Json::Null,
                                })
                                .unwrap_or(Json::Null),
                        )
                    },
                )),
                MetaField::new("possibleTypes", "[__Type!]").with_resolver(Resolver::from_fn(
                    |ctx| {
                        resolved(
                            parent_type(&ctx)
                                .and_then(MetaType::possible_types)
                                .map(|possible| {
                                    Json::Array(
                                        possible.iter().map(|name| type_ref(name)).collect(),
                                    )
                                })
                                .unwrap_or(Json::Null),
                        )
                    },
                )),
                MetaField::new("enumValues", "[__EnumValue!]")
                    .with_argument(
                        MetaInputValue::new("includeDeprecated", "Boolean")
                            .with_default(async_graphql_value::ConstValue::Boolean(false)),
                    )
                    .with_resolver(Resolver::from_fn(|ctx| {
                        let with_deprecated = include_deprecated(&ctx);
                        resolved(
                            parent_type(&ctx)
                                .map(|ty| match ty {
                                    MetaType::Enum(enum_type) => Json::Array(
                                        enum_type
                                            .enum_values
                                            .values()
                                            .filter(|value| {
                                                with_deprecated
                                                    || !value.deprecation.is_deprecated()
                                            })
                                            .map(|value| {
                                                let (is_deprecated, deprecation_reason) =
                                                    deprecation_json(&value.deprecation);
                                                json!({
                                                    "name": value.name,
                                                    "description": value.description,
                                                    "isDeprecated": is_deprecated,
                                                    "deprecationReason": deprecation_reason,
                                                })
                                            })
                                            .collect(),
                                    ),
                                    _ => Json::Null,
                                })
                                .unwrap_or(Json::Null),
                        )
                    })),
                MetaField::new("inputFields", "[__InputValue!]").with_resolver(
                    Resolver::from_fn(|ctx| {
                        resolved(
                            parent_type(&ctx)
                                .map(|ty| match ty {
                                    MetaType::InputObject(input_object) => Json::Array(
                                        input_object
                                            .input_fields
                                            .values()
                                            .map(input_value_json)
                                            .collect(),
                                    ),
                                    _ => Json::Null,
                                })
                                .unwrap_or(Json::Null),
                        )
                    }),
                ),
                MetaField::new("ofType", "__Type").with_resolver(Resolver::from_fn(|ctx| {
                    resolved(match parent_ref(&ctx) {
                        Some(reference) => match reference.strip_suffix('!') {
                            Some(inner) => type_ref(inner),
                            None => reference
                                .strip_prefix('[')
                                .and_then(|rest| rest.strip_suffix(']'))
                                .map(type_ref)
                                .unwrap_or(Json::Null),
                        },
                        None => Json::Null,
                    })
                })),
            ],
        )
        .with_description(
            "The fundamental unit of any GraphQL Schema is the type. There are many kinds of types in GraphQL.",
        ),
    );

    registry.insert_type(ObjectType::new(
        "__Field",
        [
            MetaField::new("name", "String!"),
            MetaField::new("description", "String"),
            MetaField::new("args", "[__InputValue!]!"),
            MetaField::new("type", "__Type!").with_resolver(type_of_parent()),
            MetaField::new("isDeprecated", "Boolean!"),
            MetaField::new("deprecationReason", "String"),
        ],
    ));

    registry.insert_type(ObjectType::new(
        "__InputValue",
        [
            MetaField::new("name", "String!"),
            MetaField::new("description", "String"),
            MetaField::new("type", "__Type!").with_resolver(type_of_parent()),
            MetaField::new("defaultValue", "String"),
        ],
    ));

    registry.insert_type(ObjectType::new(
        "__EnumValue",
        [
            MetaField::new("name", "String!"),
            MetaField::new("description", "String"),
            MetaField::new("isDeprecated", "Boolean!"),
            MetaField::new("deprecationReason", "String"),
        ],
    ));

    registry.insert_type(ObjectType::new(
        "__Directive",
        [
            MetaField::new("name", "String!"),
            MetaField::new("description", "String"),
            MetaField::new("locations", "[__DirectiveLocation!]!"),
            MetaField::new("args", "[__InputValue!]!"),
        ],
    ));

    let query_type = registry.query_type.clone();
    if let Some(MetaType::Object(query_root)) = registry.types.get_mut(&query_type) {
        let schema_field = MetaField::new("__schema", "__Schema!")
            .with_resolver(Resolver::from_fn(|_ctx| resolved(json!({}))));
        query_root
            .fields
            .insert(schema_field.name.clone(), schema_field);

        let type_field = MetaField::new("__type", "__Type")
            .with_argument(MetaInputValue::new("name", "String!"))
            .with_resolver(Resolver::from_fn(|ctx| {
                resolved(match ctx.arg("name") {
                    Some(async_graphql_value::ConstValue::String(name))
                        if ctx.registry.lookup_type(name).is_some() =>
                    {
                        type_ref(name)
                    }
                    _ => Json::Null,
                })
            }));
        query_root
            .fields
            .insert(type_field.name.clone(), type_field);
    }
}

/// The `type` field of `__Field` and `__InputValue`: the parent JSON
/// carries the reference under `"type"`.
fn type_of_parent() -> Resolver {
    Resolver::from_fn(|ctx| {
        resolved(
            ctx.parent_value
                .data_resolved()
                .get("type")
                .cloned()
                .unwrap_or(Json::Null),
        )
    })
}
