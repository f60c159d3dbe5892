//! End-to-end execution tests over a small pet-store schema.

use std::sync::atomic::{AtomicUsize, Ordering};

use bracken_engine::{
    registry::{
        BoxResolverFuture, EnumType, InterfaceType, MetaEnumValue, MetaField, MetaInputValue,
        ObjectType, Registry, UnionType,
    },
    Cancellation, ConstValue, ErrorKind, Request, ResolvedValue, Resolver, ResolverContext,
    Schema, Variables,
};
use serde_json::json;

struct Counter(AtomicUsize);

fn incr_resolver(ctx: ResolverContext<'_>) -> BoxResolverFuture<'_> {
    Box::pin(async move {
        // Suspend before the side effect so interleaving would reorder the
        // counter if entries ran concurrently.
        tokio::task::yield_now().await;
        let counter = ctx
            .data
            .get::<Counter>()
            .ok_or_else(|| bracken_engine::Error::new("missing counter"))?;
        let value = counter.0.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ResolvedValue::new(json!(value)))
    })
}

fn pet_schema() -> Schema {
    let mut registry = Registry::new();

    registry.insert_type(EnumType::new(
        "PetKind",
        [
            MetaEnumValue::new("DOG").with_value(json!(0)),
            MetaEnumValue::new("CAT").with_value(json!(1)),
        ],
    ));

    registry.insert_type(InterfaceType::new(
        "Pet",
        [MetaField::new("name", "String!")],
    ));

    registry.insert_type(
        ObjectType::new(
            "Dog",
            [
                MetaField::new("name", "String!"),
                MetaField::new("barkVolume", "Int"),
                MetaField::new("kind", "PetKind"),
                MetaField::new("friends", "[Dog!]"),
            ],
        )
        .implement("Pet"),
    );
    registry.insert_type(
        ObjectType::new(
            "Cat",
            [
                MetaField::new("name", "String!"),
                MetaField::new("meowVolume", "Int"),
            ],
        )
        .implement("Pet"),
    );
    registry.insert_type(UnionType::new("CatOrDog", ["Cat", "Dog"]));

    registry.insert_type(ObjectType::new(
        "Query",
        [
            MetaField::new("dog", "Dog").with_resolver(Resolver::from_fn(|_ctx| {
                Ok(ResolvedValue::new(json!({
                    "name": "Rex",
                    "barkVolume": 7,
                    "kind": 0,
                    "friends": [
                        { "name": "Fido", "barkVolume": 3 },
                        { "name": "Odie", "barkVolume": 5 },
                    ],
                })))
            })),
            MetaField::new("pet", "Pet")
                .with_argument(MetaInputValue::new("kind", "PetKind!"))
                .with_resolver(Resolver::from_fn(|ctx| {
                    Ok(ResolvedValue::new(
                        match ctx.arg("kind").map(ConstValue::to_string).as_deref() {
                            Some("DOG") => json!({
                                "__typename": "Dog",
                                "name": "Rex",
                                "barkVolume": 7,
                            }),
                            _ => json!({
                                "__typename": "Cat",
                                "name": "Whiskers",
                                "meowVolume": 2,
                            }),
                        },
                    ))
                })),
            MetaField::new("namelessDog", "Dog").with_resolver(Resolver::from_fn(|_ctx| {
                Ok(ResolvedValue::new(json!({ "name": null })))
            })),
            MetaField::new("requiredDog", "Dog!").with_resolver(Resolver::from_fn(|_ctx| {
                Ok(ResolvedValue::new(json!(null)))
            })),
            MetaField::new("failing", "String").with_resolver(Resolver::from_fn(|_ctx| {
                Err(bracken_engine::Error::new("boom")
                    .extend_with("reason", ConstValue::String("test".to_string())))
            })),
            MetaField::new("notAList", "[Int]").with_resolver(Resolver::from_fn(|_ctx| {
                Ok(ResolvedValue::new(json!("oops")))
            })),
            MetaField::new("mysteryPet", "Pet").with_resolver(Resolver::from_fn(|_ctx| {
                Ok(ResolvedValue::new(json!({ "name": "???" })))
            })),
            MetaField::new("numbers", "[Int!]").with_resolver(Resolver::from_fn(|_ctx| {
                Ok(ResolvedValue::new(json!([1, null, 3])))
            })),
            MetaField::new("sparseNumbers", "[Int]").with_resolver(Resolver::from_fn(|_ctx| {
                Ok(ResolvedValue::new(json!([1, null, 3])))
            })),
            MetaField::new("echo", "String")
                .with_argument(MetaInputValue::new("message", "String"))
                .with_resolver(Resolver::from_fn(|ctx| {
                    Ok(ResolvedValue::new(match ctx.arg("message") {
                        Some(ConstValue::String(message)) => json!(message),
                        _ => json!(null),
                    }))
                })),
        ],
    ));

    registry.mutation_type = Some("Mutation".to_string());
    registry.insert_type(ObjectType::new(
        "Mutation",
        [MetaField::new("incr", "Int!").with_resolver(Resolver::custom(incr_resolver))],
    ));

    Schema::build(registry).finish().expect("schema is valid")
}

#[tokio::test]
async fn aliases_and_property_resolution() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new(
            r#"
            query {
                goodDoggo: dog {
                    name
                    volume: barkVolume
                }
            }
            "#,
        ))
        .await;

    insta::assert_json_snapshot!(response.into_value(), @r###"
    {
      "data": {
        "goodDoggo": {
          "name": "Rex",
          "volume": 7
        }
      }
    }
    "###);
}

#[tokio::test]
async fn nested_lists_and_fragments() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new(
            r#"
            {
                dog {
                    ...dogFields
                    friends { name }
                }
            }
            fragment dogFields on Dog { name kind }
            "#,
        ))
        .await;

    insta::assert_json_snapshot!(response.into_value(), @r###"
    {
      "data": {
        "dog": {
          "name": "Rex",
          "kind": "DOG",
          "friends": [
            {
              "name": "Fido"
            },
            {
              "name": "Odie"
            }
          ]
        }
      }
    }
    "###);
}

#[tokio::test]
async fn skip_wins_over_include() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new(
            "{ dog { name @skip(if: true) @include(if: true) barkVolume @include(if: false) } }",
        ))
        .await;
    assert_eq!(
        response.into_value(),
        json!({ "data": { "dog": {} } })
    );
}

#[tokio::test]
async fn skip_respects_variables() {
    let schema = pet_schema();
    let variables: Variables =
        serde_json::from_value(json!({ "skipName": true })).unwrap();
    let response = schema
        .execute(
            Request::new(
                "query Q($skipName: Boolean!) { dog { name @skip(if: $skipName) barkVolume } }",
            )
            .variables(variables),
        )
        .await;
    assert_eq!(
        response.into_value(),
        json!({ "data": { "dog": { "barkVolume": 7 } } })
    );
}

#[tokio::test]
async fn validation_failures_return_no_data() {
    let schema = pet_schema();
    let response = schema.execute(Request::new("{ dog { wagTail } }")).await;
    let value = response.into_value();
    assert!(value.get("data").is_none());
    assert!(value["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("Unknown field \"wagTail\""));
    assert!(value["errors"][0]["locations"].is_array());
}

#[tokio::test]
async fn parse_failures_return_no_data() {
    let schema = pet_schema();
    let response = schema.execute(Request::new("{ dog {")).await;
    let value = response.into_value();
    assert!(value.get("data").is_none());
    assert!(!value["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_variables_fail_before_execution() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new("query Q($kind: PetKind!) { pet(kind: $kind) { name } }"))
        .await;
    let value = response.into_value();
    assert!(value.get("data").is_none());
    assert!(value["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("$kind"));
}

#[tokio::test]
async fn operation_selection_requires_a_name_for_multi_operation_documents() {
    let schema = pet_schema();
    let query = "query A { dog { name } } query B { dog { barkVolume } }";

    let response = schema.execute(Request::new(query)).await;
    assert!(!response.is_ok());
    assert_eq!(response.errors[0].kind, ErrorKind::AmbiguousOperation);

    let response = schema
        .execute(Request::new(query).with_operation_name("B"))
        .await;
    assert_eq!(
        response.into_value(),
        json!({ "data": { "dog": { "barkVolume": 7 } } })
    );
}

#[tokio::test]
async fn non_null_violation_propagates_to_nullable_ancestor() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new("{ namelessDog { name } }"))
        .await;
    let value = response.into_value();
    assert_eq!(value["data"], json!({ "namelessDog": null }));
    assert_eq!(value["errors"][0]["path"], json!(["namelessDog", "name"]));
}

#[tokio::test]
async fn non_null_violation_at_the_root_nulls_data() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new("{ requiredDog { name } }"))
        .await;
    let value = response.into_value();
    assert_eq!(value["data"], json!(null));
    assert!(!value["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn resolver_errors_null_the_field_and_keep_extensions() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new("{ failing dog { name } }"))
        .await;
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].kind, ErrorKind::Resolver);
    assert_eq!(response.errors[0].message, "boom");
    let value = response.into_value();
    assert_eq!(
        value["data"],
        json!({ "failing": null, "dog": { "name": "Rex" } })
    );
    assert_eq!(value["errors"][0]["extensions"]["reason"], json!("test"));
}

#[tokio::test]
async fn strings_are_not_lists() {
    let schema = pet_schema();
    let response = schema.execute(Request::new("{ notAList }")).await;
    assert_eq!(response.errors[0].kind, ErrorKind::ListExpected);
    assert_eq!(response.into_value()["data"], json!({ "notAList": null }));
}

#[tokio::test]
async fn non_null_list_element_nullifies_the_list() {
    let schema = pet_schema();
    let response = schema.execute(Request::new("{ numbers }")).await;
    let value = response.into_value();
    assert_eq!(value["data"], json!({ "numbers": null }));
    assert_eq!(value["errors"][0]["path"], json!(["numbers", 1]));
}

#[tokio::test]
async fn nullable_list_elements_absorb_errors() {
    let schema = pet_schema();
    let response = schema.execute(Request::new("{ sparseNumbers }")).await;
    let value = response.into_value();
    assert_eq!(value["data"], json!({ "sparseNumbers": [1, null, 3] }));
    assert!(value.get("errors").is_none());
}

#[tokio::test]
async fn abstract_types_resolve_through_typename_discriminator() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new(
            r#"
            {
                pet(kind: DOG) {
                    __typename
                    name
                    ... on Dog { barkVolume }
                    ... on Cat { meowVolume }
                }
            }
            "#,
        ))
        .await;
    assert_eq!(
        response.into_value()["data"],
        json!({ "pet": { "__typename": "Dog", "name": "Rex", "barkVolume": 7 } })
    );
}

#[tokio::test]
async fn unresolvable_abstract_type_is_reported() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new("{ mysteryPet { name } }"))
        .await;
    assert_eq!(response.errors[0].kind, ErrorKind::AbstractResolution);
    assert_eq!(response.into_value()["data"], json!({ "mysteryPet": null }));
}

#[tokio::test]
async fn enum_values_serialize_by_internal_value() {
    let schema = pet_schema();
    let response = schema.execute(Request::new("{ dog { kind } }")).await;
    assert_eq!(
        response.into_value()["data"],
        json!({ "dog": { "kind": "DOG" } })
    );
}

#[tokio::test]
async fn enum_variables_accept_case_insensitive_payloads() {
    let schema = pet_schema();
    let variables: Variables = serde_json::from_value(json!({ "kind": "dog" })).unwrap();
    let response = schema
        .execute(
            Request::new("query Q($kind: PetKind!) { pet(kind: $kind) { name } }")
                .variables(variables),
        )
        .await;
    assert_eq!(
        response.into_value()["data"],
        json!({ "pet": { "name": "Rex" } })
    );
}

#[tokio::test]
async fn mutations_run_in_declaration_order() {
    // E6: the counter observes strictly sequential execution.
    let schema = pet_schema();
    let response = schema
        .execute(Request::new("mutation { m: incr, n: incr }").data(Counter(AtomicUsize::new(0))))
        .await;
    assert!(response.is_ok(), "unexpected errors: {:?}", response.errors);
    // Serialize straight from the ordered response map: keys keep
    // collection order and the side effects ran in it.
    let body = serde_json::to_string(&response).unwrap();
    assert_eq!(body, r#"{"data":{"m":1,"n":2}}"#);
}

#[tokio::test]
async fn response_key_order_follows_collection_order() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new("{ zebra: echo(message: \"z\") alpha: echo(message: \"a\") }"))
        .await;
    let body = serde_json::to_string(&response).unwrap();
    assert_eq!(body, r#"{"data":{"zebra":"z","alpha":"a"}}"#);
}

#[tokio::test]
async fn cancellation_before_execution_is_canceled() {
    let schema = pet_schema();
    let cancellation = Cancellation::new();
    cancellation.cancel();
    let response = schema
        .execute(Request::new("{ dog { name } }").with_cancellation(cancellation))
        .await;
    let value = response.into_value();
    assert!(value.get("data").is_none());
    assert!(value["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("canceled"));
}

#[tokio::test]
async fn cancellation_mid_mutation_keeps_completed_fields() {
    fn cancel_resolver(ctx: ResolverContext<'_>) -> BoxResolverFuture<'_> {
        Box::pin(async move {
            ctx.cancellation.cancel();
            Ok(ResolvedValue::new(json!(1)))
        })
    }

    let mut registry = Registry::new();
    registry.mutation_type = Some("Mutation".to_string());
    registry.insert_type(ObjectType::new(
        "Mutation",
        [
            MetaField::new("first", "Int").with_resolver(Resolver::custom(cancel_resolver)),
            MetaField::new("second", "Int").with_resolver(Resolver::from_fn(|_ctx| {
                Ok(ResolvedValue::new(json!(2)))
            })),
        ],
    ));
    let schema = Schema::build(registry).finish().unwrap();

    let response = schema
        .execute(Request::new("mutation { first second }"))
        .await;
    let value = response.into_value();
    assert_eq!(value["data"], json!({ "first": 1 }));
    assert!(response_errors_contain(&value, "canceled"));
}

fn response_errors_contain(value: &serde_json::Value, needle: &str) -> bool {
    value["errors"]
        .as_array()
        .map(|errors| {
            errors.iter().any(|error| {
                error["message"]
                    .as_str()
                    .is_some_and(|message| message.to_lowercase().contains(needle))
            })
        })
        .unwrap_or(false)
}

#[tokio::test]
async fn typename_resolves_everywhere() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new("{ __typename dog { __typename } }"))
        .await;
    assert_eq!(
        response.into_value()["data"],
        json!({ "__typename": "Query", "dog": { "__typename": "Dog" } })
    );
}

#[tokio::test]
async fn schema_introspection_exposes_roots_and_types() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new(
            "{ __schema { queryType { name } mutationType { name } } }",
        ))
        .await;
    assert_eq!(
        response.into_value()["data"],
        json!({
            "__schema": {
                "queryType": { "name": "Query" },
                "mutationType": { "name": "Mutation" },
            }
        })
    );
}

#[tokio::test]
async fn type_introspection_unfolds_wrappers() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new(
            r#"
            {
                __type(name: "Dog") {
                    kind
                    name
                    fields { name type { kind name ofType { kind name } } }
                    interfaces { name }
                }
            }
            "#,
        ))
        .await;
    let value = response.into_value();
    let dog = &value["data"]["__type"];
    assert_eq!(dog["kind"], json!("OBJECT"));
    assert_eq!(dog["name"], json!("Dog"));
    assert_eq!(dog["interfaces"], json!([{ "name": "Pet" }]));
    let name_field = dog["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|field| field["name"] == json!("name"))
        .unwrap();
    assert_eq!(name_field["type"]["kind"], json!("NON_NULL"));
    assert_eq!(name_field["type"]["ofType"]["name"], json!("String"));
}

#[tokio::test]
async fn unknown_type_introspection_is_null() {
    let schema = pet_schema();
    let response = schema
        .execute(Request::new("{ __type(name: \"Nope\") { name } }"))
        .await;
    assert_eq!(response.into_value()["data"], json!({ "__type": null }));
}
