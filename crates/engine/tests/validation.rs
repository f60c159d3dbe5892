//! Validator tests against a pet-shop fixture schema.

use bracken_engine::{
    check_rules, parse_query,
    registry::{
        EnumType, InputObjectType, InterfaceType, MetaEnumValue, MetaField, MetaInputValue,
        ObjectType, Registry, UnionType,
    },
    validation::RuleError,
    Schema,
};
use bracken_parser::types::Document;

fn fixture_schema() -> Schema {
    let mut registry = Registry::new();

    registry.insert_type(EnumType::new(
        "DogCommand",
        [
            MetaEnumValue::new("SIT"),
            MetaEnumValue::new("DOWN"),
            MetaEnumValue::new("HEEL"),
        ],
    ));
    registry.insert_type(EnumType::new(
        "FurColor",
        [
            MetaEnumValue::new("BROWN"),
            MetaEnumValue::new("BLACK"),
            MetaEnumValue::new("TAN"),
            MetaEnumValue::new("SPOTTED"),
        ],
    ));

    let name_field = || {
        MetaField::new("name", "String")
            .with_argument(MetaInputValue::new("surname", "Boolean"))
    };

    registry.insert_type(InterfaceType::new("Being", [name_field()]));
    registry.insert_type(InterfaceType::new("Pet", [name_field()]));

    registry.insert_type(
        ObjectType::new(
            "Dog",
            [
                name_field(),
                MetaField::new("nickname", "String"),
                MetaField::new("barkVolume", "Int"),
                MetaField::new("barks", "Boolean"),
                MetaField::new("doesKnowCommand", "Boolean")
                    .with_argument(MetaInputValue::new("dogCommand", "DogCommand")),
                MetaField::new("isHousetrained", "Boolean").with_argument(
                    MetaInputValue::new("atOtherHomes", "Boolean")
                        .with_default(bracken_engine::ConstValue::Boolean(true)),
                ),
            ],
        )
        .implement("Being")
        .implement("Pet"),
    );

    registry.insert_type(
        ObjectType::new(
            "Cat",
            [
                name_field(),
                MetaField::new("nickname", "String"),
                MetaField::new("meows", "Boolean"),
                MetaField::new("meowVolume", "Int"),
                MetaField::new("furColor", "FurColor"),
            ],
        )
        .implement("Being")
        .implement("Pet"),
    );

    registry.insert_type(UnionType::new("CatOrDog", ["Cat", "Dog"]));

    registry.insert_type(
        ObjectType::new(
            "Human",
            [
                name_field(),
                MetaField::new("pets", "[Pet]"),
                MetaField::new("relatives", "[Human]"),
                MetaField::new("iq", "Int"),
            ],
        )
        .implement("Being"),
    );
    registry.insert_type(
        ObjectType::new("Alien", [name_field(), MetaField::new("iq", "Int")])
            .implement("Being"),
    );
    registry.insert_type(UnionType::new("DogOrHuman", ["Dog", "Human"]));
    registry.insert_type(UnionType::new("HumanOrAlien", ["Human", "Alien"]));

    registry.insert_type(InputObjectType::new(
        "ComplexInput",
        [
            MetaInputValue::new("requiredField", "Boolean!"),
            MetaInputValue::new("intField", "Int"),
            MetaInputValue::new("stringField", "String"),
            MetaInputValue::new("booleanField", "Boolean"),
            MetaInputValue::new("stringListField", "[String]"),
        ],
    ));

    registry.insert_type(ObjectType::new(
        "ComplicatedArgs",
        [
            MetaField::new("intArgField", "String")
                .with_argument(MetaInputValue::new("intArg", "Int")),
            MetaField::new("nonNullIntArgField", "String")
                .with_argument(MetaInputValue::new("nonNullIntArg", "Int!")),
            MetaField::new("stringArgField", "String")
                .with_argument(MetaInputValue::new("stringArg", "String")),
            MetaField::new("booleanArgField", "String")
                .with_argument(MetaInputValue::new("booleanArg", "Boolean")),
            MetaField::new("enumArgField", "String")
                .with_argument(MetaInputValue::new("enumArg", "FurColor")),
            MetaField::new("floatArgField", "String")
                .with_argument(MetaInputValue::new("floatArg", "Float")),
            MetaField::new("idArgField", "String")
                .with_argument(MetaInputValue::new("idArg", "ID")),
            MetaField::new("stringListArgField", "String")
                .with_argument(MetaInputValue::new("stringListArg", "[String]")),
            MetaField::new("complexArgField", "String")
                .with_argument(MetaInputValue::new("complexArg", "ComplexInput")),
            MetaField::new("multipleReqs", "String")
                .with_argument(MetaInputValue::new("req1", "Int!"))
                .with_argument(MetaInputValue::new("req2", "Int!")),
        ],
    ));

    registry.insert_type(ObjectType::new(
        "Query",
        [
            MetaField::new("human", "Human")
                .with_argument(MetaInputValue::new("id", "ID")),
            MetaField::new("alien", "Alien"),
            MetaField::new("dog", "Dog"),
            MetaField::new("cat", "Cat"),
            MetaField::new("pet", "Pet"),
            MetaField::new("catOrDog", "CatOrDog"),
            MetaField::new("dogOrHuman", "DogOrHuman"),
            MetaField::new("humanOrAlien", "HumanOrAlien"),
            MetaField::new("complicatedArgs", "ComplicatedArgs"),
            MetaField::new("field", "String")
                .with_argument(MetaInputValue::new("a", "String"))
                .with_argument(MetaInputValue::new("b", "String"))
                .with_argument(MetaInputValue::new("c", "String")),
        ],
    ));

    Schema::build(registry).finish().expect("fixture schema is valid")
}

fn expect_passes(query: &str) {
    let schema = fixture_schema();
    let doc = parse_query(query).expect("query parses");
    if let Err(errors) = check_rules(schema.registry(), &doc, None, false) {
        panic!("expected query to pass validation, got {errors:#?}");
    }
}

fn expect_fails(query: &str) -> Vec<RuleError> {
    let schema = fixture_schema();
    let doc = parse_query(query).expect("query parses");
    check_rules(schema.registry(), &doc, None, false)
        .expect_err("expected query to fail validation")
}

fn expect_fails_fast(query: &str) -> RuleError {
    let schema = fixture_schema();
    let doc = parse_query(query).expect("query parses");
    let errors = check_rules(schema.registry(), &doc, None, true)
        .expect_err("expected query to fail validation");
    assert_eq!(errors.len(), 1, "fail-fast returns exactly one error");
    errors.into_iter().next().unwrap()
}

fn check_document(doc: &Document, fail_fast: bool) -> Result<(), Vec<RuleError>> {
    let schema = fixture_schema();
    check_rules(schema.registry(), doc, None, fail_fast)
}

#[test]
fn valid_queries_pass() {
    expect_passes("{ dog { name barkVolume } cat { meows } }");
    expect_passes("query Q($atOtherHomes: Boolean) { dog { isHousetrained(atOtherHomes: $atOtherHomes) } }");
    expect_passes(
        "{ catOrDog { ... on Dog { barkVolume } ... on Cat { meowVolume } __typename } }",
    );
    expect_passes("fragment petName on Pet { name } { dog { ...petName } }");
}

#[test]
fn unknown_fields_are_reported_with_suggestions() {
    let errors = expect_fails("{ cat { meowVolum } }");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Unknown field \"meowVolum\" on type \"Cat\""));
    assert!(errors[0].message.contains("Did you mean \"meowVolume\"?"));
    assert_eq!(errors[0].locations.len(), 1);
}

#[test]
fn abstract_parents_suggest_inline_fragments() {
    let errors = expect_fails("{ catOrDog { barkVolume } }");
    assert!(errors[0]
        .message
        .contains("Did you mean to use an inline fragment on \"Dog\"?"));
}

#[test]
fn unknown_types_are_reported() {
    let errors = expect_fails("query Q($id: Spaceship) { dog { name } ...f } fragment f on Spaceship { name }");
    assert!(errors
        .iter()
        .any(|error| error.message.contains("Unknown type \"Spaceship\"")));
}

#[test]
fn unknown_arguments_are_reported() {
    let errors = expect_fails("{ dog { doesKnowCommand(dogCommandd: SIT) } }");
    assert!(errors[0].message.contains("Unknown argument \"dogCommandd\""));
    assert!(errors[0].message.contains("Did you mean \"dogCommand\"?"));
}

#[test]
fn directives_must_be_known_and_placed() {
    let errors = expect_fails("{ dog { name @unknownDirective } }");
    assert!(errors[0].message.contains("Unknown directive"));

    let errors = expect_fails("query Q @skip(if: true) { dog { name } }");
    assert!(errors[0].message.contains("may not be used on QUERY"));
}

#[test]
fn fragment_spreads_must_resolve() {
    let errors = expect_fails("{ dog { ...missingFragment } }");
    assert!(errors
        .iter()
        .any(|error| error.message.contains("Unknown fragment \"missingFragment\"")));
}

#[test]
fn fragment_cycles_are_reported_with_the_path() {
    // E4: fragA → fragB → fragC → fragO → fragP → fragA.
    let error = expect_fails_fast(
        r#"
        { dog { ...fragA } }
        fragment fragA on Dog { name ...fragB }
        fragment fragB on Dog { name ...fragC }
        fragment fragC on Dog { name ...fragO }
        fragment fragO on Dog { name ...fragP }
        fragment fragP on Dog { name ...fragA }
        "#,
    );
    assert!(error
        .message
        .contains("Cannot spread fragment \"fragA\" within itself"));
    assert!(error.message.contains("\"fragB\", \"fragC\", \"fragO\", \"fragP\""));
    assert_eq!(error.locations.len(), 5, "one location per spread site");
}

#[test]
fn self_spread_is_a_cycle() {
    let errors = expect_fails("{ dog { ...loop } } fragment loop on Dog { name ...loop }");
    assert!(errors
        .iter()
        .any(|error| error.message == "Cannot spread fragment \"loop\" within itself"));
}

#[test]
fn undefined_variables_are_reported_through_fragments() {
    let errors = expect_fails(
        "query Foo { dog { ...housetrained } } fragment housetrained on Dog { isHousetrained(atOtherHomes: $atOtherHomes) }",
    );
    assert!(errors.iter().any(|error| error
        .message
        .contains("Variable \"$atOtherHomes\" is not defined by operation \"Foo\"")));
}

#[test]
fn unused_fragments_are_reported() {
    let errors =
        expect_fails("{ dog { name } } fragment unusedFragment on Dog { nickname }");
    assert!(errors
        .iter()
        .any(|error| error.message == "Fragment \"unusedFragment\" is never used"));
}

#[test]
fn unused_variable_reports_declaration_site() {
    // E1: fail-fast yields exactly the diagnostic for `$a`, at its
    // declaration.
    let error = expect_fails_fast(
        "\n          query Foo($a: String, $b: String, $c: String) {\n            field(b: $b)\n          }\n        ",
    );
    assert_eq!(
        error.message,
        "Variable \"$a\" is not used by operation \"Foo\""
    );
    assert_eq!(error.locations.len(), 1);
    assert_eq!((error.locations[0].line, error.locations[0].column), (2, 21));
}

#[test]
fn all_unused_variables_are_reported_without_fail_fast() {
    let errors = expect_fails(
        "query Foo($a: String, $b: String, $c: String) { field(b: $b) }",
    );
    assert_eq!(errors.len(), 2);
    assert!(errors[0].message.contains("\"$a\""));
    assert!(errors[1].message.contains("\"$c\""));
}

#[test]
fn duplicate_arguments_report_both_sites() {
    let errors = expect_fails("{ field(a: \"x\", a: \"y\") }");
    assert!(errors[0]
        .message
        .contains("There can be only one argument named \"a\""));
    assert_eq!(errors[0].locations.len(), 2);
}

#[test]
fn duplicate_variables_report_both_sites() {
    let errors = expect_fails("query Q($x: String, $x: String) { field(a: $x) }");
    assert!(errors[0]
        .message
        .contains("There can be only one variable named \"$x\""));
    assert_eq!(errors[0].locations.len(), 2);
}

#[test]
fn duplicate_directives_per_location_are_reported() {
    let errors = expect_fails("{ dog { name @skip(if: true) @skip(if: true) } }");
    assert!(errors[0]
        .message
        .contains("Directive \"skip\" can only be used once at this location"));
    assert_eq!(errors[0].locations.len(), 2);
}

#[test]
fn duplicate_operation_names_are_reported_on_built_documents() {
    let parsed = parse_query("query Foo { dog { name } }").unwrap();
    let mut doc = parsed.clone();
    doc.operations.push(parsed.operations[0].clone());
    let errors = check_document(&doc, false).unwrap_err();
    assert!(errors.iter().any(|error| error
        .message
        .contains("There can be only one operation named \"Foo\"")));
}

#[test]
fn duplicate_fragment_names_are_reported_on_built_documents() {
    let parsed =
        parse_query("{ dog { ...dogFields } } fragment dogFields on Dog { name }").unwrap();
    let mut doc = parsed.clone();
    doc.fragments.push(parsed.fragments[0].clone());
    let errors = check_document(&doc, false).unwrap_err();
    assert!(errors.iter().any(|error| error
        .message
        .contains("There can be only one fragment named \"dogFields\"")));
}

#[test]
fn anonymous_operation_must_be_alone() {
    let anonymous = parse_query("{ dog { name } }").unwrap();
    let named = parse_query("query Foo { cat { meows } }").unwrap();
    let doc = Document {
        operations: vec![
            anonymous.operations[0].clone(),
            named.operations[0].clone(),
        ],
        fragments: vec![],
    };
    let errors = check_document(&doc, false).unwrap_err();
    assert!(errors.iter().any(|error| error
        .message
        .contains("This anonymous operation must be the only defined operation")));
}

#[test]
fn duplicate_input_fields_are_reported_on_built_values() {
    use bracken_parser::types::{Selection, Value};

    let mut doc = parse_query(
        "{ complicatedArgs { complexArgField(complexArg: { requiredField: true }) } }",
    )
    .unwrap();
    // Duplicate `requiredField` inside the object literal. The parser
    // cannot produce this shape, the AST can.
    let Selection::Field(complicated) =
        &mut doc.operations[0].node.selection_set.node.items[0].node
    else {
        panic!("expected a field");
    };
    let Selection::Field(complex) =
        &mut complicated.node.selection_set.node.items[0].node
    else {
        panic!("expected a field");
    };
    let Value::Object(fields) = &mut complex.node.arguments[0].1.node else {
        panic!("expected an object literal");
    };
    fields.push((fields[0].0.clone(), Value::Boolean(false)));

    let errors = check_document(&doc, false).unwrap_err();
    let error = errors
        .iter()
        .find(|error| {
            error
                .message
                .contains("There can be only one input field named \"requiredField\"")
        })
        .expect("duplicate input field reported");
    assert_eq!(error.locations.len(), 2);
}

#[test]
fn missing_required_arguments_are_reported() {
    let errors = expect_fails("{ complicatedArgs { multipleReqs(req1: 1) } }");
    assert!(errors[0]
        .message
        .contains("argument \"req2\" of type \"Int!\" is required but not provided"));
}

#[test]
fn argument_literal_type_mismatch_reports_value_site() {
    // E2: with fail-fast, the diagnostic for `req2` comes first, anchored
    // at the literal.
    let error = expect_fails_fast(
        "\n        { complicatedArgs {\n          multipleReqs(req2: \"two\", req1: \"one\")\n        } }\n      ",
    );
    assert!(error.message.contains("\"req2\""));
    assert!(error.message.contains("Int"));
    assert!(error.message.contains("\"two\""));
    assert_eq!((error.locations[0].line, error.locations[0].column), (3, 30));
}

#[test]
fn enum_literals_are_case_sensitive() {
    expect_passes("{ dog { doesKnowCommand(dogCommand: SIT) } }");
    let errors = expect_fails("{ dog { doesKnowCommand(dogCommand: sit) } }");
    assert!(errors[0].message.contains("dogCommand"));
    let errors = expect_fails("{ dog { doesKnowCommand(dogCommand: \"SIT\") } }");
    assert!(!errors.is_empty());
}

#[test]
fn default_value_element_mismatch_is_detailed() {
    // E3: the diagnostic names the variable, its type, the full literal and
    // the failing element, anchored at the default value.
    let error = expect_fails_fast(
        "\n                    query InvalidItem($a: [String] = [\"one\", 2]) { dog { name } }\n                  ",
    );
    assert!(error.message.contains("\"a\""));
    assert!(error.message.contains("[String]"));
    assert!(error.message.contains("[\"one\", 2]"));
    assert!(error
        .message
        .contains("In element #2: [Expected type 'String', found 2.]"));
    assert_eq!((error.locations[0].line, error.locations[0].column), (2, 54));
}

#[test]
fn non_null_variables_cannot_have_defaults() {
    let errors = expect_fails("query Q($a: String! = \"x\") { field(a: $a) }");
    assert!(errors[0]
        .message
        .contains("is required and cannot have a default value"));
}

#[test]
fn variables_must_be_input_types() {
    let errors = expect_fails("query Q($dog: Dog) { field(a: $dog) }");
    assert!(errors
        .iter()
        .any(|error| error.message.contains("cannot be of non-input type \"Dog\"")));
}

#[test]
fn variable_positions_respect_nullability() {
    let errors = expect_fails(
        "query Q($i: Int) { complicatedArgs { nonNullIntArgField(nonNullIntArg: $i) } }",
    );
    assert!(errors[0].message.contains(
        "Variable \"$i\" of type \"Int\" used in position expecting type \"Int!\""
    ));
    assert_eq!(errors[0].locations.len(), 2);

    // A default makes the nullable variable acceptable.
    expect_passes(
        "query Q($i: Int = 3) { complicatedArgs { nonNullIntArgField(nonNullIntArg: $i) } }",
    );
}

#[test]
fn scalar_leafs_both_directions() {
    let errors = expect_fails("{ dog }");
    assert!(errors[0]
        .message
        .contains("must have a selection of subfields"));

    let errors = expect_fails("{ dog { barkVolume { x } } }");
    assert!(errors[0].message.contains("must not have a selection"));
}

#[test]
fn impossible_spreads_are_reported() {
    let errors = expect_fails(
        "{ cat { ...dogFields } } fragment dogFields on Dog { barkVolume }",
    );
    assert!(errors[0].message.contains(
        "objects of type \"Cat\" can never be of type \"Dog\""
    ));

    expect_passes("{ pet { ... on Dog { barkVolume } } }");
    let errors = expect_fails("{ alien { ... on Pet { name } } }");
    assert!(errors[0].message.contains("can never be of type \"Pet\""));
}

#[test]
fn fragments_must_condition_on_composite_types() {
    let errors = expect_fails(
        "{ dog { ...intFragment } } fragment intFragment on Int { x }",
    );
    assert!(errors
        .iter()
        .any(|error| error.message.contains("non composite type \"Int\"")));
}

#[test]
fn conflicting_aliases_are_reported_with_both_sites() {
    // E5: two fragments contribute the same response key with different
    // underlying fields.
    let errors = expect_fails(
        r#"
        { dog { ...aliasedA ...aliasedB } }
        fragment aliasedA on Dog { x: barkVolume }
        fragment aliasedB on Dog { x: nickname }
        "#,
    );
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains(
        "Fields \"x\" conflict because barkVolume and nickname are different fields"
    ));
    assert_eq!(errors[0].locations.len(), 2);
}

#[test]
fn same_field_different_arguments_conflicts() {
    let errors = expect_fails(
        "{ dog { doesKnowCommand(dogCommand: SIT) doesKnowCommand(dogCommand: HEEL) } }",
    );
    assert!(errors[0].message.contains("they have differing arguments"));
}

#[test]
fn identical_selections_merge_cleanly() {
    expect_passes("{ dog { name name } }");
    expect_passes(
        "{ dog { doesKnowCommand(dogCommand: SIT) doesKnowCommand(dogCommand: SIT) } }",
    );
    // Distinct object types under an abstract parent may reuse keys with
    // compatible shapes.
    expect_passes(
        "{ catOrDog { ... on Dog { volume: barkVolume } ... on Cat { volume: meowVolume } } }",
    );
}

#[test]
fn conflicting_types_under_exclusive_parents_still_conflict() {
    let errors = expect_fails(
        "{ catOrDog { ... on Dog { value: barkVolume } ... on Cat { value: meows } } }",
    );
    assert!(errors[0]
        .message
        .contains("they return conflicting types Int and Boolean"));
}

#[test]
fn aliased_parents_keep_separate_response_objects() {
    expect_passes(
        r#"
        {
          dog { owner: name }
          other: dog { owner: nickname }
        }
        "#,
    );
}

#[test]
fn merged_subselections_are_checked_across_parents() {
    let errors = expect_fails(
        "{ dog { name: nickname } dog { name: barkVolume } }",
    );
    assert!(errors[0].message.contains(
        "Fields \"name\" conflict because nickname and barkVolume are different fields"
    ));
}

#[test]
fn fail_fast_stops_after_first_diagnostic() {
    // Both fields are unknown; only the first is reported.
    let error = expect_fails_fast("{ dog { unknownOne unknownTwo } }");
    assert!(error.message.contains("unknownOne"));
}
