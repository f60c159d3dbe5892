//! The runtime type system.
//!
//! A [`Registry`] holds every named type reachable from the roots, keyed by
//! name. Wrapping types are not registry entries; they live in the type
//! reference strings (see [`type_names`]).

pub mod resolvers;
pub mod scalars;
mod type_names;

use std::collections::BTreeMap;

use async_graphql_value::ConstValue;
use indexmap::{map::IndexMap, set::IndexSet};

pub use resolvers::{BoxResolverFuture, Resolver, ResolverContext, ResolvedValue};
pub use type_names::{InputValueType, MetaFieldType, MetaTypeName, WrappingType, WrappingTypeIter};

/// An argument or input-object field definition.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaInputValue {
    pub name: String,
    pub description: Option<String>,
    pub ty: InputValueType,
    pub default_value: Option<ConstValue>,
}

impl MetaInputValue {
    pub fn new(name: impl Into<String>, ty: impl Into<InputValueType>) -> MetaInputValue {
        MetaInputValue {
            name: name.into(),
            description: None,
            ty: ty.into(),
            default_value: None,
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> MetaInputValue {
        MetaInputValue {
            description: Some(description.into()),
            ..self
        }
    }

    pub fn with_default(self, default: ConstValue) -> MetaInputValue {
        MetaInputValue {
            default_value: Some(default),
            ..self
        }
    }
}

/// Deprecation state of a field or enum value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Deprecation {
    #[default]
    NoDeprecated,
    Deprecated {
        reason: Option<String>,
    },
}

impl Deprecation {
    #[inline]
    pub fn is_deprecated(&self) -> bool {
        matches!(self, Deprecation::Deprecated { .. })
    }

    #[inline]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Deprecation::NoDeprecated => None,
            Deprecation::Deprecated { reason } => reason.as_deref(),
        }
    }
}

/// An output field definition.
#[derive(Clone, Debug, Default)]
pub struct MetaField {
    pub name: String,
    /// Property to read from the parent value when it differs from the field
    /// name; used by the default resolver.
    pub mapped_name: Option<String>,
    pub description: Option<String>,
    pub args: IndexMap<String, MetaInputValue>,
    pub ty: MetaFieldType,
    pub deprecation: Deprecation,
    pub resolver: Resolver,
}

impl MetaField {
    pub fn new(name: impl Into<String>, ty: impl Into<MetaFieldType>) -> MetaField {
        MetaField {
            name: name.into(),
            ty: ty.into(),
            ..Default::default()
        }
    }

    pub fn with_argument(mut self, argument: MetaInputValue) -> Self {
        self.args.insert(argument.name.clone(), argument);
        self
    }

    pub fn with_resolver(self, resolver: Resolver) -> Self {
        Self { resolver, ..self }
    }

    pub fn with_deprecation(self, reason: Option<String>) -> Self {
        Self {
            deprecation: Deprecation::Deprecated { reason },
            ..self
        }
    }

    pub fn argument(&self, name: &str) -> Option<&MetaInputValue> {
        self.args.get(name)
    }

    pub fn target_field_name(&self) -> &str {
        self.mapped_name.as_deref().unwrap_or(&self.name)
    }
}

/// A single member of an enum type.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaEnumValue {
    pub name: String,
    pub description: Option<String>,
    pub deprecation: Deprecation,
    /// The internal representation handed to and returned by resolvers; the
    /// external name stands in when absent.
    pub value: Option<serde_json::Value>,
}

impl MetaEnumValue {
    pub fn new(name: impl Into<String>) -> Self {
        MetaEnumValue {
            name: name.into(),
            description: None,
            deprecation: Deprecation::NoDeprecated,
            value: None,
        }
    }

    pub fn with_value(self, value: serde_json::Value) -> Self {
        MetaEnumValue {
            value: Some(value),
            ..self
        }
    }

    pub fn with_deprecation(self, reason: Option<String>) -> Self {
        MetaEnumValue {
            deprecation: Deprecation::Deprecated { reason },
            ..self
        }
    }

    /// The comparable form of the internal value.
    pub fn underlying(&self) -> serde_json::Value {
        self.value
            .clone()
            .unwrap_or_else(|| serde_json::Value::String(self.name.clone()))
    }
}

/// How custom scalar input is checked. Built-in scalars ignore this and use
/// their own format rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScalarParser {
    /// Accept any value unchanged.
    PassThrough,
    /// Gate values behind the scalar's `is_valid` predicate.
    #[default]
    Validated,
}

pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
    pub specified_by_url: Option<String>,
    pub is_valid: Option<fn(value: &ConstValue) -> bool>,
    pub parser: ScalarParser,
}

impl ScalarType {
    pub fn new(name: impl Into<String>) -> Self {
        ScalarType {
            name: name.into(),
            description: None,
            specified_by_url: None,
            is_valid: None,
            parser: ScalarParser::default(),
        }
    }
}

impl std::fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalarType")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Resolves the concrete object type for a value of an abstract type.
pub type TypeResolverFn = fn(value: &serde_json::Value) -> Option<String>;

#[derive(Debug)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, MetaField>,
    pub implements: IndexSet<String>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = MetaField>) -> ObjectType {
        ObjectType {
            name: name.into(),
            description: None,
            fields: fields
                .into_iter()
                .map(|field| (field.name.clone(), field))
                .collect(),
            implements: Default::default(),
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        ObjectType {
            description: Some(description.into()),
            ..self
        }
    }

    pub fn implement(mut self, interface: impl Into<String>) -> Self {
        self.implements.insert(interface.into());
        self
    }

    #[inline]
    pub fn field_by_name(&self, name: &str) -> Option<&MetaField> {
        self.fields.get(name)
    }
}

#[derive(Debug)]
pub struct InterfaceType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, MetaField>,
    pub possible_types: IndexSet<String>,
    pub resolve_type: Option<TypeResolverFn>,
}

impl InterfaceType {
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = MetaField>) -> Self {
        InterfaceType {
            name: name.into(),
            description: None,
            fields: fields
                .into_iter()
                .map(|field| (field.name.clone(), field))
                .collect(),
            possible_types: Default::default(),
            resolve_type: None,
        }
    }

    pub fn with_possible_type(mut self, ty: impl Into<String>) -> Self {
        self.possible_types.insert(ty.into());
        self
    }

    pub fn with_type_resolver(self, resolve_type: TypeResolverFn) -> Self {
        Self {
            resolve_type: Some(resolve_type),
            ..self
        }
    }

    pub fn field_by_name(&self, name: &str) -> Option<&MetaField> {
        self.fields.get(name)
    }
}

#[derive(Debug)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub possible_types: IndexSet<String>,
    pub resolve_type: Option<TypeResolverFn>,
}

impl UnionType {
    pub fn new<T: Into<String>>(
        name: impl Into<String>,
        possible_types: impl IntoIterator<Item = T>,
    ) -> UnionType {
        UnionType {
            name: name.into(),
            description: None,
            possible_types: possible_types.into_iter().map(Into::into).collect(),
            resolve_type: None,
        }
    }

    pub fn with_type_resolver(self, resolve_type: TypeResolverFn) -> Self {
        Self {
            resolve_type: Some(resolve_type),
            ..self
        }
    }
}

#[derive(Debug)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub enum_values: IndexMap<String, MetaEnumValue>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = MetaEnumValue>) -> Self {
        EnumType {
            name: name.into(),
            description: None,
            enum_values: values
                .into_iter()
                .map(|value| (value.name.clone(), value))
                .collect(),
        }
    }

    /// Case-sensitive lookup, used when parsing query literals.
    pub fn value(&self, name: &str) -> Option<&MetaEnumValue> {
        self.enum_values.get(name)
    }

    /// Case-insensitive lookup, used when coercing payload input. An
    /// exact-case match wins over a case-folded one.
    pub fn value_ignore_case(&self, name: &str) -> Option<&MetaEnumValue> {
        self.value(name).or_else(|| {
            self.enum_values
                .values()
                .find(|value| value.name.eq_ignore_ascii_case(name))
        })
    }

    /// Find a member by its internal value, comparing underlying
    /// representations (numbers compare numerically).
    pub fn value_by_internal(&self, internal: &serde_json::Value) -> Option<&MetaEnumValue> {
        self.enum_values
            .values()
            .find(|value| underlying_eq(&value.underlying(), internal))
    }
}

fn underlying_eq(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    use serde_json::Value as Json;
    match (a, b) {
        (Json::Number(a), Json::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => a == b,
    }
}

#[derive(Debug)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub input_fields: IndexMap<String, MetaInputValue>,
}

impl InputObjectType {
    pub fn new(
        name: impl Into<String>,
        input_fields: impl IntoIterator<Item = MetaInputValue>,
    ) -> Self {
        InputObjectType {
            name: name.into(),
            description: None,
            input_fields: input_fields
                .into_iter()
                .map(|value| (value.name.clone(), value))
                .collect(),
        }
    }
}

/// A named type in the schema.
#[derive(Debug)]
pub enum MetaType {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl From<ScalarType> for MetaType {
    fn from(val: ScalarType) -> Self {
        MetaType::Scalar(val)
    }
}

impl From<ObjectType> for MetaType {
    fn from(val: ObjectType) -> Self {
        MetaType::Object(val)
    }
}

impl From<InterfaceType> for MetaType {
    fn from(val: InterfaceType) -> Self {
        MetaType::Interface(val)
    }
}

impl From<UnionType> for MetaType {
    fn from(val: UnionType) -> Self {
        MetaType::Union(val)
    }
}

impl From<EnumType> for MetaType {
    fn from(val: EnumType) -> Self {
        MetaType::Enum(val)
    }
}

impl From<InputObjectType> for MetaType {
    fn from(val: InputObjectType) -> Self {
        MetaType::InputObject(val)
    }
}

impl MetaType {
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            MetaType::Scalar(inner) => &inner.name,
            MetaType::Object(inner) => &inner.name,
            MetaType::Interface(inner) => &inner.name,
            MetaType::Union(inner) => &inner.name,
            MetaType::Enum(inner) => &inner.name,
            MetaType::InputObject(inner) => &inner.name,
        }
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        match self {
            MetaType::Scalar(inner) => inner.description.as_deref(),
            MetaType::Object(inner) => inner.description.as_deref(),
            MetaType::Interface(inner) => inner.description.as_deref(),
            MetaType::Union(inner) => inner.description.as_deref(),
            MetaType::Enum(inner) => inner.description.as_deref(),
            MetaType::InputObject(inner) => inner.description.as_deref(),
        }
    }

    /// The introspection `__TypeKind` for this type.
    pub fn kind(&self) -> &'static str {
        match self {
            MetaType::Scalar(_) => "SCALAR",
            MetaType::Object(_) => "OBJECT",
            MetaType::Interface(_) => "INTERFACE",
            MetaType::Union(_) => "UNION",
            MetaType::Enum(_) => "ENUM",
            MetaType::InputObject(_) => "INPUT_OBJECT",
        }
    }

    #[inline]
    pub fn fields(&self) -> Option<&IndexMap<String, MetaField>> {
        match self {
            MetaType::Object(inner) => Some(&inner.fields),
            MetaType::Interface(inner) => Some(&inner.fields),
            _ => None,
        }
    }

    #[inline]
    pub fn field_by_name(&self, name: &str) -> Option<&MetaField> {
        self.fields().and_then(|fields| fields.get(name))
    }

    #[inline]
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_)
        )
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        matches!(self, MetaType::Interface(_) | MetaType::Union(_))
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, MetaType::Enum(_) | MetaType::Scalar(_))
    }

    #[inline]
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            MetaType::Enum(_) | MetaType::Scalar(_) | MetaType::InputObject(_)
        )
    }

    #[inline]
    pub fn is_possible_type(&self, type_name: &str) -> bool {
        match self {
            MetaType::Interface(inner) => inner.possible_types.contains(type_name),
            MetaType::Union(inner) => inner.possible_types.contains(type_name),
            MetaType::Object(inner) => inner.name == type_name,
            _ => false,
        }
    }

    #[inline]
    pub fn possible_types(&self) -> Option<&IndexSet<String>> {
        match self {
            MetaType::Interface(inner) => Some(&inner.possible_types),
            MetaType::Union(inner) => Some(&inner.possible_types),
            _ => None,
        }
    }

    /// Whether two composite types can describe the same runtime object,
    /// i.e. their possible-type sets intersect.
    pub fn type_overlap(&self, ty: &MetaType) -> bool {
        if std::ptr::eq(self, ty) {
            return true;
        }

        match (self.is_abstract(), ty.is_abstract()) {
            (true, true) => self
                .possible_types()
                .iter()
                .copied()
                .flatten()
                .any(|type_name| ty.is_possible_type(type_name)),
            (true, false) => self.is_possible_type(ty.name()),
            (false, true) => ty.is_possible_type(self.name()),
            (false, false) => self.name() == ty.name(),
        }
    }
}

/// Where a directive may legally appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    FieldDefinition,
    EnumValue,
}

#[derive(Debug)]
pub struct MetaDirective {
    pub name: String,
    pub description: Option<String>,
    pub locations: Vec<DirectiveLocation>,
    pub args: IndexMap<String, MetaInputValue>,
}

impl MetaDirective {
    pub fn argument(&self, name: &str) -> Option<&MetaInputValue> {
        self.args.get(name)
    }
}

/// The complete type system of one schema.
#[derive(Debug)]
pub struct Registry {
    pub types: BTreeMap<String, MetaType>,
    pub directives: BTreeMap<String, MetaDirective>,
    pub query_type: String,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry carrying the built-in scalars, the built-in
    /// directives, and an empty `Query` root.
    pub fn new() -> Registry {
        let mut registry = Registry {
            types: Default::default(),
            directives: Default::default(),
            query_type: "Query".to_string(),
            mutation_type: None,
            subscription_type: None,
        };

        for name in ["Int", "Float", "String", "Boolean", "ID"] {
            registry.insert_type(ScalarType::new(name));
        }
        registry.insert_type(ObjectType::new("Query", []));

        registry.add_directive(MetaDirective {
            name: "skip".to_string(),
            description: Some(
                "Directs the executor to skip this field or fragment when the `if` argument is true."
                    .to_string(),
            ),
            locations: vec![
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            args: [(
                "if".to_string(),
                MetaInputValue::new("if", "Boolean!"),
            )]
            .into_iter()
            .collect(),
        });
        registry.add_directive(MetaDirective {
            name: "include".to_string(),
            description: Some(
                "Directs the executor to include this field or fragment only when the `if` argument is true."
                    .to_string(),
            ),
            locations: vec![
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            args: [(
                "if".to_string(),
                MetaInputValue::new("if", "Boolean!"),
            )]
            .into_iter()
            .collect(),
        });
        registry.add_directive(MetaDirective {
            name: "deprecated".to_string(),
            description: Some("Marks an element of a GraphQL schema as no longer supported.".to_string()),
            locations: vec![
                DirectiveLocation::FieldDefinition,
                DirectiveLocation::EnumValue,
            ],
            args: [(
                "reason".to_string(),
                MetaInputValue::new("reason", "String")
                    .with_default(ConstValue::String("No longer supported".to_string())),
            )]
            .into_iter()
            .collect(),
        });

        registry
    }

    pub fn insert_type(&mut self, ty: impl Into<MetaType>) {
        let ty = ty.into();
        self.types.insert(ty.name().to_string(), ty);
    }

    pub fn add_directive(&mut self, directive: MetaDirective) {
        self.directives.insert(directive.name.clone(), directive);
    }

    pub fn directive(&self, name: &str) -> Option<&MetaDirective> {
        self.directives.get(name)
    }

    pub fn lookup_type(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    /// Look up a type by a possibly wrapped reference, e.g. `[Dog!]!`.
    pub fn concrete_type_by_name(&self, type_name: &str) -> Option<&MetaType> {
        self.types.get(MetaTypeName::concrete_typename(type_name))
    }

    pub fn query_root(&self) -> &MetaType {
        &self.types[&self.query_type]
    }

    pub fn mutation_root(&self) -> Option<&MetaType> {
        self.mutation_type
            .as_deref()
            .and_then(|name| self.types.get(name))
    }

    pub fn subscription_root(&self) -> Option<&MetaType> {
        self.subscription_type
            .as_deref()
            .and_then(|name| self.types.get(name))
    }

    /// The object types a composite type can stand for at runtime.
    pub fn possible_type_names<'a>(&'a self, ty: &'a MetaType) -> Vec<&'a str> {
        match ty.possible_types() {
            Some(possible) => possible.iter().map(String::as_str).collect(),
            None => vec![ty.name()],
        }
    }

    /// Verify the registry invariants: every type reference resolves, object
    /// fields are compatible with the interfaces they implement, enum names
    /// and values are unique, and wrappers are well formed (in particular no
    /// doubled non-null).
    pub fn check(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let mut check_reference = |reference: &str, site: String| {
            if !well_formed_reference(reference) {
                errors.push(format!("Malformed type reference \"{reference}\" in {site}"));
            } else if self.concrete_type_by_name(reference).is_none() {
                errors.push(format!(
                    "Unknown type \"{}\" referenced from {site}",
                    MetaTypeName::concrete_typename(reference)
                ));
            }
        };

        for ty in self.types.values() {
            if let Some(fields) = ty.fields() {
                for field in fields.values() {
                    check_reference(
                        field.ty.as_str(),
                        format!("field \"{}.{}\"", ty.name(), field.name),
                    );
                    for argument in field.args.values() {
                        check_reference(
                            argument.ty.as_str(),
                            format!(
                                "argument \"{}\" of \"{}.{}\"",
                                argument.name,
                                ty.name(),
                                field.name
                            ),
                        );
                    }
                }
            }
            if let MetaType::InputObject(input_object) = ty {
                for field in input_object.input_fields.values() {
                    check_reference(
                        field.ty.as_str(),
                        format!("input field \"{}.{}\"", ty.name(), field.name),
                    );
                }
            }
        }

        for ty in self.types.values() {
            let MetaType::Object(object) = ty else {
                continue;
            };
            for interface_name in &object.implements {
                let Some(MetaType::Interface(interface)) =
                    self.types.get(interface_name.as_str())
                else {
                    errors.push(format!(
                        "Object \"{}\" implements unknown interface \"{interface_name}\"",
                        object.name
                    ));
                    continue;
                };
                for interface_field in interface.fields.values() {
                    match object.field_by_name(&interface_field.name) {
                        None => errors.push(format!(
                            "Object \"{}\" is missing field \"{}\" of interface \"{}\"",
                            object.name, interface_field.name, interface.name
                        )),
                        Some(object_field) => {
                            let expected = MetaTypeName::create(interface_field.ty.as_str());
                            let found = MetaTypeName::create(object_field.ty.as_str());
                            if !expected.is_subtype(&found) {
                                errors.push(format!(
                                    "Field \"{}.{}\" of type \"{}\" is not compatible with \"{}.{}\" of type \"{}\"",
                                    object.name,
                                    object_field.name,
                                    object_field.ty,
                                    interface.name,
                                    interface_field.name,
                                    interface_field.ty
                                ));
                            }
                        }
                    }
                }
            }
        }

        for ty in self.types.values() {
            let MetaType::Enum(enum_type) = ty else {
                continue;
            };
            let mut seen = Vec::new();
            for value in enum_type.enum_values.values() {
                let underlying = value.underlying();
                if seen.iter().any(|other| underlying_eq(other, &underlying)) {
                    errors.push(format!(
                        "Enum \"{}\" has duplicate internal value {underlying}",
                        enum_type.name
                    ));
                }
                seen.push(underlying);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A reference is well formed when its wrappers nest properly and no
/// non-null wraps another non-null directly.
fn well_formed_reference(reference: &str) -> bool {
    match MetaTypeName::create(reference) {
        MetaTypeName::NonNull(inner) => {
            !inner.ends_with('!') && well_formed_reference(inner)
        }
        MetaTypeName::List(inner) => well_formed_reference(inner),
        MetaTypeName::Named(name) => {
            !name.is_empty() && !name.contains(['[', ']', '!'])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_lookup_case_rules() {
        let colors = EnumType::new(
            "Color",
            [
                MetaEnumValue::new("RED").with_value(serde_json::json!(0)),
                MetaEnumValue::new("GREEN").with_value(serde_json::json!(1)),
            ],
        );
        assert!(colors.value("RED").is_some());
        assert!(colors.value("red").is_none());
        assert!(colors.value_ignore_case("red").is_some());
        assert_eq!(
            colors.value_by_internal(&serde_json::json!(1.0)).unwrap().name,
            "GREEN"
        );
    }

    #[test]
    fn check_rejects_unknown_references() {
        let mut registry = Registry::new();
        registry.insert_type(ObjectType::new(
            "Query",
            [MetaField::new("dog", "Dog")],
        ));
        let errors = registry.check().unwrap_err();
        assert!(errors[0].contains("Unknown type \"Dog\""));
    }

    #[test]
    fn check_rejects_doubled_non_null() {
        let mut registry = Registry::new();
        registry.insert_type(ObjectType::new(
            "Query",
            [MetaField::new("name", "String!!")],
        ));
        let errors = registry.check().unwrap_err();
        assert!(errors[0].contains("Malformed type reference"));
    }

    #[test]
    fn check_enforces_interface_compatibility() {
        let mut registry = Registry::new();
        registry.insert_type(InterfaceType::new(
            "Pet",
            [MetaField::new("name", "String!")],
        ));
        registry.insert_type(
            ObjectType::new("Dog", [MetaField::new("name", "Int")]).implement("Pet"),
        );
        registry.insert_type(ObjectType::new(
            "Query",
            [MetaField::new("dog", "Dog")],
        ));
        let errors = registry.check().unwrap_err();
        assert!(errors.iter().any(|error| error.contains("not compatible")));
    }

    #[test]
    fn type_overlap_covers_abstract_pairs() {
        let mut registry = Registry::new();
        registry.insert_type(InterfaceType::new("Pet", []).with_possible_type("Dog"));
        registry.insert_type(UnionType::new("CatOrDog", ["Cat", "Dog"]));
        registry.insert_type(ObjectType::new("Dog", [MetaField::new("name", "String")]));
        let pet = registry.lookup_type("Pet").unwrap();
        let cat_or_dog = registry.lookup_type("CatOrDog").unwrap();
        let dog = registry.lookup_type("Dog").unwrap();
        assert!(pet.type_overlap(cat_or_dog));
        assert!(pet.type_overlap(dog));
        assert!(!dog.type_overlap(&MetaType::Object(ObjectType::new("Cat", []))));
    }
}
