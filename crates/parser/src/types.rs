//! The executable-document model.
//!
//! Nodes mirror the GraphQL grammar: a [`Document`] holds operation and
//! fragment definitions, selection sets hold fields, fragment spreads and
//! inline fragments, and every node is wrapped in [`Positioned`].
//!
//! Definition lists are plain vectors rather than name-keyed maps: documents
//! built programmatically may carry duplicate names or several anonymous
//! operations, and the validator is responsible for rejecting them.

use std::fmt;

use async_graphql_value::{ConstValue, Name, Number};

use crate::{Pos, Positioned};

/// An executable GraphQL document.
#[derive(Debug, Default, Clone)]
pub struct Document {
    /// Operation definitions, in source order.
    pub operations: Vec<Positioned<OperationDefinition>>,
    /// Fragment definitions, in source order.
    pub fragments: Vec<Positioned<FragmentDefinition>>,
}

impl Document {
    /// Find a fragment definition by name. With duplicate names the first
    /// definition wins; `UniqueFragmentNames` reports the duplicates.
    pub fn fragment(&self, name: &str) -> Option<&Positioned<FragmentDefinition>> {
        self.fragments
            .iter()
            .find(|fragment| fragment.node.name.node.as_str() == name)
    }
}

/// The kind of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        })
    }
}

/// A single query, mutation or subscription.
#[derive(Debug, Clone)]
pub struct OperationDefinition {
    pub ty: OperationType,
    pub name: Option<Positioned<Name>>,
    pub variable_definitions: Vec<Positioned<VariableDefinition>>,
    pub directives: Vec<Positioned<Directive>>,
    pub selection_set: Positioned<SelectionSet>,
}

/// A variable declared by an operation.
#[derive(Debug, Clone)]
pub struct VariableDefinition {
    pub name: Positioned<Name>,
    pub var_type: Positioned<Type>,
    pub default_value: Option<Positioned<Value>>,
}

impl VariableDefinition {
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref().map(|value| &value.node)
    }
}

/// A type reference, e.g. `[String!]!`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    pub base: BaseType,
    pub nullable: bool,
}

/// The unwrapped part of a type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    Named(Name),
    List(Box<Type>),
}

impl Type {
    /// The named type at the bottom of any list/non-null wrappers.
    pub fn named_type(&self) -> &Name {
        match &self.base {
            BaseType::Named(name) => name,
            BaseType::List(inner) => inner.named_type(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            BaseType::Named(name) => write!(f, "{name}")?,
            BaseType::List(inner) => write!(f, "[{inner}]")?,
        }
        if !self.nullable {
            f.write_str("!")?;
        }
        Ok(())
    }
}

/// A directive annotation, e.g. `@skip(if: $flag)`.
#[derive(Debug, Clone)]
pub struct Directive {
    pub name: Positioned<Name>,
    pub arguments: Vec<(Positioned<Name>, Positioned<Value>)>,
}

impl Directive {
    pub fn get_argument(&self, name: &str) -> Option<&Positioned<Value>> {
        self.arguments
            .iter()
            .find(|(argument_name, _)| argument_name.node.as_str() == name)
            .map(|(_, value)| value)
    }
}

/// An ordered collection of selections.
#[derive(Debug, Default, Clone)]
pub struct SelectionSet {
    pub items: Vec<Positioned<Selection>>,
}

/// A single entry in a selection set.
#[derive(Debug, Clone)]
pub enum Selection {
    Field(Positioned<Field>),
    FragmentSpread(Positioned<FragmentSpread>),
    InlineFragment(Positioned<InlineFragment>),
}

impl Selection {
    pub fn directives(&self) -> &[Positioned<Directive>] {
        match self {
            Selection::Field(field) => &field.node.directives,
            Selection::FragmentSpread(spread) => &spread.node.directives,
            Selection::InlineFragment(fragment) => &fragment.node.directives,
        }
    }
}

/// A field selection.
#[derive(Debug, Clone)]
pub struct Field {
    pub alias: Option<Positioned<Name>>,
    pub name: Positioned<Name>,
    pub arguments: Vec<(Positioned<Name>, Positioned<Value>)>,
    pub directives: Vec<Positioned<Directive>>,
    pub selection_set: Positioned<SelectionSet>,
}

impl Field {
    /// The key this field contributes to the response map: the alias if one
    /// is given, the field name otherwise.
    pub fn response_key(&self) -> &Positioned<Name> {
        self.alias.as_ref().unwrap_or(&self.name)
    }

    pub fn get_argument(&self, name: &str) -> Option<&Positioned<Value>> {
        self.arguments
            .iter()
            .find(|(argument_name, _)| argument_name.node.as_str() == name)
            .map(|(_, value)| value)
    }
}

/// A named-fragment spread.
#[derive(Debug, Clone)]
pub struct FragmentSpread {
    pub fragment_name: Positioned<Name>,
    pub directives: Vec<Positioned<Directive>>,
}

/// An inline fragment, optionally re-typed with a condition.
#[derive(Debug, Clone)]
pub struct InlineFragment {
    pub type_condition: Option<Positioned<TypeCondition>>,
    pub directives: Vec<Positioned<Directive>>,
    pub selection_set: Positioned<SelectionSet>,
}

/// A named-fragment definition.
#[derive(Debug, Clone)]
pub struct FragmentDefinition {
    pub name: Positioned<Name>,
    pub type_condition: Positioned<TypeCondition>,
    pub directives: Vec<Positioned<Directive>>,
    pub selection_set: Positioned<SelectionSet>,
}

/// The `on Type` clause of a fragment.
#[derive(Debug, Clone)]
pub struct TypeCondition {
    pub on: Positioned<Name>,
}

/// A literal value as written in a query document.
///
/// Object literals are pair lists rather than maps so that duplicate field
/// names survive until `UniqueInputFieldNames` can report both sites.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A variable reference, e.g. `$name`.
    Variable(Name),
    Null,
    Number(Number),
    String(String),
    Boolean(bool),
    Enum(Name),
    List(Vec<Value>),
    Object(Vec<(Positioned<Name>, Value)>),
}

impl Value {
    /// A short description of the value's shape, for error messages.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Value::Variable(_) => "variable",
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    /// Convert into a [`ConstValue`], resolving variable references through
    /// `f`. Duplicate object fields collapse to the last occurrence, matching
    /// input-object coercion; validation has rejected them by this point.
    pub fn into_const_with<E>(
        self,
        mut f: impl FnMut(Name) -> Result<ConstValue, E>,
    ) -> Result<ConstValue, E> {
        self.into_const_inner(&mut f)
    }

    fn into_const_inner<E>(
        self,
        f: &mut impl FnMut(Name) -> Result<ConstValue, E>,
    ) -> Result<ConstValue, E> {
        Ok(match self {
            Value::Variable(name) => f(name)?,
            Value::Null => ConstValue::Null,
            Value::Number(number) => ConstValue::Number(number),
            Value::String(string) => ConstValue::String(string),
            Value::Boolean(boolean) => ConstValue::Boolean(boolean),
            Value::Enum(name) => ConstValue::Enum(name),
            Value::List(items) => ConstValue::List(
                items
                    .into_iter()
                    .map(|item| item.into_const_inner(f))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(fields) => ConstValue::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| Ok((name.node, value.into_const_inner(f)?)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// Convert into a [`ConstValue`], failing on any variable reference.
    pub fn into_const(self) -> Option<ConstValue> {
        self.into_const_with(|_| Err(())).ok()
    }

    /// Variable names referenced anywhere inside this value.
    pub fn referenced_variables(&self) -> Vec<&Name> {
        let mut variables = Vec::new();
        self.collect_variables(&mut variables);
        variables
    }

    fn collect_variables<'a>(&'a self, variables: &mut Vec<&'a Name>) {
        match self {
            Value::Variable(name) => variables.push(name),
            Value::List(items) => {
                for item in items {
                    item.collect_variables(variables);
                }
            }
            Value::Object(fields) => {
                for (_, value) in fields {
                    value.collect_variables(variables);
                }
            }
            _ => {}
        }
    }
}

impl From<ConstValue> for Value {
    fn from(value: ConstValue) -> Self {
        match value {
            ConstValue::Null => Value::Null,
            ConstValue::Number(number) => Value::Number(number),
            ConstValue::String(string) => Value::String(string),
            ConstValue::Boolean(boolean) => Value::Boolean(boolean),
            ConstValue::Binary(bytes) => Value::String(
                String::from_utf8_lossy(bytes.as_ref()).into_owned(),
            ),
            ConstValue::Enum(name) => Value::Enum(name),
            ConstValue::List(items) => Value::List(items.into_iter().map(Into::into).collect()),
            ConstValue::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (Positioned::new(name, Pos::default()), value.into()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Variable(name) => write!(f, "${name}"),
            Value::Null => f.write_str("null"),
            Value::Number(number) => write!(f, "{number}"),
            Value::String(string) => write_quoted(string, f),
            Value::Boolean(boolean) => write!(f, "{boolean}"),
            Value::Enum(name) => write!(f, "{name}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str("]")
            }
            Value::Object(fields) => {
                f.write_str("{")?;
                for (index, (name, value)) in fields.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {value}", name.node)?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_quoted(s: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            _ => fmt::Write::write_char(f, c)?,
        }
    }
    f.write_str("\"")
}
