//! The rule-driving traversal.
//!
//! Rules implement [`Visitor`] and are chained with [`VisitorNil::with`];
//! [`visit`] walks the document once, tracking the current output type and
//! input type, and every rule accumulates into the shared error sink.

use std::collections::HashMap;

use async_graphql_value::{Name, Variables};
use bracken_parser::{
    types::{
        Directive, Document, Field, FragmentDefinition, InlineFragment, OperationDefinition,
        OperationType, Selection, SelectionSet, Value, VariableDefinition,
    },
    Pos, Positioned,
};

use crate::registry::{MetaType, MetaTypeName, Registry};

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleError {
    pub locations: Vec<Pos>,
    pub message: String,
}

impl RuleError {
    pub fn new(locations: Vec<Pos>, message: impl Into<String>) -> Self {
        Self {
            locations,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, location) in self.locations.iter().enumerate() {
            if index == 0 {
                write!(f, "[{location}] ")?;
            } else {
                write!(f, "[{location}, ...] ")?;
            }
        }
        f.write_str(&self.message)
    }
}

/// Traversal state shared by every rule.
pub struct VisitorContext<'a> {
    pub registry: &'a Registry,
    pub variables: Option<&'a Variables>,
    pub errors: Vec<RuleError>,
    type_stack: Vec<Option<&'a MetaType>>,
    input_type: Vec<Option<MetaTypeName<'a>>>,
    fragments: HashMap<&'a str, &'a Positioned<FragmentDefinition>>,
    fail_fast: bool,
}

impl<'a> VisitorContext<'a> {
    pub fn new(
        registry: &'a Registry,
        doc: &'a Document,
        variables: Option<&'a Variables>,
        fail_fast: bool,
    ) -> Self {
        let mut fragments: HashMap<&'a str, &'a Positioned<FragmentDefinition>> = HashMap::new();
        for fragment in &doc.fragments {
            // First definition wins; duplicates are reported by a rule.
            fragments
                .entry(fragment.node.name.node.as_str())
                .or_insert(fragment);
        }
        Self {
            registry,
            variables,
            errors: Vec::new(),
            type_stack: Vec::new(),
            input_type: Vec::new(),
            fragments,
            fail_fast,
        }
    }

    pub fn report_error(&mut self, locations: Vec<Pos>, message: impl Into<String>) {
        self.errors.push(RuleError::new(locations, message));
    }

    /// True once fail-fast mode has something to fail with.
    pub fn should_stop(&self) -> bool {
        self.fail_fast && !self.errors.is_empty()
    }

    pub fn with_type<F: FnMut(&mut VisitorContext<'a>)>(
        &mut self,
        ty: Option<&'a MetaType>,
        mut f: F,
    ) {
        self.type_stack.push(ty);
        f(self);
        self.type_stack.pop();
    }

    pub fn with_input_type<F: FnMut(&mut VisitorContext<'a>)>(
        &mut self,
        ty: Option<MetaTypeName<'a>>,
        mut f: F,
    ) {
        self.input_type.push(ty);
        f(self);
        self.input_type.pop();
    }

    /// The type the current selections apply to.
    pub fn current_type(&self) -> Option<&'a MetaType> {
        self.type_stack.last().copied().flatten()
    }

    /// The type one level up from [`Self::current_type`].
    pub fn parent_type(&self) -> Option<&'a MetaType> {
        if self.type_stack.len() >= 2 {
            self.type_stack
                .get(self.type_stack.len() - 2)
                .copied()
                .flatten()
        } else {
            None
        }
    }

    pub fn current_input_type(&self) -> Option<MetaTypeName<'a>> {
        self.input_type.last().copied().flatten()
    }

    pub fn fragment(&self, name: &str) -> Option<&'a Positioned<FragmentDefinition>> {
        self.fragments.get(name).copied()
    }
}

/// Hooks a rule may implement. The default for every hook is a no-op.
pub trait Visitor<'a> {
    fn enter_document(&mut self, _ctx: &mut VisitorContext<'a>, _doc: &'a Document) {}
    fn exit_document(&mut self, _ctx: &mut VisitorContext<'a>, _doc: &'a Document) {}

    fn enter_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _operation: &'a Positioned<OperationDefinition>,
    ) {
    }
    fn exit_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _operation: &'a Positioned<OperationDefinition>,
    ) {
    }

    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment: &'a Positioned<FragmentDefinition>,
    ) {
    }
    fn exit_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment: &'a Positioned<FragmentDefinition>,
    ) {
    }

    fn enter_variable_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _variable_definition: &'a Positioned<VariableDefinition>,
    ) {
    }
    fn exit_variable_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _variable_definition: &'a Positioned<VariableDefinition>,
    ) {
    }

    fn enter_directive(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _directive: &'a Positioned<Directive>,
    ) {
    }
    fn exit_directive(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _directive: &'a Positioned<Directive>,
    ) {
    }

    fn enter_argument(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _name: &'a Positioned<Name>,
        _value: &'a Positioned<Value>,
    ) {
    }
    fn exit_argument(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _name: &'a Positioned<Name>,
        _value: &'a Positioned<Value>,
    ) {
    }

    fn enter_selection_set(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _selection_set: &'a Positioned<SelectionSet>,
    ) {
    }
    fn exit_selection_set(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _selection_set: &'a Positioned<SelectionSet>,
    ) {
    }

    fn enter_selection(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _selection: &'a Positioned<Selection>,
    ) {
    }
    fn exit_selection(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _selection: &'a Positioned<Selection>,
    ) {
    }

    fn enter_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {}
    fn exit_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {}

    fn enter_fragment_spread(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment_spread: &'a Positioned<bracken_parser::types::FragmentSpread>,
    ) {
    }
    fn exit_fragment_spread(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment_spread: &'a Positioned<bracken_parser::types::FragmentSpread>,
    ) {
    }

    fn enter_inline_fragment(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _inline_fragment: &'a Positioned<InlineFragment>,
    ) {
    }
    fn exit_inline_fragment(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _inline_fragment: &'a Positioned<InlineFragment>,
    ) {
    }
}

pub struct VisitorNil;

impl VisitorNil {
    pub fn with<V>(self, visitor: V) -> VisitorCons<V, Self> {
        VisitorCons(visitor, self)
    }
}

pub struct VisitorCons<A, B>(A, B);

impl<A, B> VisitorCons<A, B> {
    pub fn with<V>(self, visitor: V) -> VisitorCons<V, Self> {
        VisitorCons(visitor, self)
    }
}

impl<'a> Visitor<'a> for VisitorNil {}

macro_rules! delegate {
    ($($name:ident($($arg:ident: $ty:ty),*),)*) => {
        impl<'a, A: Visitor<'a>, B: Visitor<'a>> Visitor<'a> for VisitorCons<A, B> {
            $(
                fn $name(&mut self, ctx: &mut VisitorContext<'a>, $($arg: $ty),*) {
                    self.0.$name(ctx, $($arg),*);
                    self.1.$name(ctx, $($arg),*);
                }
            )*
        }
    };
}

delegate! {
    enter_document(doc: &'a Document),
    exit_document(doc: &'a Document),
    enter_operation_definition(operation: &'a Positioned<OperationDefinition>),
    exit_operation_definition(operation: &'a Positioned<OperationDefinition>),
    enter_fragment_definition(fragment: &'a Positioned<FragmentDefinition>),
    exit_fragment_definition(fragment: &'a Positioned<FragmentDefinition>),
    enter_variable_definition(variable_definition: &'a Positioned<VariableDefinition>),
    exit_variable_definition(variable_definition: &'a Positioned<VariableDefinition>),
    enter_directive(directive: &'a Positioned<Directive>),
    exit_directive(directive: &'a Positioned<Directive>),
    enter_argument(name: &'a Positioned<Name>, value: &'a Positioned<Value>),
    exit_argument(name: &'a Positioned<Name>, value: &'a Positioned<Value>),
    enter_selection_set(selection_set: &'a Positioned<SelectionSet>),
    exit_selection_set(selection_set: &'a Positioned<SelectionSet>),
    enter_selection(selection: &'a Positioned<Selection>),
    exit_selection(selection: &'a Positioned<Selection>),
    enter_field(field: &'a Positioned<Field>),
    exit_field(field: &'a Positioned<Field>),
    enter_fragment_spread(fragment_spread: &'a Positioned<bracken_parser::types::FragmentSpread>),
    exit_fragment_spread(fragment_spread: &'a Positioned<bracken_parser::types::FragmentSpread>),
    enter_inline_fragment(inline_fragment: &'a Positioned<InlineFragment>),
    exit_inline_fragment(inline_fragment: &'a Positioned<InlineFragment>),
}

/// Walk the document, driving every chained rule.
pub fn visit<'a, V: Visitor<'a>>(v: &mut V, ctx: &mut VisitorContext<'a>, doc: &'a Document) {
    v.enter_document(ctx, doc);

    for operation in &doc.operations {
        if ctx.should_stop() {
            return;
        }
        visit_operation_definition(v, ctx, operation);
    }
    for fragment in &doc.fragments {
        if ctx.should_stop() {
            return;
        }
        let condition_type = ctx
            .registry
            .types
            .get(fragment.node.type_condition.node.on.node.as_str());
        ctx.with_type(condition_type, |ctx| {
            visit_fragment_definition(v, ctx, fragment)
        });
    }

    if ctx.should_stop() {
        return;
    }
    v.exit_document(ctx, doc);
}

fn visit_operation_definition<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    operation: &'a Positioned<OperationDefinition>,
) {
    let root = match operation.node.ty {
        OperationType::Query => Some(ctx.registry.query_root()),
        OperationType::Mutation => ctx.registry.mutation_root(),
        OperationType::Subscription => ctx.registry.subscription_root(),
    };
    if root.is_none() {
        ctx.report_error(
            vec![operation.pos],
            format!("Schema is not configured for {}s.", operation.node.ty),
        );
        return;
    }

    ctx.with_type(root, |ctx| {
        v.enter_operation_definition(ctx, operation);
        for variable_definition in &operation.node.variable_definitions {
            if ctx.should_stop() {
                return;
            }
            visit_variable_definition(v, ctx, variable_definition);
        }
        for directive in &operation.node.directives {
            if ctx.should_stop() {
                return;
            }
            visit_directive(v, ctx, directive);
        }
        if ctx.should_stop() {
            return;
        }
        visit_selection_set(v, ctx, &operation.node.selection_set);
        if ctx.should_stop() {
            return;
        }
        v.exit_operation_definition(ctx, operation);
    });
}

fn visit_fragment_definition<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    fragment: &'a Positioned<FragmentDefinition>,
) {
    v.enter_fragment_definition(ctx, fragment);
    for directive in &fragment.node.directives {
        if ctx.should_stop() {
            return;
        }
        visit_directive(v, ctx, directive);
    }
    if ctx.should_stop() {
        return;
    }
    visit_selection_set(v, ctx, &fragment.node.selection_set);
    if ctx.should_stop() {
        return;
    }
    v.exit_fragment_definition(ctx, fragment);
}

fn visit_variable_definition<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    variable_definition: &'a Positioned<VariableDefinition>,
) {
    v.enter_variable_definition(ctx, variable_definition);
    v.exit_variable_definition(ctx, variable_definition);
}

fn visit_directive<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    directive: &'a Positioned<Directive>,
) {
    v.enter_directive(ctx, directive);
    let directive_def = ctx.registry.directive(directive.node.name.node.as_str());
    for (name, value) in &directive.node.arguments {
        if ctx.should_stop() {
            return;
        }
        let expected = directive_def
            .and_then(|def| def.argument(name.node.as_str()))
            .map(|argument| MetaTypeName::create(argument.ty.as_str()));
        ctx.with_input_type(expected, |ctx| {
            v.enter_argument(ctx, name, value);
            v.exit_argument(ctx, name, value);
        });
    }
    if ctx.should_stop() {
        return;
    }
    v.exit_directive(ctx, directive);
}

fn visit_selection_set<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    selection_set: &'a Positioned<SelectionSet>,
) {
    v.enter_selection_set(ctx, selection_set);
    for selection in &selection_set.node.items {
        if ctx.should_stop() {
            return;
        }
        visit_selection(v, ctx, selection);
    }
    if ctx.should_stop() {
        return;
    }
    v.exit_selection_set(ctx, selection_set);
}

fn visit_selection<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    selection: &'a Positioned<Selection>,
) {
    v.enter_selection(ctx, selection);
    match &selection.node {
        Selection::Field(field) => {
            // `__typename` resolves to `String!` everywhere and needs no
            // registry entry.
            let field_type = if field.node.name.node.as_str() == "__typename" {
                ctx.registry.lookup_type("String")
            } else {
                ctx.current_type()
                    .and_then(|ty| ty.field_by_name(field.node.name.node.as_str()))
                    .and_then(|field_def| {
                        ctx.registry.concrete_type_by_name(field_def.ty.as_str())
                    })
            };
            ctx.with_type(field_type, |ctx| visit_field(v, ctx, field));
        }
        Selection::FragmentSpread(fragment_spread) => {
            v.enter_fragment_spread(ctx, fragment_spread);
            for directive in &fragment_spread.node.directives {
                if ctx.should_stop() {
                    return;
                }
                visit_directive(v, ctx, directive);
            }
            if ctx.should_stop() {
                return;
            }
            v.exit_fragment_spread(ctx, fragment_spread);
        }
        Selection::InlineFragment(inline_fragment) => {
            let condition_type = match &inline_fragment.node.type_condition {
                Some(condition) => ctx.registry.types.get(condition.node.on.node.as_str()),
                None => ctx.current_type(),
            };
            ctx.with_type(condition_type, |ctx| {
                v.enter_inline_fragment(ctx, inline_fragment);
                for directive in &inline_fragment.node.directives {
                    if ctx.should_stop() {
                        return;
                    }
                    visit_directive(v, ctx, directive);
                }
                if ctx.should_stop() {
                    return;
                }
                visit_selection_set(v, ctx, &inline_fragment.node.selection_set);
                if ctx.should_stop() {
                    return;
                }
                v.exit_inline_fragment(ctx, inline_fragment);
            });
        }
    }
    if ctx.should_stop() {
        return;
    }
    v.exit_selection(ctx, selection);
}

fn visit_field<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    field: &'a Positioned<Field>,
) {
    v.enter_field(ctx, field);

    let field_def = ctx
        .parent_type()
        .and_then(|ty| ty.field_by_name(field.node.name.node.as_str()));
    for (name, value) in &field.node.arguments {
        if ctx.should_stop() {
            return;
        }
        let expected = field_def
            .and_then(|def| def.argument(name.node.as_str()))
            .map(|argument| MetaTypeName::create(argument.ty.as_str()));
        ctx.with_input_type(expected, |ctx| {
            v.enter_argument(ctx, name, value);
            v.exit_argument(ctx, name, value);
        });
    }

    for directive in &field.node.directives {
        if ctx.should_stop() {
            return;
        }
        visit_directive(v, ctx, directive);
    }
    if ctx.should_stop() {
        return;
    }
    visit_selection_set(v, ctx, &field.node.selection_set);
    if ctx.should_stop() {
        return;
    }
    v.exit_field(ctx, field);
}
