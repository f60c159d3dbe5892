use async_graphql_value::Name;
use bracken_parser::{
    types::{Directive, Field, Value},
    Positioned,
};
use indexmap::IndexMap;

use crate::{
    registry::MetaInputValue,
    validation::{
        suggestion::make_suggestion,
        visitor::{Visitor, VisitorContext},
    },
};

enum ArgsOwner<'a> {
    Field(&'a str, &'a str),
    Directive(&'a str),
}

/// Arguments must be declared on the field or directive they are passed to.
#[derive(Default)]
pub struct KnownArgumentNames<'a> {
    current_args: Option<(&'a IndexMap<String, MetaInputValue>, ArgsOwner<'a>)>,
}

impl<'a> Visitor<'a> for KnownArgumentNames<'a> {
    fn enter_directive(&mut self, ctx: &mut VisitorContext<'a>, directive: &'a Positioned<Directive>) {
        self.current_args = ctx
            .registry
            .directive(directive.node.name.node.as_str())
            .map(|directive_def| {
                (
                    &directive_def.args,
                    ArgsOwner::Directive(directive.node.name.node.as_str()),
                )
            });
    }

    fn exit_directive(&mut self, _ctx: &mut VisitorContext<'a>, _directive: &'a Positioned<Directive>) {
        self.current_args = None;
    }

    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        self.current_args = ctx.parent_type().and_then(|ty| {
            ty.field_by_name(field.node.name.node.as_str())
                .map(|field_def| {
                    (
                        &field_def.args,
                        ArgsOwner::Field(ty.name(), field.node.name.node.as_str()),
                    )
                })
        });
    }

    fn exit_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {
        self.current_args = None;
    }

    fn enter_argument(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Positioned<Name>,
        _value: &'a Positioned<Value>,
    ) {
        let Some((args, owner)) = &self.current_args else {
            return;
        };
        if args.contains_key(name.node.as_str()) {
            return;
        }
        let mut message = match owner {
            ArgsOwner::Field(type_name, field_name) => format!(
                "Unknown argument \"{}\" on field \"{field_name}\" of type \"{type_name}\".",
                name.node
            ),
            ArgsOwner::Directive(directive_name) => format!(
                "Unknown argument \"{}\" on directive \"@{directive_name}\".",
                name.node
            ),
        };
        if let Some(suggestion) = make_suggestion(
            "Did you mean",
            args.keys().map(String::as_str),
            name.node.as_str(),
        ) {
            message.push(' ');
            message.push_str(&suggestion);
        }
        ctx.report_error(vec![name.pos], message);
    }
}
