use std::collections::HashMap;

use bracken_parser::{
    types::{Document, FragmentSpread, InlineFragment},
    Positioned,
};

use crate::validation::visitor::{Visitor, VisitorContext};

/// A fragment may only be spread where its type condition can intersect the
/// enclosing type.
#[derive(Default)]
pub struct PossibleFragmentSpreads<'a> {
    fragment_types: HashMap<&'a str, &'a str>,
}

impl<'a> Visitor<'a> for PossibleFragmentSpreads<'a> {
    fn enter_document(&mut self, _ctx: &mut VisitorContext<'a>, doc: &'a Document) {
        for fragment in &doc.fragments {
            self.fragment_types.insert(
                fragment.node.name.node.as_str(),
                fragment.node.type_condition.node.on.node.as_str(),
            );
        }
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment_spread: &'a Positioned<FragmentSpread>,
    ) {
        let Some(enclosing_type) = ctx.current_type() else {
            return;
        };
        let fragment_name = fragment_spread.node.fragment_name.node.as_str();
        let Some(condition_type) = self
            .fragment_types
            .get(fragment_name)
            .and_then(|name| ctx.registry.lookup_type(name))
        else {
            return;
        };
        if condition_type.is_composite()
            && enclosing_type.is_composite()
            && !enclosing_type.type_overlap(condition_type)
        {
            ctx.report_error(
                vec![fragment_spread.pos],
                format!(
                    "Fragment \"{fragment_name}\" cannot be spread here as objects of type \"{}\" can never be of type \"{}\"",
                    enclosing_type.name(),
                    condition_type.name()
                ),
            );
        }
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        inline_fragment: &'a Positioned<InlineFragment>,
    ) {
        if inline_fragment.node.type_condition.is_none() {
            return;
        }
        // The walk pushed the condition type; the enclosing type sits one
        // level up.
        let (Some(condition_type), Some(enclosing_type)) =
            (ctx.current_type(), ctx.parent_type())
        else {
            return;
        };
        if condition_type.is_composite()
            && enclosing_type.is_composite()
            && !enclosing_type.type_overlap(condition_type)
        {
            ctx.report_error(
                vec![inline_fragment.pos],
                format!(
                    "Fragment cannot be spread here as objects of type \"{}\" can never be of type \"{}\"",
                    enclosing_type.name(),
                    condition_type.name()
                ),
            );
        }
    }
}
