//! Static validation of executable documents.
//!
//! All rules run in a single traversal and accumulate into one error sink;
//! the registration order below fixes the (otherwise unspecified) order of
//! diagnostics.

mod rules;
pub mod suggestion;
pub mod utils;
mod visitor;

use async_graphql_value::Variables;
use bracken_parser::types::Document;

pub use visitor::{RuleError, Visitor, VisitorContext};
use visitor::{visit, VisitorNil};

use crate::registry::Registry;

/// Run every validation rule over `doc`.
///
/// With `fail_fast` set, the walk stops at the first diagnostic and exactly
/// one error is returned.
pub fn check_rules(
    registry: &Registry,
    doc: &Document,
    variables: Option<&Variables>,
    fail_fast: bool,
) -> Result<(), Vec<RuleError>> {
    let mut ctx = VisitorContext::new(registry, doc, variables, fail_fast);

    let mut visitor = VisitorNil
        .with(rules::ArgumentsOfCorrectType::default())
        .with(rules::DefaultValuesOfCorrectType)
        .with(rules::FieldsOnCorrectType)
        .with(rules::FragmentsOnCompositeTypes)
        .with(rules::KnownArgumentNames::default())
        .with(rules::NoFragmentCycles::default())
        .with(rules::KnownFragmentNames)
        .with(rules::KnownTypeNames)
        .with(rules::LoneAnonymousOperation::default())
        .with(rules::NoUndefinedVariables::default())
        .with(rules::NoUnusedFragments::default())
        .with(rules::NoUnusedVariables::default())
        .with(rules::UniqueArgumentNames::default())
        .with(rules::UniqueFragmentNames::default())
        .with(rules::UniqueInputFieldNames)
        .with(rules::UniqueOperationNames::default())
        .with(rules::UniqueVariableNames::default())
        .with(rules::VariablesAreInputTypes)
        .with(rules::VariableInAllowedPosition::default())
        .with(rules::ScalarLeafs)
        .with(rules::PossibleFragmentSpreads::default())
        .with(rules::ProvidedNonNullArguments)
        .with(rules::KnownDirectives::default())
        .with(rules::DirectivesUnique)
        .with(rules::OverlappingFieldsCanBeMerged::default());

    visit(&mut visitor, &mut ctx, doc);

    if ctx.errors.is_empty() {
        return Ok(());
    }
    let mut errors = ctx.errors;
    if fail_fast {
        errors.truncate(1);
    }
    tracing::debug!(count = errors.len(), "document failed validation");
    Err(errors)
}
