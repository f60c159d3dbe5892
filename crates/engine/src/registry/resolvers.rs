//! Field resolvers.
//!
//! Every field definition carries a [`Resolver`]. The default reads the
//! property named by the field from the parent value; custom resolvers are
//! user-supplied async functions over a [`ResolverContext`].

use std::sync::Arc;

use async_graphql_value::{ConstValue, Name, Variables};
use bracken_parser::{types::Field, Positioned};
use futures_util::future::BoxFuture;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use super::{MetaField, MetaType, Registry};
use crate::{
    context::{Cancellation, Data},
    error::Result,
};

/// A value produced by a resolver, shared cheaply between the field that
/// produced it and the child fields reading from it.
#[derive(Debug, Clone, Default)]
pub struct ResolvedValue {
    data: Arc<JsonValue>,
}

impl ResolvedValue {
    pub fn new(value: JsonValue) -> Self {
        Self {
            data: Arc::new(value),
        }
    }

    pub fn data_resolved(&self) -> &JsonValue {
        &self.data
    }

    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    /// Take the value out, cloning only if it is still shared.
    pub fn take(self) -> JsonValue {
        Arc::try_unwrap(self.data).unwrap_or_else(|data| (*data).clone())
    }

    /// Read a property off an object value.
    pub fn get_field(&self, name: &str) -> Option<ResolvedValue> {
        self.data
            .get(name)
            .cloned()
            .map(ResolvedValue::new)
    }
}

impl From<JsonValue> for ResolvedValue {
    fn from(value: JsonValue) -> Self {
        Self::new(value)
    }
}

/// Everything a resolver can see about the field it is resolving.
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    pub registry: &'a Registry,
    /// The object or interface type the field was selected on.
    pub parent_type: &'a MetaType,
    /// The field definition being resolved.
    pub field: &'a MetaField,
    /// The field node as written in the query.
    pub field_ast: &'a Positioned<Field>,
    /// Coerced argument values, in declaration order.
    pub args: &'a IndexMap<Name, ConstValue>,
    /// The parent resolver's value.
    pub parent_value: &'a ResolvedValue,
    /// The coerced variable table for the request.
    pub variables: &'a Variables,
    /// Request-scoped user data.
    pub data: &'a Data,
    pub cancellation: &'a Cancellation,
}

impl<'a> ResolverContext<'a> {
    pub fn arg(&self, name: &str) -> Option<&'a ConstValue> {
        self.args.get(name)
    }
}

pub type BoxResolverFuture<'a> = BoxFuture<'a, Result<ResolvedValue>>;

/// Object-safe resolver dispatch. Implemented for plain functions and for
/// future-returning functions; keeping the boxing inside the impls lets
/// closure literals infer their signatures normally.
trait ResolveFn: Send + Sync {
    fn call<'a>(&self, ctx: ResolverContext<'a>) -> BoxResolverFuture<'a>;
}

struct SyncResolveFn<F>(F);

impl<F> ResolveFn for SyncResolveFn<F>
where
    F: Fn(ResolverContext<'_>) -> Result<ResolvedValue> + Send + Sync,
{
    fn call<'a>(&self, ctx: ResolverContext<'a>) -> BoxResolverFuture<'a> {
        let result = (self.0)(ctx);
        Box::pin(async move { result })
    }
}

struct AsyncResolveFn<F>(F);

impl<F> ResolveFn for AsyncResolveFn<F>
where
    F: for<'a> Fn(ResolverContext<'a>) -> BoxResolverFuture<'a> + Send + Sync,
{
    fn call<'a>(&self, ctx: ResolverContext<'a>) -> BoxResolverFuture<'a> {
        (self.0)(ctx)
    }
}

/// A user-supplied resolver function.
#[derive(Clone)]
pub struct CustomResolver(Arc<dyn ResolveFn>);

impl std::fmt::Debug for CustomResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CustomResolver")
    }
}

/// How a field produces its value.
#[derive(Debug, Clone, Default)]
pub enum Resolver {
    /// Read the property named by the field from the parent value.
    #[default]
    Property,
    Custom(CustomResolver),
}

impl Resolver {
    /// A resolver that may suspend. Use a plain `fn` item returning a
    /// [`BoxResolverFuture`]; closure literals defeat signature inference
    /// here.
    pub fn custom<F>(f: F) -> Self
    where
        F: for<'a> Fn(ResolverContext<'a>) -> BoxResolverFuture<'a> + Send + Sync + 'static,
    {
        Resolver::Custom(CustomResolver(Arc::new(AsyncResolveFn(f))))
    }

    /// A resolver that computes its value without suspending.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(ResolverContext<'_>) -> Result<ResolvedValue> + Send + Sync + 'static,
    {
        Resolver::Custom(CustomResolver(Arc::new(SyncResolveFn(f))))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Resolver::Custom(_))
    }

    pub async fn resolve(&self, ctx: ResolverContext<'_>) -> Result<ResolvedValue> {
        match self {
            Resolver::Property => Ok(ctx
                .parent_value
                .get_field(ctx.field.target_field_name())
                .unwrap_or_default()),
            Resolver::Custom(resolver) => resolver.0.call(ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_lookup_uses_mapped_name() {
        let value = ResolvedValue::new(serde_json::json!({ "display_name": "Rex" }));
        assert_eq!(
            value.get_field("display_name").unwrap().take(),
            serde_json::json!("Rex")
        );
        assert!(value.get_field("name").is_none());
    }

    #[test]
    fn take_unwraps_unshared_values() {
        let value = ResolvedValue::new(serde_json::json!([1, 2]));
        assert_eq!(value.take(), serde_json::json!([1, 2]));
    }
}
