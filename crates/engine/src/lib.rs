//! A GraphQL validation and execution engine.
//!
//! The pipeline is `parse → validate → coerce variables → execute`: the
//! [`registry`] holds the runtime type system, [`validation`] runs the
//! static rule set over parsed documents, and [`resolver_utils`] walks
//! selection sets, dispatching to the resolvers registered on each field.
//!
//! ```no_run
//! use bracken_engine::{
//!     registry::{MetaField, ObjectType, Registry},
//!     Request, Schema,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = Registry::new();
//! registry.insert_type(ObjectType::new(
//!     "Query",
//!     [MetaField::new("hello", "String")],
//! ));
//! let schema = Schema::build(registry).finish()?;
//! let response = schema.execute(Request::new("{ hello }")).await;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod introspection;
mod query_path;
pub mod registry;
mod request;
mod resolver_utils;
mod response;
mod schema;
pub mod validation;
mod variables;

pub use async_graphql_value::{ConstValue, Name, Number, Variables};
pub use bracken_parser::{parse_query, Pos, Positioned};

pub use context::{Cancellation, Context, ContextExt, ContextField, ContextSelectionSet, Data};
pub use error::{Error, ErrorExtensionValues, ErrorKind, Result, ServerError, ServerResult};
pub use query_path::{QueryPath, QueryPathSegment};
pub use registry::{BoxResolverFuture, Registry, ResolvedValue, Resolver, ResolverContext};
pub use request::Request;
pub use response::Response;
pub use schema::{Schema, SchemaBuilder, SchemaError};
pub use validation::check_rules;
pub use variables::coerce_variables;
