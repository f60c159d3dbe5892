use std::{
    any::Any,
    fmt::{self, Debug, Formatter},
};

use async_graphql_value::Variables;
use serde::Deserialize;

use crate::context::{Cancellation, Data};

/// A GraphQL request.
///
/// Deserializes from the conventional `{query, operationName, variables}`
/// wire shape; the remaining knobs are builder-style.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// The query source of the request.
    #[serde(default)]
    pub query: String,

    /// The operation to execute, when the document contains several.
    #[serde(default)]
    pub operation_name: Option<String>,

    /// The variables payload.
    #[serde(default)]
    pub variables: Variables,

    /// Stop validation at the first diagnostic.
    #[serde(skip)]
    pub fail_fast: bool,

    /// Request-scoped data accessible to resolvers.
    #[serde(skip)]
    pub data: Data,

    /// Cooperative cancellation signal for this request.
    #[serde(skip)]
    pub cancellation: Cancellation,
}

impl Request {
    /// Create a request object with query source.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: Variables::default(),
            fail_fast: false,
            data: Data::default(),
            cancellation: Cancellation::new(),
        }
    }

    /// Specify the operation name of the request.
    #[must_use]
    pub fn with_operation_name<T: Into<String>>(self, name: T) -> Self {
        Self {
            operation_name: Some(name.into()),
            ..self
        }
    }

    /// Specify the variables.
    #[must_use]
    pub fn variables(self, variables: Variables) -> Self {
        Self { variables, ..self }
    }

    /// Stop validating at the first diagnostic.
    #[must_use]
    pub fn fail_fast(self) -> Self {
        Self {
            fail_fast: true,
            ..self
        }
    }

    /// Insert some data for this request.
    #[must_use]
    pub fn data<D: Any + Send + Sync>(mut self, data: D) -> Self {
        self.data.insert(data);
        self
    }

    /// Use an externally-held cancellation signal.
    #[must_use]
    pub fn with_cancellation(self, cancellation: Cancellation) -> Self {
        Self {
            cancellation,
            ..self
        }
    }
}

impl<T: Into<String>> From<T> for Request {
    fn from(query: T) -> Self {
        Self::new(query)
    }
}

impl Debug for Request {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("query", &self.query)
            .field("operation_name", &self.operation_name)
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}
