use std::{collections::BTreeMap, fmt};

use async_graphql_value::ConstValue;
use bracken_parser::{ParseError, Pos};

use crate::query_path::QueryPath;

/// Classifies where in the pipeline an error originated.
///
/// The kind is for programmatic consumers; the wire format carries only
/// message, locations, path and extensions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Parse,
    Validation,
    VariableCoercion,
    LiteralCoercion,
    ValueCoercion,
    Serialization,
    Resolver,
    NonNullViolation,
    ListExpected,
    AbstractResolution,
    AmbiguousOperation,
    Canceled,
    Internal,
}

/// Extension entries attached to an error, passed through to the wire format.
pub type ErrorExtensionValues = BTreeMap<String, ConstValue>;

/// An error as it appears in a response's `errors` list.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ServerError {
    /// The error message, verbatim.
    pub message: String,
    /// Source positions, present on pre-execution errors.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Pos>,
    /// Response path, present on execution errors.
    #[serde(skip_serializing_if = "QueryPath::is_empty")]
    pub path: QueryPath,
    #[serde(skip)]
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ErrorExtensionValues>,
}

impl ServerError {
    pub fn new(message: impl Into<String>, kind: ErrorKind, pos: Option<Pos>) -> Self {
        Self {
            message: message.into(),
            locations: pos.into_iter().collect(),
            path: QueryPath::empty(),
            kind,
            extensions: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: QueryPath) -> Self {
        self.path = path;
        self
    }

    #[must_use]
    pub fn with_locations(mut self, locations: impl IntoIterator<Item = Pos>) -> Self {
        self.locations = locations.into_iter().collect();
        self
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<ParseError> for ServerError {
    fn from(error: ParseError) -> Self {
        ServerError::new(error.message(), ErrorKind::Parse, None)
            .with_locations(error.positions().iter().copied())
    }
}

/// Alias for `Result<T, ServerError>`.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// An error produced inside a resolver or a coercion step, before it has
/// been attached to a source position or response path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Error {
    /// The error message.
    pub message: String,
    /// Extensions to pass through to the wire format.
    pub extensions: Option<ErrorExtensionValues>,
}

impl Error {
    /// Create an error from the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: None,
        }
    }

    /// Attach an extension entry, creating the map on first use.
    #[must_use]
    pub fn extend_with(mut self, key: impl Into<String>, value: ConstValue) -> Self {
        self.extensions
            .get_or_insert_with(Default::default)
            .insert(key.into(), value);
        self
    }

    /// Convert to a server error anchored at `pos`.
    #[must_use]
    pub fn into_server_error(self, kind: ErrorKind, pos: Pos) -> ServerError {
        ServerError {
            message: self.message,
            locations: vec![pos],
            path: QueryPath::empty(),
            kind,
            extensions: self.extensions,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error.to_string())
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display_is_screaming_snake_case() {
        assert_eq!(ErrorKind::NonNullViolation.to_string(), "NON_NULL_VIOLATION");
        assert_eq!(ErrorKind::VariableCoercion.to_string(), "VARIABLE_COERCION");
        assert_eq!(ErrorKind::Canceled.to_string(), "CANCELED");
    }

    #[test]
    fn wire_format_omits_empty_fields() {
        let error = ServerError::new("boom", ErrorKind::Resolver, None);
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value, serde_json::json!({ "message": "boom" }));
    }

    #[test]
    fn wire_format_keeps_locations_and_path() {
        let error = ServerError::new("boom", ErrorKind::Resolver, Some(Pos::new(2, 7)))
            .with_path(QueryPath::empty().child("pets").child(0));
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "message": "boom",
                "locations": [{ "line": 2, "column": 7 }],
                "path": ["pets", 0],
            })
        );
    }
}
