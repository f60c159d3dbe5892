use async_graphql_value::ConstValue;

use crate::error::ServerError;

/// The outcome of executing one request.
///
/// Serializes to the wire shape: `data` is absent when the request failed
/// before execution, `errors` is absent when nothing went wrong.
#[derive(Debug, Default, serde::Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ConstValue>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ServerError>,
}

impl Response {
    /// A response carrying data and any errors gathered along the way.
    pub fn new(data: ConstValue, errors: Vec<ServerError>) -> Self {
        Self {
            data: Some(data),
            errors,
        }
    }

    /// A pre-execution failure: errors only, no `data` key.
    pub fn from_errors(errors: Vec<ServerError>) -> Self {
        Self { data: None, errors }
    }

    /// Whether execution produced no errors at all.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The response as a JSON value, mostly for assertions and snapshots.
    pub fn into_value(self) -> serde_json::Value {
        serde_json::to_value(&self).expect("a response always serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn data_key_is_absent_on_pre_execution_failure() {
        let response = Response::from_errors(vec![ServerError::new(
            "bad",
            ErrorKind::Validation,
            None,
        )]);
        let value = response.into_value();
        assert!(value.get("data").is_none());
        assert_eq!(value["errors"][0]["message"], "bad");
    }

    #[test]
    fn errors_key_is_absent_on_success() {
        let response = Response::new(ConstValue::Null, Vec::new());
        let value = response.into_value();
        assert!(value.get("errors").is_none());
        assert!(value.get("data").is_some());
    }
}
