use std::fmt;

/// One step of a response path: a response key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(untagged)]
pub enum QueryPathSegment {
    Index(usize),
    Name(String),
}

impl fmt::Display for QueryPathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryPathSegment::Index(index) => write!(f, "{index}"),
            QueryPathSegment::Name(name) => f.write_str(name),
        }
    }
}

/// The path from the response root to the field currently being resolved.
///
/// Cloned on every `child` step; paths are short and the clone keeps sibling
/// fields free to extend their own copies concurrently.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct QueryPath(Vec<QueryPathSegment>);

impl QueryPath {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn child(&self, segment: impl Into<QueryPathSegment>) -> Self {
        let mut path = self.clone();
        path.0.push(segment.into());
        path
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryPathSegment> {
        self.0.iter()
    }
}

impl From<usize> for QueryPathSegment {
    fn from(index: usize) -> Self {
        QueryPathSegment::Index(index)
    }
}

impl From<&str> for QueryPathSegment {
    fn from(name: &str) -> Self {
        QueryPathSegment::Name(name.to_string())
    }
}

impl From<String> for QueryPathSegment {
    fn from(name: String) -> Self {
        QueryPathSegment::Name(name)
    }
}

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            segment.fmt(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mixes_names_and_indices() {
        let path = QueryPath::empty().child("pets").child(2).child("name");
        assert_eq!(path.to_string(), "pets.2.name");
    }

    #[test]
    fn serializes_as_wire_segments() {
        let path = QueryPath::empty().child("pets").child(2);
        assert_eq!(
            serde_json::to_value(&path).unwrap(),
            serde_json::json!(["pets", 2])
        );
    }
}
