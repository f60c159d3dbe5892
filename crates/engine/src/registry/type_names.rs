//! Working with GraphQL type reference strings.
//!
//! List and non-null wrappers are encoded in the reference itself
//! (`[Int!]!`); [`MetaTypeName`] decodes one layer at a time and
//! [`WrappingTypeIter`] walks the wrapper stack outside-in.

use std::fmt;

/// One decoded layer of a type reference.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MetaTypeName<'a> {
    List(&'a str),
    NonNull(&'a str),
    Named(&'a str),
}

impl fmt::Display for MetaTypeName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaTypeName::Named(name) => write!(f, "{name}"),
            MetaTypeName::NonNull(name) => write!(f, "{name}!"),
            MetaTypeName::List(name) => write!(f, "[{name}]"),
        }
    }
}

fn strip_brackets(type_name: &str) -> Option<&str> {
    type_name
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
}

impl<'a> MetaTypeName<'a> {
    #[inline]
    pub fn create(type_name: &str) -> MetaTypeName<'_> {
        if let Some(type_name) = type_name.strip_suffix('!') {
            MetaTypeName::NonNull(type_name)
        } else if let Some(type_name) = strip_brackets(type_name) {
            MetaTypeName::List(type_name)
        } else {
            MetaTypeName::Named(type_name)
        }
    }

    /// The named type at the bottom of the wrapper stack.
    #[inline]
    pub fn concrete_typename(type_name: &str) -> &str {
        match MetaTypeName::create(type_name) {
            MetaTypeName::List(inner) | MetaTypeName::NonNull(inner) => {
                Self::concrete_typename(inner)
            }
            MetaTypeName::Named(name) => name,
        }
    }

    #[inline]
    pub fn is_non_null(&self) -> bool {
        matches!(self, MetaTypeName::NonNull(_))
    }

    #[inline]
    #[must_use]
    pub fn unwrap_non_null(&self) -> Self {
        match self {
            MetaTypeName::NonNull(inner) => MetaTypeName::create(inner),
            _ => *self,
        }
    }

    /// Whether `sub` may be used where `self` is expected, respecting
    /// nullability: `T!` fits `T`, never the other way around.
    #[inline]
    pub fn is_subtype(&self, sub: &MetaTypeName<'_>) -> bool {
        match (self, sub) {
            (
                MetaTypeName::NonNull(super_type) | MetaTypeName::Named(super_type),
                MetaTypeName::NonNull(sub_type),
            ) => MetaTypeName::create(super_type).is_subtype(&MetaTypeName::create(sub_type)),
            (MetaTypeName::Named(super_type), MetaTypeName::Named(sub_type)) => {
                super_type == sub_type
            }
            (MetaTypeName::List(super_type), MetaTypeName::List(sub_type)) => {
                MetaTypeName::create(super_type).is_subtype(&MetaTypeName::create(sub_type))
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        match self {
            MetaTypeName::List(_) => true,
            MetaTypeName::NonNull(inner) => MetaTypeName::create(inner).is_list(),
            MetaTypeName::Named(name) => name.ends_with(']'),
        }
    }
}

/// Defines string conversions for a type-reference wrapper.
macro_rules! def_type_reference {
    ($ty:ident) => {
        #[derive(Clone, Default, Debug, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub struct $ty(String);

        impl $ty {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The named type with all wrappers stripped.
            pub fn named_type(&self) -> &str {
                MetaTypeName::concrete_typename(&self.0)
            }

            pub fn is_non_null(&self) -> bool {
                self.0.ends_with('!')
            }

            pub fn is_nullable(&self) -> bool {
                !self.is_non_null()
            }

            pub fn is_list(&self) -> bool {
                MetaTypeName::create(&self.0).is_list()
            }

            pub fn wrapping_types(&self) -> WrappingTypeIter<'_> {
                WrappingTypeIter(self.0.chars())
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> $ty {
                $ty(value.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> $ty {
                $ty(value)
            }
        }
    };
}

def_type_reference!(MetaFieldType);
def_type_reference!(InputValueType);

/// A list or non-null wrapper, outermost first.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum WrappingType {
    NonNull,
    List,
}

pub struct WrappingTypeIter<'a>(std::str::Chars<'a>);

impl Iterator for WrappingTypeIter<'_> {
    type Item = WrappingType;

    fn next(&mut self) -> Option<Self::Item> {
        match self.0.next_back()? {
            '!' => Some(WrappingType::NonNull),
            ']' => Some(WrappingType::List),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_type_iter() {
        let wrapping_types = |s: &str| WrappingTypeIter(s.chars()).collect::<Vec<_>>();
        assert_eq!(wrapping_types("String"), vec![]);
        assert_eq!(wrapping_types("String!"), vec![WrappingType::NonNull]);
        assert_eq!(
            wrapping_types("[String]!"),
            vec![WrappingType::NonNull, WrappingType::List]
        );
        assert_eq!(wrapping_types("[String]"), vec![WrappingType::List]);
        assert_eq!(
            wrapping_types("[String!]!"),
            vec![
                WrappingType::NonNull,
                WrappingType::List,
                WrappingType::NonNull
            ]
        );
    }

    #[test]
    fn subtype_respects_nullability() {
        let sub = |a: &str, b: &str| MetaTypeName::create(a).is_subtype(&MetaTypeName::create(b));
        assert!(sub("String", "String!"));
        assert!(sub("String", "String"));
        assert!(!sub("String!", "String"));
        assert!(sub("[Int]", "[Int!]"));
        assert!(!sub("[Int!]", "[Int]"));
        assert!(!sub("Int", "[Int]"));
    }

    #[test]
    fn concrete_name_strips_wrappers() {
        assert_eq!(MetaTypeName::concrete_typename("[[Dog!]]!"), "Dog");
        assert!(MetaTypeName::create("[Dog!]!").is_list());
        assert!(!MetaTypeName::create("Dog!").is_list());
    }
}
