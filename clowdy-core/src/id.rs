//! Opaque entity identifiers.
//!
//! The persistent store (out of scope for this crate — see the crate's top
//! level docs) mints these as short hex tokens. The core never generates or
//! parses them; it only threads them through.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[non_exhaustive]
        pub struct $name(pub String);

        impl $name {
            /// Creates an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

opaque_id!(FunctionId, "Identifies a [`crate::model::Function`].");
opaque_id!(ProjectId, "Identifies a [`crate::model::Project`].");
opaque_id!(RouteId, "Identifies a [`crate::model::Route`].");
opaque_id!(InvocationId, "Identifies an [`crate::model::Invocation`] log entry.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_inner_string() {
        let id = FunctionId::new("abc123def456");
        assert_eq!(id.to_string(), "abc123def456");
        assert_eq!(id.as_str(), "abc123def456");
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(ProjectId::new("p1"), ProjectId::new("p1"));
        assert_ne!(ProjectId::new("p1"), ProjectId::new("p2"));
    }
}
