//! Newtype IDs for type-safe identifiers.
//!
//! Backend ids arrive as JSON strings (Mongo object ids) or numbers (catalog
//! ids), so every id deserializes from either and is held as a string.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                Ok(match RawId::deserialize(deserializer)? {
                    RawId::Text(s) => Self(s),
                    RawId::Number(n) => Self(n.to_string()),
                })
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
                Self(s.to_string())
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                Self(n.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(ReviewId);
define_id!(UserId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_json_string_or_number() {
        let a: ProductId = serde_json::from_str(r#""65f0c2""#).unwrap();
        let b: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(a.as_str(), "65f0c2");
        assert_eq!(b.as_str(), "42");
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = ProductId::from(7u64);
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""7""#);
    }

    #[test]
    fn test_id_rejects_other_json() {
        assert!(serde_json::from_str::<UserId>("true").is_err());
        assert!(serde_json::from_str::<UserId>("{}").is_err());
    }

    #[test]
    fn test_id_display_and_equality() {
        let id1 = ReviewId::new("r1");
        let id2: ReviewId = "r1".into();
        assert_eq!(id1, id2);
        assert_eq!(format!("{}", id1), "r1");
    }
}
