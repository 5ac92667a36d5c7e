//! Identifier types for users and books.
//!
//! This module defines strong types for the two lookup keys the lending
//! engine works with: `UserId` (directory key) and `Isbn` (catalog key).

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for identifier parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind}: {reason}")]
pub struct ParseIdError {
    kind: &'static str,
    reason: String,
}

/// Generates a `String` newtype identifier.
///
/// # Validation
///
/// - `FromStr::from_str()`: Trims and validates input (rejects empty strings
///   and embedded commas, which would corrupt the record formats)
/// - `From::from()` and `new()`: No validation (for trusted input)
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Create a new `", stringify!($name), "` without validation.")]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[doc = concat!("Get the ", $kind, " as a string slice.")]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[doc = concat!("Convert the `", stringify!($name), "` into its inner `String`.")]
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        kind: $kind,
                        reason: "cannot be empty".to_string(),
                    });
                }
                if trimmed.contains(',') {
                    return Err(ParseIdError {
                        kind: $kind,
                        reason: format!("'{trimmed}' contains a comma"),
                    });
                }
                Ok(Self(trimmed.to_string()))
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

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Unique key of a user in the directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use circulation_core::ids::UserId;
    ///
    /// let id = UserId::new("s001");
    /// assert_eq!(id.as_str(), "s001");
    ///
    /// let parsed: UserId = " f042 ".parse().unwrap();
    /// assert_eq!(parsed, UserId::new("f042"));
    /// ```
    UserId,
    "user ID"
);

string_id!(
    /// Unique key of a book in the catalog.
    ///
    /// No checksum validation is performed; institutions use local
    /// accession numbers in this field as often as real ISBNs.
    ///
    /// # Examples
    ///
    /// ```
    /// use circulation_core::ids::Isbn;
    ///
    /// let isbn = Isbn::new("978-0131103627");
    /// assert_eq!(isbn.to_string(), "978-0131103627");
    /// ```
    Isbn,
    "ISBN"
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!("  111 ".parse::<Isbn>(), Ok(Isbn::new("111")));
    }

    #[test]
    fn parse_rejects_empty() {
        let error = "   ".parse::<UserId>().unwrap_err();
        assert!(error.to_string().contains("user ID"));
        assert!(error.to_string().contains("empty"));
    }

    #[test]
    fn parse_rejects_commas() {
        let error = "a,b".parse::<Isbn>().unwrap_err();
        assert!(error.to_string().contains("comma"));
    }

    #[test]
    fn ids_order_lexically() {
        let mut ids = vec![UserId::new("u2"), UserId::new("u10"), UserId::new("u1")];
        ids.sort();
        assert_eq!(ids, vec![UserId::new("u1"), UserId::new("u10"), UserId::new("u2")]);
    }
}
