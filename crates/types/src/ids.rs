//! Identifier newtypes for the registration domain.
//!
//! External callers (URL paths, the session gateway) supply identifiers as
//! opaque strings; the HTTP boundary parses them into these newtypes and
//! rejects anything that does not parse. Inside the workspace an identifier
//! is always typed — a `StudentId` cannot be passed where a `PeriodId` is
//! expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a numeric type for type-safe identifiers.
///
/// Each generated type provides:
/// - Standard derives: Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord
/// - Serde with `#[serde(transparent)]` for wire format compatibility
/// - `From<inner>` and `Into<inner>` conversions
/// - `Display` with a semantic prefix (e.g., `period:2`)
/// - `new()` constructor and `value()` accessor
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $inner:ty, $prefix:expr
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Creates a new identifier from a raw value.
            #[inline]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Returns the raw numeric value.
            #[inline]
            pub const fn value(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            #[inline]
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", $prefix, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = <$inner as std::str::FromStr>::Err;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.parse::<$inner>().map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a flex period.
    ///
    /// Wraps an `i64` with compile-time type safety to prevent mixing with
    /// other identifier types.
    ///
    /// # Display
    ///
    /// Formats with `period:` prefix: `period:2`.
    PeriodId, i64, "period"
);

define_id!(
    /// Unique identifier for a flex option within its parent period.
    ///
    /// Option identifiers are unique within one period; two periods may both
    /// contain an `option:1`.
    ///
    /// # Display
    ///
    /// Formats with `option:` prefix: `option:7`.
    OptionId, i64, "option"
);

define_id!(
    /// Unique identifier for an authenticated student.
    ///
    /// Always supplied by the session gateway; never accepted as a free-form
    /// client value.
    ///
    /// # Display
    ///
    /// Formats with `student:` prefix: `student:1234567`.
    StudentId, i64, "student"
);

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_semantic_prefix() {
        assert_eq!(PeriodId::new(2).to_string(), "period:2");
        assert_eq!(OptionId::new(7).to_string(), "option:7");
        assert_eq!(StudentId::new(1_234_567).to_string(), "student:1234567");
    }

    #[test]
    fn test_parse_round_trip() {
        let id: PeriodId = "42".parse().unwrap();
        assert_eq!(id, PeriodId::new(42));
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<PeriodId>().is_err());
        assert!("abc".parse::<OptionId>().is_err());
        assert!("12 ".parse::<StudentId>().is_err());
        assert!("0x1f".parse::<PeriodId>().is_err());
    }

    #[test]
    fn test_ids_are_distinct_types() {
        // Compile-time property; the conversions below are the only way across.
        let raw: i64 = PeriodId::new(9).into();
        assert_eq!(OptionId::from(raw), OptionId::new(9));
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&StudentId::new(5)).unwrap();
        assert_eq!(json, "5");
        let back: StudentId = serde_json::from_str("5").unwrap();
        assert_eq!(back, StudentId::new(5));
    }
}
