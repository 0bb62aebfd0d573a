//! Typed row identifiers.
//!
//! Every table gets its own ID newtype so a `ShopId` can never be passed where
//! a `UserId` is expected. IDs come from `SERIAL` columns and are always
//! positive.

/// Error returned when text is not a valid row ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid id: {0:?}")]
pub struct ParseIdError(pub String);

/// Parse a positive decimal ID, ignoring surrounding whitespace.
///
/// # Errors
///
/// Returns `ParseIdError` for anything that is not an integer in `1..=i32::MAX`.
pub fn parse_positive(s: &str) -> Result<i32, ParseIdError> {
    s.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ParseIdError(s.to_owned()))
}

/// Defines an `i32`-backed ID newtype: `Copy`, a bare integer in serde,
/// `FromStr` via [`parse_positive`], and a transparent `INT4` with the
/// `postgres` feature.
///
/// ```rust
/// # use coffeeshop_core::define_id;
/// define_id!(RoasterId);
///
/// let id: RoasterId = "42".parse().unwrap();
/// assert_eq!(id.as_i32(), 42);
/// assert!("0".parse::<RoasterId>().is_err());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type), sqlx(transparent))]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i32(self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::ParseIdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                $crate::types::id::parse_positive(s).map(Self)
            }
        }
    };
}

define_id!(UserId);
define_id!(ShopId);
define_id!(ReviewId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(" 7 ".parse::<ShopId>().unwrap(), ShopId::new(7));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "7a".parse::<ShopId>().unwrap_err();
        assert_eq!(err, ParseIdError("7a".to_string()));
        assert!("".parse::<ReviewId>().is_err());
        assert!("99999999999".parse::<ShopId>().is_err());
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        assert!("0".parse::<ShopId>().is_err());
        assert!("-3".parse::<UserId>().is_err());
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&UserId::new(3)).unwrap();
        assert_eq!(json, "3");
        let back: UserId = serde_json::from_str("3").unwrap();
        assert_eq!(back, UserId::new(3));
    }
}
