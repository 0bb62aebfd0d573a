//! Review rating.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reasons a rating is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    #[error("rating must be a whole number")]
    NotANumber,
    #[error("rating must be between {min} and {max}", min = Rating::MIN, max = Rating::MAX)]
    OutOfRange,
}

/// A star rating between [`Rating::MIN`] and [`Rating::MAX`] inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(i32);

impl Rating {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    /// Every valid rating, lowest first. Used to render the rating picker.
    #[must_use]
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] outside `MIN..=MAX`.
    pub const fn new(value: i32) -> Result<Self, RatingError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(RatingError::OutOfRange);
        }
        Ok(Self(value))
    }

    /// Parse a rating from a form value.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::NotANumber`] for non-integers and
    /// [`RatingError::OutOfRange`] for integers outside the scale.
    pub fn parse(s: &str) -> Result<Self, RatingError> {
        let value = s
            .trim()
            .parse::<i32>()
            .map_err(|_| RatingError::NotANumber)?;
        Self::new(value)
    }

    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Rating {
    type Error = RatingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}
