//! Geographic coordinates for shop locations.

use serde::{Deserialize, Serialize};

/// Reasons a coordinate is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("must be a number")]
    NotANumber,
    #[error("must be between {min} and {max}")]
    OutOfRange { min: i16, max: i16 },
}

fn parse_bounded(s: &str, bound: f64) -> Result<f64, CoordinateError> {
    let value = s
        .trim()
        .parse::<f64>()
        .map_err(|_| CoordinateError::NotANumber)?;
    if !value.is_finite() {
        return Err(CoordinateError::NotANumber);
    }
    if value.abs() > bound {
        #[allow(clippy::cast_possible_truncation)]
        let max = bound as i16;
        return Err(CoordinateError::OutOfRange { min: -max, max });
    }
    Ok(value)
}

/// Degrees north of the equator, within `[-90, 90]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Latitude(f64);

impl Latitude {
    /// # Errors
    ///
    /// Returns an error if the text is not a finite number in range.
    pub fn parse(s: &str) -> Result<Self, CoordinateError> {
        parse_bounded(s, 90.0).map(Self)
    }

    #[must_use]
    pub const fn degrees(self) -> f64 {
        self.0
    }
}

/// Degrees east of Greenwich, within `[-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Longitude(f64);

impl Longitude {
    /// # Errors
    ///
    /// Returns an error if the text is not a finite number in range.
    pub fn parse(s: &str) -> Result<Self, CoordinateError> {
        parse_bounded(s, 180.0).map(Self)
    }

    #[must_use]
    pub const fn degrees(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude_accepts_decimal_text() {
        let lat = Latitude::parse(" 47.6097 ").unwrap();
        assert!((lat.degrees() - 47.6097).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert_eq!(Latitude::parse("north"), Err(CoordinateError::NotANumber));
        assert_eq!(Longitude::parse(""), Err(CoordinateError::NotANumber));
        assert_eq!(Longitude::parse("NaN"), Err(CoordinateError::NotANumber));
        assert_eq!(Latitude::parse("inf"), Err(CoordinateError::NotANumber));
    }

    #[test]
    fn test_range_checks() {
        assert_eq!(
            Latitude::parse("90.5"),
            Err(CoordinateError::OutOfRange { min: -90, max: 90 })
        );
        assert!(Longitude::parse("-180").is_ok());
        assert_eq!(
            Longitude::parse("180.01"),
            Err(CoordinateError::OutOfRange {
                min: -180,
                max: 180
            })
        );
    }
}
