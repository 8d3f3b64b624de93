//! Distance units and the meters-to-unit conversion used for reported distances.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

const MILES_PER_METER: f64 = 0.000_621_371;
const METERS_PER_KILOMETER: f64 = 1000.0;

/// Output unit for reported distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "mi")]
    Miles,
    #[serde(rename = "km")]
    Kilometers,
}

impl Unit {
    /// Short label attached to formatted output (`mi` / `km`).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Unit::Miles => "mi",
            Unit::Kilometers => "km",
        }
    }

    /// Converts a raw meter distance into this unit.
    #[must_use]
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            Unit::Miles => meters * MILES_PER_METER,
            Unit::Kilometers => meters / METERS_PER_KILOMETER,
        }
    }

    /// Scale factor applied to one meter; bound into the search script so the
    /// engine reports distances already in this unit.
    #[must_use]
    pub fn meters_factor(self) -> f64 {
        self.from_meters(1.0)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mi" | "miles" => Ok(Unit::Miles),
            "km" | "kilometers" => Ok(Unit::Kilometers),
            other => Err(CoreError::InvalidUnit(other.to_string())),
        }
    }
}

/// Convert `value` meters into the unit named by `unit` (`mi` or `km`).
///
/// # Errors
///
/// Returns [`CoreError::InvalidUnit`] when `unit` is not a recognised label.
pub fn convert_from_meters(value: f64, unit: &str) -> Result<f64, CoreError> {
    let unit = match unit {
        "mi" => Unit::Miles,
        "km" => Unit::Kilometers,
        other => return Err(CoreError::InvalidUnit(other.to_string())),
    };
    Ok(unit.from_meters(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn converts_meters_to_miles() {
        assert_eq!(convert_from_meters(1.0, "mi").unwrap(), 0.000_621_371);
        assert_eq!(convert_from_meters(2.0, "mi").unwrap(), 0.000_621_371 * 2.0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn converts_meters_to_kilometers() {
        assert_eq!(convert_from_meters(1.0, "km").unwrap(), 0.001);
        assert_eq!(convert_from_meters(2.0, "km").unwrap(), 0.002);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn zero_stays_zero_for_both_units() {
        assert_eq!(convert_from_meters(0.0, "km").unwrap(), 0.0);
        assert_eq!(convert_from_meters(0.0, "mi").unwrap(), 0.0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn scaling_is_linear() {
        for unit in ["mi", "km"] {
            for v in [0.5, 3.0, 1609.344, 42_195.0] {
                let single = convert_from_meters(v, unit).unwrap();
                let double = convert_from_meters(2.0 * v, unit).unwrap();
                assert_eq!(double, 2.0 * single, "unit={unit} v={v}");
            }
        }
    }

    #[test]
    fn rejects_unrecognised_unit() {
        let err = convert_from_meters(1.0, "mile").unwrap_err();
        assert_eq!(err, CoreError::InvalidUnit("mile".to_string()));
    }

    #[test]
    fn parses_long_and_short_labels() {
        assert_eq!("mi".parse::<Unit>().unwrap(), Unit::Miles);
        assert_eq!("miles".parse::<Unit>().unwrap(), Unit::Miles);
        assert_eq!("km".parse::<Unit>().unwrap(), Unit::Kilometers);
        assert_eq!("kilometers".parse::<Unit>().unwrap(), Unit::Kilometers);
        assert!("MI".parse::<Unit>().is_err());
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn meters_factor_matches_unit_conversion() {
        assert_eq!(Unit::Miles.meters_factor(), 0.000_621_371);
        assert_eq!(Unit::Kilometers.meters_factor(), 0.001);
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(serde_json::to_string(&Unit::Kilometers).unwrap(), "\"km\"");
        assert_eq!(Unit::Miles.to_string(), "mi");
    }
}
