//! Temperatures held at one-decimal-degree Celsius precision

use crate::error::{EngineError, Result};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places kept by every temperature
const PRECISION_DP: u32 = 1;

/// A temperature in degrees Celsius, rounded to 0.1°C on construction.
///
/// There is no way to build one without passing through the rounding step,
/// so `round(value * 10) / 10 == value` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Temperature(Decimal);

impl Temperature {
    pub fn from_celsius(celsius: f64) -> Result<Self> {
        let value = Decimal::from_f64(celsius)
            .filter(|_| celsius.is_finite())
            .ok_or(EngineError::InvalidTemperature(celsius))?;
        Ok(Self::from_decimal(value))
    }

    pub fn from_fahrenheit(fahrenheit: f64) -> Result<Self> {
        if !fahrenheit.is_finite() {
            return Err(EngineError::InvalidTemperature(fahrenheit));
        }
        Self::from_celsius((fahrenheit - 32.0) * 5.0 / 9.0)
    }

    pub fn from_decimal(celsius: Decimal) -> Self {
        Self(celsius.round_dp_with_strategy(PRECISION_DP, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn celsius(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    pub fn fahrenheit(&self) -> f64 {
        self.celsius() * 9.0 / 5.0 + 32.0
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Temperature {
    type Error = EngineError;

    fn try_from(value: Decimal) -> Result<Self> {
        Ok(Self::from_decimal(value))
    }
}

impl From<Temperature> for Decimal {
    fn from(value: Temperature) -> Self {
        value.0
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°C", self.0)
    }
}

/// A raw feed reading in the unit the feed reports, kept unrounded so unit
/// conversion adds no error of its own
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Reading {
    Celsius(f64),
    Fahrenheit(f64),
}

impl Reading {
    pub fn celsius(&self) -> f64 {
        match *self {
            Reading::Celsius(c) => c,
            Reading::Fahrenheit(f) => (f - 32.0) * 5.0 / 9.0,
        }
    }

    /// `F = C * 9/5 + 32`
    pub fn fahrenheit(&self) -> f64 {
        match *self {
            Reading::Celsius(c) => c * 9.0 / 5.0 + 32.0,
            Reading::Fahrenheit(f) => f,
        }
    }

    pub fn is_finite(&self) -> bool {
        match *self {
            Reading::Celsius(v) | Reading::Fahrenheit(v) => v.is_finite(),
        }
    }
}

impl From<Temperature> for Reading {
    fn from(value: Temperature) -> Self {
        Reading::Celsius(value.celsius())
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Celsius(c) => write!(f, "{c}°C"),
            Reading::Fahrenheit(v) => write!(f, "{v}°F"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rounds_to_one_decimal() {
        assert_eq!(Temperature::from_celsius(20.04).unwrap().as_decimal(), dec!(20.0));
        assert_eq!(Temperature::from_celsius(20.06).unwrap().as_decimal(), dec!(20.1));
        assert_eq!(Temperature::from_celsius(-3.26).unwrap().as_decimal(), dec!(-3.3));
        assert_eq!(Temperature::from_decimal(dec!(18.25)).as_decimal(), dec!(18.3));
    }

    #[test]
    fn test_precision_invariant_holds() {
        for raw in [0.0, 0.15, 12.345, -7.777, 33.333, 99.95, -40.04] {
            let value = Temperature::from_celsius(raw).unwrap().celsius();
            assert_eq!((value * 10.0).round() / 10.0, value, "{raw}");
        }
    }

    #[test]
    fn test_fahrenheit_conversion() {
        let t = Temperature::from_celsius(20.0).unwrap();
        assert_eq!(t.fahrenheit(), 68.0);

        let t = Temperature::from_fahrenheit(75.0).unwrap();
        assert_eq!(t.as_decimal(), dec!(23.9));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(Temperature::from_celsius(f64::NAN).is_err());
        assert!(Temperature::from_celsius(f64::INFINITY).is_err());
        assert!(Temperature::from_fahrenheit(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_deserialize_rounds() {
        let t: Temperature = serde_json::from_str("\"21.47\"").unwrap();
        assert_eq!(t.as_decimal(), dec!(21.5));
    }

    #[test]
    fn test_reading_keeps_fahrenheit_exact() {
        assert_eq!(Reading::Fahrenheit(73.0).fahrenheit(), 73.0);
        assert_eq!(Reading::Celsius(20.0).fahrenheit(), 68.0);
        assert_eq!(Reading::from(Temperature::from_celsius(20.0).unwrap()), Reading::Celsius(20.0));

        // The rounded Temperature path drifts; the raw reading does not
        assert!((Temperature::from_fahrenheit(73.0).unwrap().fahrenheit() - 73.0).abs() > 0.01);
    }

    #[test]
    fn test_reading_finiteness() {
        assert!(Reading::Celsius(-4.5).is_finite());
        assert!(!Reading::Fahrenheit(f64::NAN).is_finite());
    }
}
