//! Error types shared by the decision engine crates

use thiserror::Error;

/// Validation and lookup failures raised by a single evaluation.
///
/// None of these are fatal to the polling loop: the caller skips the market
/// or cycle that produced the error and carries on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    #[error("Market price {0} is outside [0, 1]")]
    InvalidMarketPrice(f64),

    #[error("Threshold range is inverted: min {min} > max {max}")]
    InvalidThresholdRange { min: f64, max: f64 },

    #[error("Temperature {0} is not a finite number")]
    InvalidTemperature(f64),

    #[error("Cannot interpret local time '{input}': {reason}")]
    InvalidTime { input: String, reason: String },

    #[error("Invalid format pattern: '{0}'")]
    InvalidFormat(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Trade not found: {0}")]
    TradeNotFound(String),

    #[error("Trade already settled: {0}")]
    TradeAlreadySettled(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
