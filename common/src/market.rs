//! Weather-threshold market records

use crate::error::{EngineError, Result};
use crate::temperature::Temperature;
use crate::time::Instant;
use serde::{Deserialize, Serialize};

/// Shape of the threshold region a market pays out on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKind {
    /// `[min, max]`
    Range,
    /// `[min, +inf)`
    Ceiling,
    /// `(-inf, max]`
    Floor,
    /// `min == max`, read as "will reach the threshold"
    Exact,
    /// No bounds at all
    Unbounded,
}

/// A binary market on the observed temperature at a station.
///
/// `None` on `min_threshold` means negative infinity, `None` on
/// `max_threshold` means positive infinity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub yes_token_id: String,
    pub station_id: String,
    pub min_threshold: Option<Temperature>,
    pub max_threshold: Option<Temperature>,
    pub observation_end: Instant,
}

impl Market {
    pub fn new(
        id: impl Into<String>,
        yes_token_id: impl Into<String>,
        station_id: impl Into<String>,
        min_threshold: Option<Temperature>,
        max_threshold: Option<Temperature>,
        observation_end: Instant,
    ) -> Result<Self> {
        validate_thresholds(min_threshold, max_threshold)?;
        Ok(Self {
            id: id.into(),
            yes_token_id: yes_token_id.into(),
            station_id: station_id.into(),
            min_threshold,
            max_threshold,
            observation_end,
        })
    }

    pub fn kind(&self) -> ThresholdKind {
        match (self.min_threshold, self.max_threshold) {
            (Some(min), Some(max)) if min == max => ThresholdKind::Exact,
            (Some(_), Some(_)) => ThresholdKind::Range,
            (Some(_), None) => ThresholdKind::Ceiling,
            (None, Some(_)) => ThresholdKind::Floor,
            (None, None) => ThresholdKind::Unbounded,
        }
    }
}

/// Reject `min > max`; open bounds never conflict
pub fn validate_thresholds(min: Option<Temperature>, max: Option<Temperature>) -> Result<()> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(EngineError::InvalidThresholdRange {
            min: min.celsius(),
            max: max.celsius(),
        }),
        _ => Ok(()),
    }
}
