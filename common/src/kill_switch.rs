//! Kill-switch reason and status records

use crate::time::Instant;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why trading was halted. Exactly one reason is active at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KillSwitchReason {
    /// Rolling-window losses breached the budget fraction
    MacroLoss { loss: f64, threshold: f64 },
    /// Primary and secondary feeds disagree, in °F
    DataQuality { divergence: f64 },
    /// Primary feed returned nothing for this station
    FeedUnavailable { station_id: String },
}

impl fmt::Display for KillSwitchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KillSwitchReason::MacroLoss { loss, threshold } => {
                write!(f, "24h loss ${:.2} exceeds threshold ${:.2}", loss, threshold)
            }
            KillSwitchReason::DataQuality { divergence } => {
                write!(f, "Feed divergence {:.1}°F", divergence)
            }
            KillSwitchReason::FeedUnavailable { station_id } => {
                write!(f, "Primary feed unavailable for {}", station_id)
            }
        }
    }
}

/// Snapshot of the kill-switch handed to the outer loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillSwitchStatus {
    pub active: bool,
    pub reason: Option<KillSwitchReason>,
    pub activated_at: Option<Instant>,
}

impl KillSwitchStatus {
    pub fn inactive() -> Self {
        Self {
            active: false,
            reason: None,
            activated_at: None,
        }
    }
}

impl Default for KillSwitchStatus {
    fn default() -> Self {
        Self::inactive()
    }
}
