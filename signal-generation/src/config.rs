//! Signal generation configuration

use common::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Settings for the EV filter and position sizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Minimum edge required to emit a signal (strictly greater than)
    #[serde(default = "default_min_ev")]
    pub min_ev: f64,

    /// Total trading budget (USD)
    #[serde(default = "default_budget")]
    pub budget: f64,

    /// Fraction of the budget risked on one trade at full edge
    #[serde(default = "default_max_allocation_fraction")]
    pub max_allocation_fraction: f64,

    /// Amount shaved off the model probability when pricing a buy
    #[serde(default = "default_price_shade")]
    pub price_shade: f64,

    /// Per-station base sigma (°C over 24h) replacing the built-in table
    #[serde(default)]
    pub base_sigma_overrides: HashMap<String, f64>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_ev: default_min_ev(),
            budget: default_budget(),
            max_allocation_fraction: default_max_allocation_fraction(),
            price_shade: default_price_shade(),
            base_sigma_overrides: HashMap::new(),
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_ev) {
            return Err(invalid(format!("min_ev {} must be within [0, 1]", self.min_ev)));
        }
        if !(self.budget.is_finite() && self.budget > 0.0) {
            return Err(invalid(format!("budget {} must be positive", self.budget)));
        }
        if !(self.max_allocation_fraction > 0.0 && self.max_allocation_fraction <= 1.0) {
            return Err(invalid(format!(
                "max_allocation_fraction {} must be within (0, 1]",
                self.max_allocation_fraction
            )));
        }
        if !(0.0..1.0).contains(&self.price_shade) {
            return Err(invalid(format!(
                "price_shade {} must be within [0, 1)",
                self.price_shade
            )));
        }
        if let Some((station, sigma)) = self
            .base_sigma_overrides
            .iter()
            .find(|(_, sigma)| !(sigma.is_finite() && **sigma >= 0.0))
        {
            return Err(invalid(format!("base sigma {} for {} must be >= 0", sigma, station)));
        }
        Ok(())
    }
}

fn invalid(message: String) -> EngineError {
    EngineError::InvalidConfig(message)
}

fn default_min_ev() -> f64 {
    0.05
}

fn default_budget() -> f64 {
    1000.0
}

fn default_max_allocation_fraction() -> f64 {
    0.10
}

fn default_price_shade() -> f64 {
    0.01
}

/// Load and validate configuration from a TOML file
pub fn load_config(path: &str) -> anyhow::Result<SignalConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: SignalConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
