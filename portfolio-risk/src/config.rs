//! Risk management configuration

use common::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kill-switch thresholds and rolling-window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Total trading budget (USD)
    #[serde(default = "default_budget")]
    pub budget: f64,

    /// Rolling loss, as a fraction of budget, beyond which trading halts
    #[serde(default = "default_macro_loss_fraction")]
    pub macro_loss_fraction: f64,

    /// Maximum tolerated primary/secondary feed disagreement (°F)
    #[serde(default = "default_divergence_threshold_f")]
    pub divergence_threshold_f: f64,

    /// Length of the rolling P&L window (hours)
    #[serde(default = "default_pnl_window_hours")]
    pub pnl_window_hours: u32,

    /// Polling cadence of the outer loop (seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            macro_loss_fraction: default_macro_loss_fraction(),
            divergence_threshold_f: default_divergence_threshold_f(),
            pnl_window_hours: default_pnl_window_hours(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl RiskConfig {
    /// Loss beyond which the macro kill-switch is proposed
    pub fn macro_loss_threshold(&self) -> f64 {
        self.macro_loss_fraction * self.budget
    }

    /// The sizing side must work from the same budget the loss limit is
    /// derived from
    pub fn ensure_budget(&self, sizing_budget: f64) -> Result<()> {
        if self.budget != sizing_budget {
            return Err(EngineError::InvalidConfig(format!(
                "sizing budget {} does not match risk budget {}",
                sizing_budget, self.budget
            )));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.budget.is_finite() && self.budget > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "budget {} must be positive",
                self.budget
            )));
        }
        if !(self.macro_loss_fraction > 0.0 && self.macro_loss_fraction <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "macro_loss_fraction {} must be within (0, 1]",
                self.macro_loss_fraction
            )));
        }
        if !(self.divergence_threshold_f.is_finite() && self.divergence_threshold_f >= 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "divergence_threshold_f {} must be >= 0",
                self.divergence_threshold_f
            )));
        }
        if self.pnl_window_hours == 0 {
            return Err(EngineError::InvalidConfig(
                "pnl_window_hours must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(EngineError::InvalidConfig(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_budget() -> f64 {
    1000.0
}

fn default_macro_loss_fraction() -> f64 {
    0.2
}

fn default_divergence_threshold_f() -> f64 {
    5.0
}

fn default_pnl_window_hours() -> u32 {
    24
}

fn default_poll_interval_secs() -> u64 {
    60
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> anyhow::Result<RiskConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: RiskConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from an optional TOML file, then apply `RISK_*`
/// environment overrides (e.g. `RISK_BUDGET=2500`)
pub fn load_layered_config(path: &str) -> anyhow::Result<RiskConfig> {
    let settings = ::config::Config::builder()
        .add_source(::config::File::from(Path::new(path)).required(false))
        .add_source(::config::Environment::with_prefix("RISK").try_parsing(true))
        .build()?;
    let config: RiskConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to TOML file
pub fn save_config(config: &RiskConfig, path: &str) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Create a default configuration file template
pub fn create_config_template(path: &str) -> anyhow::Result<()> {
    let template = "# Kill-switch configuration

# Total trading budget (USD)
budget = 1000.0

# Halt when 24h losses exceed this fraction of budget (strictly greater)
macro_loss_fraction = 0.2

# Halt when primary and secondary feeds differ by more than this (°F)
divergence_threshold_f = 5.0

# Rolling P&L window (hours)
pnl_window_hours = 24

# Outer loop polling interval (seconds)
poll_interval_secs = 60
";

    std::fs::write(path, template)?;
    Ok(())
}
