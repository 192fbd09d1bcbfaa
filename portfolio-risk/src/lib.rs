//! Portfolio & Risk Management
//!
//! Trade log, rolling P&L and the kill-switch that gates every order the
//! outer polling loop places.

mod config;
mod metrics;
mod risk;

pub use config::{
    create_config_template, load_config, load_layered_config, save_config, RiskConfig,
};
pub use metrics::{rolling_pnl, PnL};
pub use risk::{KillSwitchState, RiskManager};
