//! Shared kernel for the weather-threshold decision engine
//!
//! Holds the time model, temperature values, market and trade records, the
//! kill-switch data types, and the notification capability used by the
//! `signal-generation` and `portfolio-risk` crates.

pub mod error;
pub mod kill_switch;
pub mod market;
pub mod notify;
pub mod telemetry;
pub mod temperature;
pub mod time;
pub mod trade;

pub use error::{EngineError, Result};
pub use kill_switch::{KillSwitchReason, KillSwitchStatus};
pub use market::{validate_thresholds, Market, ThresholdKind};
pub use notify::{MemoryNotifier, NoopNotifier, Notification, Notifier, TracingNotifier};
pub use temperature::{Reading, Temperature};
pub use time::{Duration, Instant};
pub use trade::{OrderSide, Trade};
