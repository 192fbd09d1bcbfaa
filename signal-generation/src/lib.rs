// Signal Generation
// Threshold-crossing probability model, EV filter and position sizing for weather markets

pub mod config;
pub mod generator;
pub mod kelly;
pub mod pipeline;
pub mod probability;
pub mod sigma;
pub mod signals;

pub use config::{load_config, SignalConfig};
pub use generator::SignalGenerator;
pub use kelly::PositionSizer;
pub use pipeline::{BatchReport, EvaluationFailure, SignalPipeline};
pub use probability::{expected_value, is_expired, normal_cdf, ProbabilityCalculator};
pub use sigma::{SigmaCalculator, DEFAULT_BASE_SIGMA, SIGMA_HORIZON_HOURS};
pub use signals::{SignalAction, SignalInput, SignalOutcome, TradingSignal, PLACEHOLDER_MARKET_PRICE};
