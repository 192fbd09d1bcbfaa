use common::{Instant, Market, Temperature};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stand-in market price until order-book quotes are wired in
pub const PLACEHOLDER_MARKET_PRICE: f64 = 0.5;

/// What to do with a market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    /// Only reachable with a negative EV threshold; kept for short positions
    Hold,
}

/// A recommendation produced by one evaluation. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub id: Uuid,
    pub market_id: String,
    pub token_id: String,
    pub action: SignalAction,
    pub probability: f64,
    pub market_price: f64,
    pub ev: f64,
    pub recommended_price: f64,
    pub recommended_size: f64,
    pub timestamp: Instant,
}

/// Everything needed to evaluate one market this cycle
#[derive(Debug, Clone)]
pub struct SignalInput {
    pub market: Market,
    pub observation: Temperature,
    pub market_price: f64,
}

impl SignalInput {
    pub fn new(market: Market, observation: Temperature, market_price: f64) -> Self {
        Self {
            market,
            observation,
            market_price,
        }
    }

    /// Input priced at [`PLACEHOLDER_MARKET_PRICE`]
    pub fn with_placeholder_price(market: Market, observation: Temperature) -> Self {
        Self::new(market, observation, PLACEHOLDER_MARKET_PRICE)
    }
}

/// Result of evaluating a single market
#[derive(Debug, Clone, PartialEq)]
pub enum SignalOutcome {
    Signal(TradingSignal),
    /// Deadline already passed
    Expired,
    /// Edge did not clear the threshold
    EvTooLow { ev: f64 },
}

impl SignalOutcome {
    pub fn signal(&self) -> Option<&TradingSignal> {
        match self {
            SignalOutcome::Signal(signal) => Some(signal),
            _ => None,
        }
    }

    pub fn into_signal(self) -> Option<TradingSignal> {
        match self {
            SignalOutcome::Signal(signal) => Some(signal),
            _ => None,
        }
    }
}
