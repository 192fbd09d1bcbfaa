//! Rolling profit and loss

use common::{Duration, Instant, Trade};
use serde::{Deserialize, Serialize};

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Profit and loss over a window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PnL {
    /// Sum of settled trade P&L
    pub realized: f64,

    /// Always zero: open positions are not marked to market
    pub unrealized: f64,

    /// `realized + unrealized`
    pub total: f64,
}

impl PnL {
    pub fn from_realized(realized: f64) -> Self {
        Self {
            realized,
            unrealized: 0.0,
            total: realized,
        }
    }

    pub fn zero() -> Self {
        Self::from_realized(0.0)
    }
}

impl Default for PnL {
    fn default() -> Self {
        Self::zero()
    }
}

/// Sum settled P&L of trades stamped within `[now - window_hours, now]`.
/// Unsettled trades contribute nothing.
pub fn rolling_pnl(trades: &[Trade], now: &Instant, window_hours: u32) -> PnL {
    let window_start = *now + Duration::from_millis(-(window_hours as i64) * MILLIS_PER_HOUR);

    let realized: f64 = trades
        .iter()
        .filter(|trade| trade.timestamp >= window_start && trade.timestamp <= *now)
        .filter_map(|trade| trade.pnl())
        .sum();

    PnL::from_realized(realized)
}
