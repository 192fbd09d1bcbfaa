//! Trade records appended by the order-execution layer

use crate::error::{EngineError, Result};
use crate::time::Instant;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// A placed order. `pnl` stays `None` until settlement sets it, once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub order_id: String,
    pub token_id: String,
    pub side: OrderSide,
    pub price: f64,
    pub size: f64,
    pub timestamp: Instant,
    pnl: Option<f64>,
}

impl Trade {
    pub fn new(
        order_id: impl Into<String>,
        token_id: impl Into<String>,
        side: OrderSide,
        price: f64,
        size: f64,
        timestamp: Instant,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            token_id: token_id.into(),
            side,
            price,
            size,
            timestamp,
            pnl: None,
        }
    }

    pub fn pnl(&self) -> Option<f64> {
        self.pnl
    }

    pub fn is_settled(&self) -> bool {
        self.pnl.is_some()
    }

    /// Record realized P&L; fails if this trade was already settled
    pub fn settle(&mut self, pnl: f64) -> Result<()> {
        if self.pnl.is_some() {
            return Err(EngineError::TradeAlreadySettled(self.order_id.clone()));
        }
        self.pnl = Some(pnl);
        Ok(())
    }
}
