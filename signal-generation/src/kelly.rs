// Position Sizing
// Capped, EV-proportional sizing (a fraction of Kelly, never full Kelly)

use crate::config::SignalConfig;
use crate::signals::SignalAction;

/// Turns an edge into an order price and size
#[derive(Debug, Clone)]
pub struct PositionSizer {
    /// Total bankroll
    pub budget: f64,
    /// Fraction of bankroll risked at an edge of 1.0
    pub max_allocation_fraction: f64,
    /// Price improvement kept below the model probability
    pub price_shade: f64,
}

impl PositionSizer {
    pub fn new(budget: f64, max_allocation_fraction: f64, price_shade: f64) -> Self {
        Self {
            budget,
            max_allocation_fraction,
            price_shade,
        }
    }

    pub fn from_config(config: &SignalConfig) -> Self {
        Self::new(config.budget, config.max_allocation_fraction, config.price_shade)
    }

    /// Buys bid just under the model probability; holds sit at the market
    pub fn recommended_price(&self, action: SignalAction, probability: f64, market_price: f64) -> f64 {
        match action {
            SignalAction::Buy => (probability - self.price_shade).clamp(0.0, 1.0),
            SignalAction::Hold => market_price,
        }
    }

    /// `budget * fraction * min(ev, 1)`, kept within `[0, budget]`
    pub fn recommended_size(&self, ev: f64) -> f64 {
        (self.budget * self.max_allocation_fraction * ev.min(1.0)).clamp(0.0, self.budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizer() -> PositionSizer {
        PositionSizer::new(1000.0, 0.10, 0.01)
    }

    #[test]
    fn test_buy_price_is_shaded() {
        let price = sizer().recommended_price(SignalAction::Buy, 0.65, 0.50);
        assert!((price - 0.64).abs() < 1e-12);
    }

    #[test]
    fn test_buy_price_clamped() {
        assert_eq!(sizer().recommended_price(SignalAction::Buy, 0.005, 0.0), 0.0);
        let full = PositionSizer::new(1000.0, 0.1, 0.0);
        assert_eq!(full.recommended_price(SignalAction::Buy, 1.0, 0.9), 1.0);
    }

    #[test]
    fn test_hold_price_is_market() {
        assert_eq!(sizer().recommended_price(SignalAction::Hold, 0.30, 0.42), 0.42);
    }

    #[test]
    fn test_size_proportional_to_ev() {
        let sizer = sizer();
        assert!((sizer.recommended_size(0.15) - 15.0).abs() < 1e-9);
        assert!((sizer.recommended_size(0.30) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_size_bounds() {
        let sizer = sizer();
        // Edge is capped at 1.0
        assert_eq!(sizer.recommended_size(1.0), 100.0);
        assert_eq!(sizer.recommended_size(5.0), 100.0);
        assert_eq!(sizer.recommended_size(-0.2), 0.0);

        let all_in = PositionSizer::new(1000.0, 1.0, 0.01);
        assert_eq!(all_in.recommended_size(1.0), 1000.0);
    }
}
