// Signal Generator
// Per-market decision: expiry check -> probability -> EV filter -> price and size

use crate::config::SignalConfig;
use crate::kelly::PositionSizer;
use crate::probability::{expected_value, is_expired, ProbabilityCalculator};
use crate::sigma::SigmaCalculator;
use crate::signals::{SignalAction, SignalInput, SignalOutcome, TradingSignal};
use common::{Instant, Notification, Notifier, Result};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Evaluates markets against the threshold model
pub struct SignalGenerator {
    config: SignalConfig,
    probability: ProbabilityCalculator,
    sizer: PositionSizer,
    notifier: Arc<dyn Notifier>,
}

impl SignalGenerator {
    /// Validates `config` and builds the sigma table from its overrides
    pub fn new(config: SignalConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        config.validate()?;
        let sigma = SigmaCalculator::with_overrides(&config.base_sigma_overrides);
        Ok(Self {
            probability: ProbabilityCalculator::new(sigma),
            sizer: PositionSizer::from_config(&config),
            config,
            notifier,
        })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn probability_calculator(&self) -> &ProbabilityCalculator {
        &self.probability
    }

    /// Evaluate one market at `now`.
    ///
    /// Expired markets and edges at or below `min_ev` are filtered outcomes,
    /// not errors. Errors mean the input itself is malformed (inverted
    /// thresholds, a price outside `[0, 1]`) and the market should be skipped.
    pub fn evaluate(&self, input: &SignalInput, now: &Instant) -> Result<SignalOutcome> {
        let market = &input.market;
        let time_remaining = market.observation_end - *now;

        if is_expired(time_remaining) {
            debug!(market_id = %market.id, deadline = %market.observation_end, "Filtered: expired");
            return Ok(SignalOutcome::Expired);
        }

        let probability =
            self.probability
                .market_probability(market, input.observation, time_remaining)?;
        let ev = expected_value(probability, input.market_price)?;

        if ev <= self.config.min_ev {
            debug!(
                market_id = %market.id,
                probability,
                market_price = input.market_price,
                ev,
                min_ev = self.config.min_ev,
                "Filtered: EV too low"
            );
            return Ok(SignalOutcome::EvTooLow { ev });
        }

        let action = if ev > 0.0 {
            SignalAction::Buy
        } else {
            SignalAction::Hold
        };

        let signal = TradingSignal {
            id: Uuid::new_v4(),
            market_id: market.id.clone(),
            token_id: market.yes_token_id.clone(),
            action,
            probability,
            market_price: input.market_price,
            ev,
            recommended_price: self.sizer.recommended_price(action, probability, input.market_price),
            recommended_size: self.sizer.recommended_size(ev),
            timestamp: *now,
        };

        debug!(
            market_id = %signal.market_id,
            action = ?signal.action,
            probability,
            ev,
            price = signal.recommended_price,
            size = signal.recommended_size,
            "Signal emitted"
        );

        if action == SignalAction::Buy {
            self.notifier.notify(&Notification::SignalEmitted {
                market_id: signal.market_id.clone(),
                probability,
                ev,
                recommended_price: signal.recommended_price,
                recommended_size: signal.recommended_size,
            });
        }

        Ok(SignalOutcome::Signal(signal))
    }
}
