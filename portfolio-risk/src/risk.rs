//! Kill-switch state machine and data-quality checks

use crate::config::RiskConfig;
use crate::metrics::{rolling_pnl, PnL};
use common::{
    EngineError, Instant, KillSwitchReason, KillSwitchStatus, Notification, Notifier, Reading,
    Result, Trade,
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Kill-switch state. Nothing moves it back to `Inactive` except an explicit
/// [`RiskManager::deactivate`] or [`RiskManager::reset`].
#[derive(Debug, Clone, PartialEq)]
pub enum KillSwitchState {
    Inactive,
    Active {
        reason: KillSwitchReason,
        activated_at: Instant,
    },
}

/// Owns the trade log and the kill-switch.
///
/// All mutation goes through `&mut self`; callers sharing a manager across
/// threads must wrap it in a lock.
pub struct RiskManager {
    config: RiskConfig,
    trades: Vec<Trade>,
    state: KillSwitchState,
    notifier: Arc<dyn Notifier>,
}

impl RiskManager {
    pub fn new(config: RiskConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            trades: Vec::new(),
            state: KillSwitchState::Inactive,
            notifier,
        })
    }

    /// Like [`RiskManager::new`], but refuses a config whose budget differs
    /// from the one positions are sized against
    pub fn with_sizing_budget(
        config: RiskConfig,
        sizing_budget: f64,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.ensure_budget(sizing_budget)?;
        Self::new(config, notifier)
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Append to the trade log. No dedup, no eviction.
    pub fn record_trade(&mut self, trade: Trade) {
        info!(
            order_id = %trade.order_id,
            token_id = %trade.token_id,
            side = ?trade.side,
            price = trade.price,
            size = trade.size,
            "Trade recorded"
        );
        self.trades.push(trade);
    }

    /// Set realized P&L on the first unsettled trade with `order_id`
    pub fn settle_trade(&mut self, order_id: &str, pnl: f64) -> Result<()> {
        let mut matching = self
            .trades
            .iter_mut()
            .filter(|trade| trade.order_id == order_id)
            .peekable();

        if matching.peek().is_none() {
            return Err(EngineError::TradeNotFound(order_id.to_string()));
        }

        match matching.find(|trade| !trade.is_settled()) {
            Some(trade) => {
                trade.settle(pnl)?;
                info!(order_id, pnl, "Trade settled");
                Ok(())
            }
            None => Err(EngineError::TradeAlreadySettled(order_id.to_string())),
        }
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Settled P&L over the trailing window ending at `now`
    pub fn rolling_pnl(&self, now: &Instant) -> PnL {
        rolling_pnl(&self.trades, now, self.config.pnl_window_hours)
    }

    /// Propose a macro-loss halt when the rolling total is strictly below
    /// `-macro_loss_fraction * budget`. Does not activate anything.
    pub fn check_macro_loss(&self, now: &Instant) -> Option<KillSwitchReason> {
        let pnl = self.rolling_pnl(now);
        let threshold = self.config.macro_loss_threshold();

        if pnl.total < -threshold {
            warn!(total = pnl.total, threshold, "Rolling loss beyond threshold");
            Some(KillSwitchReason::MacroLoss {
                loss: pnl.total.abs(),
                threshold,
            })
        } else {
            None
        }
    }

    /// Propose a halt when the primary feed is missing, or when both feeds are
    /// present and disagree by strictly more than the configured °F limit.
    ///
    /// Readings arrive in the feed's own unit and are compared unrounded. A
    /// non-finite primary counts as missing; a non-finite secondary is ignored.
    pub fn check_data_quality(
        &self,
        primary: Option<Reading>,
        secondary: Option<Reading>,
        station_id: &str,
        now: &Instant,
    ) -> Option<KillSwitchReason> {
        let Some(primary) = primary.filter(Reading::is_finite) else {
            warn!(station_id, at = %now, "Primary feed unavailable");
            return Some(KillSwitchReason::FeedUnavailable {
                station_id: station_id.to_string(),
            });
        };

        let secondary = secondary?;
        if !secondary.is_finite() {
            warn!(station_id, %secondary, "Ignoring non-finite secondary reading");
            return None;
        }
        let divergence = (primary.fahrenheit() - secondary.fahrenheit()).abs();

        if divergence > self.config.divergence_threshold_f {
            warn!(
                station_id,
                primary_f = primary.fahrenheit(),
                secondary_f = secondary.fahrenheit(),
                divergence,
                at = %now,
                "Feed divergence beyond threshold"
            );
            Some(KillSwitchReason::DataQuality { divergence })
        } else {
            None
        }
    }

    /// Halt trading. Replaces any reason already active.
    pub fn activate(&mut self, reason: KillSwitchReason, now: &Instant) {
        if let KillSwitchState::Active { reason: previous, .. } = &self.state {
            warn!(%previous, replacement = %reason, "Kill switch already active, replacing reason");
        }

        error!(%reason, at = %now, "Kill switch ACTIVATED - trading halted");
        self.notifier.notify(&Notification::KillSwitchActivated {
            reason: reason.clone(),
            at: *now,
        });
        self.state = KillSwitchState::Active {
            reason,
            activated_at: *now,
        };
    }

    /// Resume trading. Safe to call when already inactive.
    pub fn deactivate(&mut self) {
        let previous = match std::mem::replace(&mut self.state, KillSwitchState::Inactive) {
            KillSwitchState::Active { reason, .. } => Some(reason),
            KillSwitchState::Inactive => None,
        };

        if previous.is_some() {
            info!("Kill switch deactivated - trading resumed");
            self.notifier
                .notify(&Notification::KillSwitchDeactivated { previous });
        }
    }

    /// Run the macro-loss check and activate on a breach
    pub fn enforce(&mut self, now: &Instant) -> KillSwitchStatus {
        if let Some(reason) = self.check_macro_loss(now) {
            self.activate(reason, now);
        }
        self.status()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, KillSwitchState::Active { .. })
    }

    pub fn state(&self) -> &KillSwitchState {
        &self.state
    }

    pub fn status(&self) -> KillSwitchStatus {
        match &self.state {
            KillSwitchState::Inactive => KillSwitchStatus::inactive(),
            KillSwitchState::Active {
                reason,
                activated_at,
            } => KillSwitchStatus {
                active: true,
                reason: Some(reason.clone()),
                activated_at: Some(*activated_at),
            },
        }
    }

    /// Clear the trade log and the kill-switch
    pub fn reset(&mut self) {
        self.trades.clear();
        self.state = KillSwitchState::Inactive;
        info!("Risk manager reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Duration, MemoryNotifier, NoopNotifier, OrderSide, Temperature};

    fn manager(budget: f64) -> RiskManager {
        let config = RiskConfig {
            budget,
            ..Default::default()
        };
        RiskManager::new(config, Arc::new(NoopNotifier)).unwrap()
    }

    fn settled(order_id: &str, at: Instant, pnl: f64) -> Trade {
        let mut trade = Trade::new(order_id, "yes-1", OrderSide::Buy, 0.5, 100.0, at);
        trade.settle(pnl).unwrap();
        trade
    }

    fn temp(c: f64) -> Option<Reading> {
        Some(Temperature::from_celsius(c).unwrap().into())
    }

    fn fahrenheit(f: f64) -> Option<Reading> {
        Some(Reading::Fahrenheit(f))
    }

    #[test]
    fn test_starts_inactive() {
        let rm = manager(1000.0);
        assert!(!rm.is_active());
        assert_eq!(rm.status(), KillSwitchStatus::inactive());
        assert_eq!(rm.state(), &KillSwitchState::Inactive);
    }

    #[test]
    fn test_macro_loss_candidate() {
        let now = Instant::now();
        let mut rm = manager(1000.0);
        rm.record_trade(settled("o-1", now, -250.0));

        let reason = rm.check_macro_loss(&now).expect("candidate");
        assert_eq!(
            reason,
            KillSwitchReason::MacroLoss {
                loss: 250.0,
                threshold: 200.0
            }
        );
        // Checking never activates
        assert!(!rm.is_active());
    }

    #[test]
    fn test_macro_loss_boundary_is_strict() {
        let now = Instant::now();
        let mut rm = manager(1000.0);
        rm.record_trade(settled("o-1", now, -200.0));
        assert!(rm.check_macro_loss(&now).is_none());

        rm.record_trade(settled("o-2", now, -0.01));
        assert!(rm.check_macro_loss(&now).is_some());
    }

    #[test]
    fn test_old_losses_fall_out_of_window() {
        let now = Instant::now();
        let mut rm = manager(1000.0);
        rm.record_trade(settled("o-1", now + Duration::from_millis(-25 * 3_600_000), -900.0));
        assert!(rm.check_macro_loss(&now).is_none());
        assert_eq!(rm.trades().len(), 1);
    }

    #[test]
    fn test_missing_primary_feed() {
        let rm = manager(1000.0);
        let reason = rm.check_data_quality(None, temp(20.0), "KLGA", &Instant::now());
        assert_eq!(
            reason,
            Some(KillSwitchReason::FeedUnavailable {
                station_id: "KLGA".to_string()
            })
        );
    }

    #[test]
    fn test_divergence_candidate() {
        let rm = manager(1000.0);
        match rm.check_data_quality(temp(20.0), fahrenheit(75.0), "KLGA", &Instant::now()) {
            Some(KillSwitchReason::DataQuality { divergence }) => assert_eq!(divergence, 7.0),
            other => panic!("expected data quality candidate, got {other:?}"),
        }
    }

    #[test]
    fn test_divergence_boundary_is_strict() {
        let rm = manager(1000.0);
        let now = Instant::now();
        // 20.0°C = 68°F, 17.0°C = 62.6°F, 23.0°C = 73.4°F
        assert!(rm.check_data_quality(temp(20.0), temp(17.0), "KLGA", &now).is_some());
        assert!(rm.check_data_quality(temp(20.0), temp(22.0), "KLGA", &now).is_none());

        // 0.0°C = 32°F and 5.0°C = 41°F exactly, so the divergence sits on the limit
        let config = RiskConfig {
            divergence_threshold_f: 9.0,
            ..Default::default()
        };
        let rm = RiskManager::new(config, Arc::new(NoopNotifier)).unwrap();
        assert!(rm.check_data_quality(temp(0.0), temp(5.0), "KLGA", &now).is_none());
        assert!(rm.check_data_quality(temp(0.0), temp(5.1), "KLGA", &now).is_some());
    }

    #[test]
    fn test_fahrenheit_feed_exactly_at_limit() {
        let rm = manager(1000.0);
        let now = Instant::now();
        // 68°F vs 73°F is exactly 5.0°F apart
        assert!(rm.check_data_quality(fahrenheit(68.0), fahrenheit(73.0), "KLGA", &now).is_none());
        assert!(rm.check_data_quality(temp(20.0), fahrenheit(73.0), "KLGA", &now).is_none());
        assert!(rm.check_data_quality(temp(20.0), fahrenheit(73.1), "KLGA", &now).is_some());
    }

    #[test]
    fn test_non_finite_readings() {
        let rm = manager(1000.0);
        let now = Instant::now();
        assert!(matches!(
            rm.check_data_quality(fahrenheit(f64::NAN), temp(20.0), "KLGA", &now),
            Some(KillSwitchReason::FeedUnavailable { .. })
        ));
        assert!(rm.check_data_quality(temp(20.0), fahrenheit(f64::INFINITY), "KLGA", &now).is_none());
    }

    #[test]
    fn test_secondary_absent_is_fine() {
        let rm = manager(1000.0);
        assert!(rm.check_data_quality(temp(20.0), None, "KLGA", &Instant::now()).is_none());
    }

    #[test]
    fn test_activate_and_deactivate() {
        let now = Instant::now();
        let notifier = Arc::new(MemoryNotifier::new());
        let mut rm = RiskManager::new(RiskConfig::default(), notifier.clone()).unwrap();

        let reason = KillSwitchReason::DataQuality { divergence: 7.0 };
        rm.activate(reason.clone(), &now);
        assert!(rm.is_active());
        assert_eq!(
            rm.status(),
            KillSwitchStatus {
                active: true,
                reason: Some(reason.clone()),
                activated_at: Some(now),
            }
        );

        rm.deactivate();
        assert_eq!(rm.status(), KillSwitchStatus::inactive());
        rm.deactivate();
        assert_eq!(rm.status(), KillSwitchStatus::inactive());

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], Notification::KillSwitchActivated { reason: reason.clone(), at: now });
        assert_eq!(sent[1], Notification::KillSwitchDeactivated { previous: Some(reason) });
    }

    #[test]
    fn test_reactivation_replaces_reason() {
        let now = Instant::now();
        let later = now + Duration::from_millis(60_000);
        let mut rm = manager(1000.0);

        rm.activate(KillSwitchReason::DataQuality { divergence: 6.0 }, &now);
        rm.activate(
            KillSwitchReason::FeedUnavailable {
                station_id: "KORD".to_string(),
            },
            &later,
        );

        let status = rm.status();
        assert_eq!(
            status.reason,
            Some(KillSwitchReason::FeedUnavailable {
                station_id: "KORD".to_string()
            })
        );
        assert_eq!(status.activated_at, Some(later));
    }

    #[test]
    fn test_enforce_activates_on_breach() {
        let now = Instant::now();
        let mut rm = manager(1000.0);
        assert!(!rm.enforce(&now).active);

        rm.record_trade(settled("o-1", now, -201.0));
        let status = rm.enforce(&now);
        assert!(status.active);
        assert!(matches!(status.reason, Some(KillSwitchReason::MacroLoss { .. })));
    }

    #[test]
    fn test_settle_trade() {
        let now = Instant::now();
        let mut rm = manager(1000.0);
        rm.record_trade(Trade::new("o-1", "yes-1", OrderSide::Buy, 0.4, 50.0, now));

        assert_eq!(rm.rolling_pnl(&now).total, 0.0);
        rm.settle_trade("o-1", -30.0).unwrap();
        assert_eq!(rm.rolling_pnl(&now).total, -30.0);

        assert_eq!(
            rm.settle_trade("o-1", 5.0),
            Err(EngineError::TradeAlreadySettled("o-1".to_string()))
        );
        assert_eq!(
            rm.settle_trade("o-9", 5.0),
            Err(EngineError::TradeNotFound("o-9".to_string()))
        );
    }

    #[test]
    fn test_sizing_budget_mismatch_rejected() {
        let config = RiskConfig {
            budget: 500.0,
            ..Default::default()
        };
        assert!(RiskManager::with_sizing_budget(config.clone(), 500.0, Arc::new(NoopNotifier)).is_ok());
        assert!(matches!(
            RiskManager::with_sizing_budget(config, 1000.0, Arc::new(NoopNotifier)),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_reset_clears_everything() {
        let now = Instant::now();
        let mut rm = manager(1000.0);
        rm.record_trade(settled("o-1", now, -500.0));
        rm.enforce(&now);
        assert!(rm.is_active());

        rm.reset();
        assert!(!rm.is_active());
        assert!(rm.trades().is_empty());
        assert_eq!(rm.rolling_pnl(&now), PnL::zero());
    }
}
