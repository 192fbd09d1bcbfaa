//! Notification capability injected into the risk manager and signal generator

use crate::kill_switch::KillSwitchReason;
use crate::time::Instant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::{error, info};

/// Events worth telling a human about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    KillSwitchActivated {
        reason: KillSwitchReason,
        at: Instant,
    },
    KillSwitchDeactivated {
        previous: Option<KillSwitchReason>,
    },
    SignalEmitted {
        market_id: String,
        probability: f64,
        ev: f64,
        recommended_price: f64,
        recommended_size: f64,
    },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::KillSwitchActivated { reason, at } => {
                write!(f, "KILL SWITCH ACTIVATED at {}: {}", at, reason)
            }
            Notification::KillSwitchDeactivated { previous: Some(reason) } => {
                write!(f, "Kill switch deactivated (was: {})", reason)
            }
            Notification::KillSwitchDeactivated { previous: None } => {
                write!(f, "Kill switch deactivated")
            }
            Notification::SignalEmitted {
                market_id,
                probability,
                ev,
                recommended_price,
                recommended_size,
            } => write!(
                f,
                "BUY {} @ {:.2} x ${:.2} (p={:.1}%, ev={:.1}%)",
                market_id,
                recommended_price,
                recommended_size,
                probability * 100.0,
                ev * 100.0
            ),
        }
    }
}

/// Delivery channel for notifications (chat, email, log...)
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match notification {
            Notification::KillSwitchActivated { .. } => error!(%notification, "Notification"),
            _ => info!(%notification, "Notification"),
        }
    }
}

/// Drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: &Notification) {}
}

/// Keeps every notification in memory, in delivery order
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: &Notification) {
        match self.sent.lock() {
            Ok(mut sent) => sent.push(notification.clone()),
            Err(poisoned) => poisoned.into_inner().push(notification.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        notifier.notify(&Notification::KillSwitchDeactivated { previous: None });
        notifier.notify(&Notification::SignalEmitted {
            market_id: "m-1".to_string(),
            probability: 0.65,
            ev: 0.15,
            recommended_price: 0.64,
            recommended_size: 15.0,
        });

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to_string(), "Kill switch deactivated");
        assert_eq!(sent[1].to_string(), "BUY m-1 @ 0.64 x $15.00 (p=65.0%, ev=15.0%)");
    }

    #[test]
    fn test_activation_message_names_reason() {
        let notification = Notification::KillSwitchActivated {
            reason: KillSwitchReason::FeedUnavailable {
                station_id: "EGLC".to_string(),
            },
            at: Instant::now(),
        };
        assert!(notification.to_string().contains("Primary feed unavailable for EGLC"));
    }
}
