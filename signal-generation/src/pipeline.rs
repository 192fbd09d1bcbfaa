// Signal Generation Pipeline
// Evaluates every market in a polling cycle and ranks the survivors by edge

use super::generator::SignalGenerator;
use super::signals::{SignalInput, SignalOutcome, TradingSignal};
use common::{EngineError, Instant};
use tracing::{info, warn};

/// A market whose evaluation failed validation this cycle
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationFailure {
    pub market_id: String,
    pub error: EngineError,
}

/// Outcome of one batch evaluation
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Emitted signals, highest EV first
    pub signals: Vec<TradingSignal>,
    pub filtered_expired: usize,
    pub filtered_low_ev: usize,
    /// Skipped markets; the rest of the batch still runs
    pub failures: Vec<EvaluationFailure>,
}

impl BatchReport {
    pub fn evaluated(&self) -> usize {
        self.signals.len() + self.filtered_expired + self.filtered_low_ev + self.failures.len()
    }
}

/// Batch driver around a [`SignalGenerator`]
pub struct SignalPipeline {
    generator: SignalGenerator,
}

impl SignalPipeline {
    pub fn new(generator: SignalGenerator) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &SignalGenerator {
        &self.generator
    }

    /// Evaluate all `inputs` at the same `now`
    pub fn process(&self, inputs: &[SignalInput], now: &Instant) -> BatchReport {
        let mut report = BatchReport::default();

        for input in inputs {
            match self.generator.evaluate(input, now) {
                Ok(SignalOutcome::Signal(signal)) => report.signals.push(signal),
                Ok(SignalOutcome::Expired) => report.filtered_expired += 1,
                Ok(SignalOutcome::EvTooLow { .. }) => report.filtered_low_ev += 1,
                Err(error) => {
                    warn!(market_id = %input.market.id, %error, "Skipping market");
                    report.failures.push(EvaluationFailure {
                        market_id: input.market.id.clone(),
                        error,
                    });
                }
            }
        }

        report.signals.sort_by(|a, b| b.ev.total_cmp(&a.ev));

        info!(
            markets = inputs.len(),
            signals = report.signals.len(),
            filtered_expired = report.filtered_expired,
            filtered_low_ev = report.filtered_low_ev,
            failures = report.failures.len(),
            "Signal cycle complete"
        );

        report
    }
}
