// Threshold Probability Model
// P(final reading lands in the market's region) under Normal(current, sigma)

use crate::sigma::SigmaCalculator;
use common::{validate_thresholds, Duration, EngineError, Market, Result, Temperature};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;
use tracing::debug;

/// Standard normal CDF
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Model edge over the market: `probability - market_price`
pub fn expected_value(probability: f64, market_price: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(EngineError::InvalidProbability(probability));
    }
    if !(0.0..=1.0).contains(&market_price) {
        return Err(EngineError::InvalidMarketPrice(market_price));
    }
    Ok(probability - market_price)
}

/// The deadline has passed
pub fn is_expired(time_remaining: Duration) -> bool {
    time_remaining.is_negative()
}

/// Normal-CDF model of threshold crossing
#[derive(Debug, Clone, Default)]
pub struct ProbabilityCalculator {
    sigma: SigmaCalculator,
}

impl ProbabilityCalculator {
    pub fn new(sigma: SigmaCalculator) -> Self {
        Self { sigma }
    }

    pub fn sigma_calculator(&self) -> &SigmaCalculator {
        &self.sigma
    }

    /// Probability that the final reading satisfies `market`
    pub fn market_probability(
        &self,
        market: &Market,
        current: Temperature,
        time_remaining: Duration,
    ) -> Result<f64> {
        self.range_probability(
            current,
            market.min_threshold,
            market.max_threshold,
            &market.station_id,
            time_remaining,
        )
    }

    /// Probability that the final reading falls in `[min, max]`, where a
    /// missing bound is infinite.
    ///
    /// * expired (`time_remaining < 0`): always 0
    /// * no time left (sigma 0): 1 if `current` already satisfies the region, else 0
    /// * `min == max`: probability of reaching the threshold, `1 - Φ(z)`
    pub fn range_probability(
        &self,
        current: Temperature,
        min: Option<Temperature>,
        max: Option<Temperature>,
        station_id: &str,
        time_remaining: Duration,
    ) -> Result<f64> {
        if is_expired(time_remaining) {
            return Ok(0.0);
        }
        validate_thresholds(min, max)?;

        let sigma = self.sigma.sigma(station_id, time_remaining);
        if sigma <= 0.0 {
            return Ok(if satisfies(current, min, max) { 1.0 } else { 0.0 });
        }

        let mu = current.celsius();
        let z = |bound: Temperature| (bound.celsius() - mu) / sigma;

        let probability = match (min, max) {
            (Some(lo), Some(hi)) if lo == hi => 1.0 - normal_cdf(z(lo)),
            (Some(lo), Some(hi)) => normal_cdf(z(hi)) - normal_cdf(z(lo)),
            (Some(lo), None) => 1.0 - normal_cdf(z(lo)),
            (None, Some(hi)) => normal_cdf(z(hi)),
            (None, None) => 1.0,
        };

        debug!(
            station_id,
            mu,
            sigma,
            hours_remaining = time_remaining.hours(),
            probability,
            "Threshold probability"
        );

        Ok(probability.clamp(0.0, 1.0))
    }
}

fn satisfies(current: Temperature, min: Option<Temperature>, max: Option<Temperature>) -> bool {
    match (min, max) {
        (Some(lo), Some(hi)) if lo == hi => current >= lo,
        _ => min.map_or(true, |lo| current >= lo) && max.map_or(true, |hi| current <= hi),
    }
}
