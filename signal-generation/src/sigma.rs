// Station Volatility
// Expected spread of the final reading, decayed by time left until the deadline

use common::Duration;
use std::collections::HashMap;
use tracing::warn;

/// Horizon over which a station's base sigma is quoted
pub const SIGMA_HORIZON_HOURS: f64 = 24.0;

/// Base sigma for stations missing from the table
pub const DEFAULT_BASE_SIGMA: f64 = 3.5;

/// Expected 24-hour temperature volatility (°C) per observation station.
/// Continental climates swing more than maritime ones.
const BASE_SIGMAS: &[(&str, f64)] = &[
    // North America, continental interior
    ("KDEN", 5.0),
    ("KORD", 4.5),
    ("KMSP", 4.5),
    ("KDFW", 4.0),
    ("CYYZ", 4.0),
    ("KATL", 3.5),
    // North America, coastal
    ("KLGA", 3.5),
    ("KJFK", 3.5),
    ("KBOS", 3.5),
    ("KSEA", 2.5),
    ("KLAX", 2.5),
    ("KSFO", 2.0),
    ("KMIA", 2.0),
    // Europe
    ("EDDM", 4.0),
    ("LFPG", 3.0),
    ("EGLL", 2.5),
    ("EGLC", 2.5),
    // Asia-Pacific
    ("RKSI", 3.5),
    ("RJTT", 3.0),
    ("WSSS", 1.5),
];

/// Per-station sigma lookup with time decay
#[derive(Debug, Clone)]
pub struct SigmaCalculator {
    base_sigmas: HashMap<String, f64>,
}

impl SigmaCalculator {
    /// Built-in station table
    pub fn new() -> Self {
        Self {
            base_sigmas: BASE_SIGMAS
                .iter()
                .map(|(station, sigma)| (station.to_string(), *sigma))
                .collect(),
        }
    }

    /// Built-in table with some stations replaced or added
    pub fn with_overrides(overrides: &HashMap<String, f64>) -> Self {
        let mut calculator = Self::new();
        for (station, sigma) in overrides {
            calculator
                .base_sigmas
                .insert(station.to_uppercase(), sigma.max(0.0));
        }
        calculator
    }

    pub fn base_sigma(&self, station_id: &str) -> f64 {
        match self.base_sigmas.get(&station_id.to_uppercase()) {
            Some(sigma) => *sigma,
            None => {
                warn!(station_id, fallback = DEFAULT_BASE_SIGMA, "No base sigma for station");
                DEFAULT_BASE_SIGMA
            }
        }
    }

    /// `base * sqrt(clamp(hours, 0, 24) / 24)`
    ///
    /// Zero once the deadline is reached, capped at the base sigma beyond
    /// a day out.
    pub fn sigma(&self, station_id: &str, time_remaining: Duration) -> f64 {
        let hours = time_remaining.hours().clamp(0.0, SIGMA_HORIZON_HOURS);
        if hours == 0.0 {
            return 0.0;
        }
        self.base_sigma(station_id) * (hours / SIGMA_HORIZON_HOURS).sqrt()
    }
}

impl Default for SigmaCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(h: f64) -> Duration {
        Duration::from_millis((h * 3_600_000.0) as i64)
    }

    fn calculator_with(station: &str, base: f64) -> SigmaCalculator {
        let mut overrides = HashMap::new();
        overrides.insert(station.to_string(), base);
        SigmaCalculator::with_overrides(&overrides)
    }

    #[test]
    fn test_full_day_gives_base_sigma() {
        let calc = calculator_with("TEST", 3.5);
        assert_eq!(calc.sigma("TEST", hours(24.0)), 3.5);
    }

    #[test]
    fn test_quarter_day_halves_sigma() {
        let calc = calculator_with("TEST", 3.5);
        assert!((calc.sigma("TEST", hours(6.0)) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_sigma_capped_beyond_horizon() {
        let calc = SigmaCalculator::new();
        let base = calc.base_sigma("KORD");
        assert_eq!(calc.sigma("KORD", hours(24.0)), base);
        assert_eq!(calc.sigma("KORD", hours(72.0)), base);
    }

    #[test]
    fn test_no_time_left_means_no_uncertainty() {
        let calc = SigmaCalculator::new();
        assert_eq!(calc.sigma("KLGA", Duration::ZERO), 0.0);
        assert_eq!(calc.sigma("KLGA", hours(-3.0)), 0.0);
    }

    #[test]
    fn test_sigma_non_increasing_as_deadline_nears() {
        let calc = SigmaCalculator::new();
        for station in ["KDEN", "KMIA", "EGLC", "UNKNOWN"] {
            let mut previous = f64::INFINITY;
            for minutes in (0..=48 * 60).rev().step_by(15) {
                let sigma = calc.sigma(station, Duration::from_millis(minutes * 60_000));
                assert!(sigma >= 0.0);
                assert!(sigma <= previous, "{station} at {minutes}m");
                previous = sigma;
            }
        }
    }

    #[test]
    fn test_continental_more_volatile_than_maritime() {
        let calc = SigmaCalculator::new();
        assert!(calc.base_sigma("KDEN") > calc.base_sigma("KSFO"));
        assert!(calc.base_sigma("KORD") > calc.base_sigma("EGLC"));
    }

    #[test]
    fn test_unknown_station_uses_default() {
        let calc = SigmaCalculator::new();
        assert_eq!(calc.base_sigma("ZZZZ"), DEFAULT_BASE_SIGMA);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let calc = SigmaCalculator::new();
        assert_eq!(calc.base_sigma("klga"), calc.base_sigma("KLGA"));
    }
}
