//! Timezone-aware instants and signed durations
//!
//! Every deadline in the engine is an [`Instant`]: a UTC moment carrying the
//! IANA zone it was derived from. The zone label only affects display;
//! comparisons and arithmetic always use the UTC moment.

use crate::error::{EngineError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{
    DateTime, Duration as ChronoDuration, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Write};
use std::ops::{Add, Sub};

const MILLIS_PER_SECOND: f64 = 1_000.0;
const MILLIS_PER_MINUTE: f64 = 60_000.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Longest DST gap we walk across before giving up (one day of minutes)
const MAX_GAP_MINUTES: i64 = 24 * 60;

const LOCAL_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A UTC moment plus the timezone it was expressed in
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Instant {
    at: DateTime<Utc>,
    zone: Tz,
}

impl Instant {
    /// Current system time, labelled UTC
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    pub fn from_utc(at: DateTime<Utc>) -> Self {
        Self { at, zone: Tz::UTC }
    }

    /// Wrap a UTC moment and label it with `zone_id`
    pub fn from_utc_in(at: DateTime<Utc>, zone_id: &str) -> Result<Self> {
        Ok(Self {
            at,
            zone: parse_zone(zone_id)?,
        })
    }

    /// Interpret `civil` as wall-clock time in `zone_id`.
    ///
    /// A local time that falls inside a spring-forward gap resolves to the
    /// first valid wall-clock minute after it (the transition instant). A
    /// local time repeated by a fall-back overlap resolves to the earlier,
    /// pre-transition offset. Unparseable input is an error, never a default.
    pub fn from_local_time(civil: &str, zone_id: &str) -> Result<Self> {
        let zone = parse_zone(zone_id)?;
        let naive = parse_civil(civil)?;

        if let Some(local) = zone.from_local_datetime(&naive).earliest() {
            return Ok(Self {
                at: local.with_timezone(&Utc),
                zone,
            });
        }

        let start = naive_minute(&naive).ok_or_else(|| invalid_time(civil, "time out of range"))?;
        for step in 1..=MAX_GAP_MINUTES {
            let Some(candidate) = start.checked_add_signed(ChronoDuration::minutes(step)) else {
                break;
            };
            if let Some(local) = zone.from_local_datetime(&candidate).earliest() {
                tracing::debug!(
                    input = civil,
                    zone = zone.name(),
                    resolved = %local,
                    "Local time falls in a DST gap, shifted forward"
                );
                return Ok(Self {
                    at: local.with_timezone(&Utc),
                    zone,
                });
            }
        }

        Err(invalid_time(civil, "no valid local time follows this gap"))
    }

    pub fn as_utc(&self) -> DateTime<Utc> {
        self.at
    }

    pub fn zone_name(&self) -> &'static str {
        self.zone.name()
    }

    /// Same moment, relabelled for display in another zone
    pub fn to_timezone(&self, zone_id: &str) -> Result<Self> {
        Ok(Self {
            at: self.at,
            zone: parse_zone(zone_id)?,
        })
    }

    /// Wall-clock rendering in the labelled zone using a strftime pattern.
    /// Unknown specifiers are rejected up front.
    pub fn format(&self, pattern: &str) -> Result<String> {
        let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(EngineError::InvalidFormat(pattern.to_string()));
        }

        let mut rendered = String::new();
        write!(
            rendered,
            "{}",
            self.at.with_timezone(&self.zone).format_with_items(items.iter())
        )
        .map_err(|_| EngineError::InvalidFormat(pattern.to_string()))?;
        Ok(rendered)
    }

    /// `self + duration`, or `None` outside chrono's representable range
    pub fn checked_add(&self, duration: Duration) -> Option<Instant> {
        let delta = ChronoDuration::try_milliseconds(duration.milliseconds())?;
        Some(Instant {
            at: self.at.checked_add_signed(delta)?,
            zone: self.zone,
        })
    }

    /// Signed time from `earlier` to `self`
    pub fn since(&self, earlier: &Instant) -> Duration {
        Duration::from_millis((self.at - earlier.at).num_milliseconds())
    }
}

impl PartialEq for Instant {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at
    }
}

impl Eq for Instant {}

impl PartialOrd for Instant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instant {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at)
    }
}

impl Sub for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        self.since(&rhs)
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    /// Saturates at the earliest/latest representable moment
    fn add(self, rhs: Duration) -> Instant {
        self.checked_add(rhs).unwrap_or(Instant {
            at: if rhs.is_negative() {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            },
            zone: self.zone,
        })
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let local = self.at.with_timezone(&self.zone);
        write!(
            f,
            "{} [{}]",
            local.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.zone.name()
        )
    }
}

/// Signed span of time with millisecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Duration {
    millis: i64,
}

impl Duration {
    pub const ZERO: Duration = Duration { millis: 0 };

    pub const fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    pub fn milliseconds(&self) -> i64 {
        self.millis
    }

    pub fn seconds(&self) -> f64 {
        self.millis as f64 / MILLIS_PER_SECOND
    }

    pub fn minutes(&self) -> f64 {
        self.millis as f64 / MILLIS_PER_MINUTE
    }

    pub fn hours(&self) -> f64 {
        self.millis as f64 / MILLIS_PER_HOUR
    }

    pub fn is_negative(&self) -> bool {
        self.millis < 0
    }

    pub fn is_positive(&self) -> bool {
        self.millis > 0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}h", self.hours())
    }
}

fn parse_zone(zone_id: &str) -> Result<Tz> {
    zone_id
        .trim()
        .parse::<Tz>()
        .map_err(|_| EngineError::UnknownTimezone(zone_id.to_string()))
}

fn parse_civil(civil: &str) -> Result<NaiveDateTime> {
    let trimmed = civil.trim();
    LOCAL_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| invalid_time(civil, "expected YYYY-MM-DDTHH:MM[:SS[.fff]]"))
}

fn naive_minute(naive: &NaiveDateTime) -> Option<NaiveDateTime> {
    let time = NaiveTime::from_hms_opt(naive.hour(), naive.minute(), 0)?;
    Some(naive.date().and_time(time))
}

fn invalid_time(input: &str, reason: &str) -> EngineError {
    EngineError::InvalidTime {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
