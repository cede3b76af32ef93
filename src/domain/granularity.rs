//! Native sampling interval detection for a price series.

use crate::domain::price::PriceSeries;
use std::fmt;
use std::str::FromStr;

/// Number of leading points inspected when averaging the sampling interval.
pub const GRANULARITY_SAMPLE_SIZE: usize = 100;

const MINUTE_MAX: f64 = 45.0;
const HOURLY_MAX: f64 = 90.0;
const HALF_DAY_MAX: f64 = 18.0 * 60.0;
const DAILY_MAX: f64 = 36.0 * 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    IntradayMinute,
    IntradayHourly,
    IntradayHalfDay,
    Daily,
    DailyPlus,
    Unknown,
}

impl Granularity {
    pub const ALL: [Granularity; 6] = [
        Granularity::IntradayMinute,
        Granularity::IntradayHourly,
        Granularity::IntradayHalfDay,
        Granularity::Daily,
        Granularity::DailyPlus,
        Granularity::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::IntradayMinute => "intraday_minute",
            Granularity::IntradayHourly => "intraday_hourly",
            Granularity::IntradayHalfDay => "intraday_half_day",
            Granularity::Daily => "daily",
            Granularity::DailyPlus => "daily_plus",
            Granularity::Unknown => "unknown",
        }
    }

    /// Classify a mean sampling interval given in minutes.
    pub fn from_mean_interval(minutes: f64) -> Self {
        if minutes < MINUTE_MAX {
            Granularity::IntradayMinute
        } else if minutes < HOURLY_MAX {
            Granularity::IntradayHourly
        } else if minutes < HALF_DAY_MAX {
            Granularity::IntradayHalfDay
        } else if minutes < DAILY_MAX {
            Granularity::Daily
        } else {
            Granularity::DailyPlus
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown granularity: {0}")]
pub struct ParseGranularityError(pub String);

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Granularity::ALL
            .into_iter()
            .find(|g| g.as_str() == wanted)
            .ok_or_else(|| ParseGranularityError(s.to_string()))
    }
}

/// Mean positive gap, in minutes, between consecutive points among the first
/// [`GRANULARITY_SAMPLE_SIZE`] points. Zero and negative gaps are ignored.
pub fn mean_interval_minutes(series: &PriceSeries) -> Option<f64> {
    let sample = &series.points()[..series.len().min(GRANULARITY_SAMPLE_SIZE)];

    let deltas: Vec<f64> = sample
        .windows(2)
        .map(|w| (w[1].timestamp - w[0].timestamp).num_milliseconds() as f64 / 60_000.0)
        .filter(|minutes| *minutes > 0.0)
        .collect();

    if deltas.is_empty() {
        return None;
    }
    Some(deltas.iter().sum::<f64>() / deltas.len() as f64)
}

/// Classify the native sampling interval of `series`.
///
/// Fewer than two points, or no positive gap at all, yields
/// [`Granularity::Unknown`].
pub fn detect_granularity(series: &PriceSeries) -> Granularity {
    if series.len() < 2 {
        return Granularity::Unknown;
    }
    match mean_interval_minutes(series) {
        Some(mean) => Granularity::from_mean_interval(mean),
        None => Granularity::Unknown,
    }
}
