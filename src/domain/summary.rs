//! Descriptive overview of a loaded price series.

use crate::domain::granularity::{detect_granularity, Granularity};
use crate::domain::price::PriceSeries;
use chrono::NaiveDateTime;

const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub points: usize,
    /// Lowest low in the series.
    pub min_price: f64,
    /// Highest high in the series.
    pub max_price: f64,
    pub first_price: f64,
    pub latest_price: f64,
    pub total_return_pct: f64,
    /// Compound annual growth over whole elapsed days; zero for spans shorter
    /// than a day.
    pub annual_return_pct: f64,
    pub granularity: Granularity,
}

impl SeriesSummary {
    /// Summarise `series`, or `None` when it has no points.
    pub fn compute(series: &PriceSeries) -> Option<Self> {
        let first = series.first()?;
        let last = series.last()?;

        let min_price = series
            .points()
            .iter()
            .map(|p| p.low)
            .fold(f64::INFINITY, f64::min);
        let max_price = series
            .points()
            .iter()
            .map(|p| p.high)
            .fold(f64::NEG_INFINITY, f64::max);

        let total_return_pct = (last.close - first.close) / first.close * 100.0;

        let years = (last.timestamp - first.timestamp).num_days() as f64 / DAYS_PER_YEAR;
        let annual_return_pct = if years > 0.0 {
            ((last.close / first.close).powf(1.0 / years) - 1.0) * 100.0
        } else {
            0.0
        };

        Some(Self {
            start: first.timestamp,
            end: last.timestamp,
            points: series.len(),
            min_price,
            max_price,
            first_price: first.close,
            latest_price: last.close,
            total_return_pct,
            annual_return_pct,
            granularity: detect_granularity(series),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn point(offset_days: i64, close: f64) -> PricePoint {
        PricePoint {
            timestamp: start() + Duration::days(offset_days),
            open: close,
            high: close + 5.0,
            low: close - 5.0,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn empty_series_has_no_summary() {
        assert!(SeriesSummary::compute(&PriceSeries::default()).is_none());
    }

    #[test]
    fn price_range_and_returns() {
        let series = PriceSeries::new(
            Some("TEST".into()),
            vec![point(0, 100.0), point(1, 80.0), point(2, 150.0), point(3, 120.0)],
        );
        let s = SeriesSummary::compute(&series).unwrap();

        assert_eq!(s.points, 4);
        assert_eq!(s.start, start());
        assert_eq!(s.end, start() + Duration::days(3));
        assert_eq!(s.min_price, 75.0);
        assert_eq!(s.max_price, 155.0);
        assert_eq!(s.first_price, 100.0);
        assert_eq!(s.latest_price, 120.0);
        assert_relative_eq!(s.total_return_pct, 20.0, max_relative = 1e-12);
        assert_eq!(s.granularity, Granularity::Daily);
    }

    #[test]
    fn annual_return_over_exact_years() {
        // 1461 days is four years of 365.25 days
        let series = PriceSeries::new(None, vec![point(0, 100.0), point(1461, 200.0)]);
        let s = SeriesSummary::compute(&series).unwrap();
        let expected = (2.0_f64.powf(0.25) - 1.0) * 100.0;
        assert_relative_eq!(s.annual_return_pct, expected, max_relative = 1e-9);
        assert_relative_eq!(s.total_return_pct, 100.0);
    }

    #[test]
    fn intraday_span_has_zero_annual_return() {
        let t = start();
        let points = (0..10)
            .map(|i| PricePoint {
                timestamp: t + Duration::minutes(5 * i),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0 + i as f64,
                volume: 0.0,
            })
            .collect();
        let s = SeriesSummary::compute(&PriceSeries::new(None, points)).unwrap();
        assert_eq!(s.annual_return_pct, 0.0);
        assert_eq!(s.granularity, Granularity::IntradayMinute);
    }
}
