#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use dcacompare::domain::error::DcaError;
pub use dcacompare::domain::price::{PricePoint, PriceSeries};
use dcacompare::ports::data_port::DataPort;
use std::collections::HashMap;
use std::io::Write;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, DcaError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(DcaError::DataRead {
                path: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        let points = self.data.get(symbol).cloned().unwrap_or_default();
        if points.is_empty() {
            return Err(DcaError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(PriceSeries::new(Some(symbol.to_string()), points))
    }

    fn list_symbols(&self) -> Result<Vec<String>, DcaError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn point(timestamp: NaiveDateTime, close: f64) -> PricePoint {
    PricePoint {
        timestamp,
        open: close,
        high: close,
        low: close,
        close,
        volume: 1_000.0,
    }
}

/// One point per `step` from `start` to `end` inclusive, with the close
/// moving linearly from `from` to `to`.
pub fn linear_points(
    start: NaiveDateTime,
    end: NaiveDateTime,
    step: Duration,
    from: f64,
    to: f64,
) -> Vec<PricePoint> {
    let steps = (end - start).num_seconds() / step.num_seconds();
    (0..=steps)
        .map(|i| {
            let close = if steps == 0 {
                from
            } else {
                from + (to - from) * i as f64 / steps as f64
            };
            point(start + step * i as i32, close)
        })
        .collect()
}

/// Daily series from 2020-01-01 to 2023-12-31 rising from 100 to 200.
pub fn four_year_daily_series() -> PriceSeries {
    PriceSeries::new(
        Some("TEST".to_string()),
        linear_points(
            date(2020, 1, 1),
            date(2023, 12, 31),
            Duration::days(1),
            100.0,
            200.0,
        ),
    )
}

pub fn to_csv(symbol: &str, points: &[PricePoint]) -> String {
    let mut out = String::from("Symbol,Date,Open,High,Low,Close,Volume\n");
    for p in points {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            symbol,
            p.timestamp.format("%Y-%m-%d"),
            p.open,
            p.high,
            p.low,
            p.close,
            p.volume
        ));
    }
    out
}

pub fn write_temp_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
