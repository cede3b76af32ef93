//! CSV price file adapter.
//!
//! Expects a header row naming at least `Date`, `Open`, `High`, `Low`,
//! `Close` and `Volume` (any order, any case). A `Symbol` column is optional.
//! Values wrapped in stray double quotes are accepted.

use crate::domain::error::DcaError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs;
use std::path::{Path, PathBuf};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%:z"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Read a single price file. The series symbol comes from the first
    /// `Symbol` value, falling back to the file stem.
    pub fn read_file(path: &Path) -> Result<PriceSeries, DcaError> {
        let path_str = path.display().to_string();
        let content = read_to_string(path)?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| format_error(&path_str, 1, e))?.clone();
        let columns = Columns::locate(&headers, &path_str)?;

        let mut symbol: Option<String> = None;
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                format_error(&path_str, line, e)
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if symbol.is_none() {
                symbol = columns
                    .symbol
                    .and_then(|idx| record.get(idx))
                    .map(clean)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
            }

            points.push(columns.point(&record, &path_str, line)?);
        }

        let symbol = symbol.or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        });

        if points.is_empty() {
            return Err(DcaError::NoData {
                symbol: symbol.unwrap_or(path_str),
            });
        }

        tracing::debug!(path = %path_str, points = points.len(), "loaded price file");
        Ok(PriceSeries::new(symbol, points))
    }

    /// Cheap pre-flight check: the file exists, carries the required columns
    /// and its first data row has a readable date.
    pub fn validate_file(path: &Path) -> Result<(), DcaError> {
        let path_str = path.display().to_string();
        let content = read_to_string(path)?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| format_error(&path_str, 1, e))?.clone();
        let columns = Columns::locate(&headers, &path_str)?;

        let mut records = rdr.records();
        let record = match records.next() {
            Some(r) => r.map_err(|e| format_error(&path_str, 2, e))?,
            None => return Err(DcaError::NoData { symbol: path_str }),
        };
        let line = record.position().map(|p| p.line()).unwrap_or(2);
        let raw = record.get(columns.date).map(clean).unwrap_or_default();
        parse_timestamp(raw).ok_or_else(|| DcaError::DataFormat {
            path: path_str,
            line,
            reason: format!("unrecognised date '{raw}'"),
        })?;
        Ok(())
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, DcaError> {
        Self::read_file(&self.csv_path(symbol))
    }

    fn list_symbols(&self) -> Result<Vec<String>, DcaError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| DcaError::DataRead {
            path: self.base_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DcaError::DataRead {
                path: self.base_path.display().to_string(),
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                symbols.push(stem.to_string_lossy().into_owned());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
    symbol: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord, path: &str) -> Result<Self, DcaError> {
        let names: Vec<String> = headers.iter().map(|h| clean(h).to_lowercase()).collect();

        let required = [
            ("Date", position(&names, &["date", "datetime"])),
            ("Open", position(&names, &["open"])),
            ("High", position(&names, &["high"])),
            ("Low", position(&names, &["low"])),
            ("Close", position(&names, &["close"])),
            ("Volume", position(&names, &["volume"])),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(label, _)| *label)
            .collect();
        if !missing.is_empty() {
            return Err(DcaError::DataFormat {
                path: path.to_string(),
                line: 1,
                reason: format!("missing columns: {}", missing.join(", ")),
            });
        }

        let [date, open, high, low, close, volume] = required.map(|(_, idx)| idx.unwrap_or(0));
        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            symbol: position(&names, &["symbol", "ticker"]),
        })
    }

    fn point(&self, record: &StringRecord, path: &str, line: u64) -> Result<PricePoint, DcaError> {
        let bad = |reason: String| DcaError::DataFormat {
            path: path.to_string(),
            line,
            reason,
        };

        let raw_date = record.get(self.date).map(clean).unwrap_or_default();
        let timestamp =
            parse_timestamp(raw_date).ok_or_else(|| bad(format!("unrecognised date '{raw_date}'")))?;

        let number = |idx: usize, name: &str| -> Result<f64, DcaError> {
            let raw = record.get(idx).map(clean).unwrap_or_default();
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| bad(format!("invalid {name} value '{raw}'")))
        };

        let close = number(self.close, "close")?;
        if close <= 0.0 {
            return Err(bad(format!("close must be positive, got {close}")));
        }

        Ok(PricePoint {
            timestamp,
            open: number(self.open, "open")?,
            high: number(self.high, "high")?,
            low: number(self.low, "low")?,
            close,
            volume: number(self.volume, "volume")?,
        })
    }
}

fn position(names: &[String], wanted: &[&str]) -> Option<usize> {
    names.iter().position(|n| wanted.contains(&n.as_str()))
}

fn read_to_string(path: &Path) -> Result<String, DcaError> {
    fs::read_to_string(path).map_err(|e| DcaError::DataRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn format_error(path: &str, line: u64, e: csv::Error) -> DcaError {
    DcaError::DataFormat {
        path: path.to_string(),
        line,
        reason: format!("CSV parse error: {}", e),
    }
}

fn clean(value: &str) -> &str {
    value.trim().trim_matches('"').trim()
}

/// Parse a price timestamp. Offsets are dropped and the local wall-clock
/// time kept; a bare date means midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = clean(value);
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|f| DateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
