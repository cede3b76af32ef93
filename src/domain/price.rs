//! Price points and the ordered price series the analysis runs over.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Price history sorted ascending by timestamp.
///
/// Duplicate timestamps are allowed. The series is never mutated once built;
/// all lookups are binary searches over the sorted points.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    symbol: Option<String>,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting the points by timestamp. The sort is stable so
    /// rows sharing a timestamp keep their input order.
    pub fn new(symbol: Option<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self { symbol, points }
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Earliest point with `timestamp >= at`.
    pub fn first_at_or_after(&self, at: NaiveDateTime) -> Option<&PricePoint> {
        let idx = self.points.partition_point(|p| p.timestamp < at);
        self.points.get(idx)
    }

    /// Latest point with `timestamp <= at`.
    pub fn last_at_or_before(&self, at: NaiveDateTime) -> Option<&PricePoint> {
        let idx = self.points.partition_point(|p| p.timestamp <= at);
        idx.checked_sub(1).and_then(|i| self.points.get(i))
    }
}
