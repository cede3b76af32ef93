//! Price data access port trait.

use crate::domain::error::DcaError;
use crate::domain::price::PriceSeries;

pub trait DataPort {
    /// Load the full price history for `symbol`, sorted ascending by time.
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, DcaError>;

    fn list_symbols(&self) -> Result<Vec<String>, DcaError>;
}
