//! Periodic contribution simulation.
//!
//! Walks a calendar schedule from `start` to `end`, buying a fixed amount at
//! the first available close on or after each scheduled time, then values the
//! accumulated shares at the last close on or before `end`.

use crate::domain::error::SimulationError;
use crate::domain::frequency::Frequency;
use crate::domain::price::PriceSeries;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub strategy_label: String,
    pub contribution_count: usize,
    pub total_invested: f64,
    pub total_commission: f64,
    pub total_shares: f64,
    pub final_value: f64,
    /// `None` when no contribution was made; the return is undefined then.
    pub return_pct: Option<f64>,
    pub final_price: f64,
}

impl SimulationResult {
    pub fn has_contributions(&self) -> bool {
        self.contribution_count > 0
    }

    pub fn profit(&self) -> f64 {
        self.final_value - self.total_invested
    }

    /// Invested amount per share held, commission included.
    pub fn average_cost(&self) -> Option<f64> {
        (self.total_shares > 0.0).then(|| self.total_invested / self.total_shares)
    }
}

/// Simulate contributing `amount` every `frequency` period between `start`
/// and `end` inclusive, paying `commission_rate` of each contribution.
///
/// The schedule stops at the first period with no price point before `end`,
/// or when the next period falls outside the calendar.
pub fn simulate(
    series: &PriceSeries,
    start: NaiveDateTime,
    end: NaiveDateTime,
    amount: f64,
    frequency: Frequency,
    commission_rate: f64,
) -> Result<SimulationResult, SimulationError> {
    let net = amount * (1.0 - commission_rate);
    let commission = amount * commission_rate;

    let mut contribution_count = 0usize;
    let mut total_shares = 0.0_f64;
    let mut total_commission = 0.0_f64;

    let mut cursor = start;
    while cursor <= end {
        let point = match series.first_at_or_after(cursor) {
            Some(p) if p.timestamp <= end => p,
            _ => break,
        };

        let shares = net / point.close;
        total_shares += shares;
        total_commission += commission;
        contribution_count += 1;
        tracing::trace!(
            %frequency,
            scheduled = %cursor,
            filled = %point.timestamp,
            price = point.close,
            shares,
            "contribution"
        );

        cursor = match frequency.advance(cursor) {
            Some(next) => next,
            None => break,
        };
    }

    let final_price = series
        .last_at_or_before(end)
        .map(|p| p.close)
        .ok_or(SimulationError::NoFinalPrice { end })?;

    let total_invested = contribution_count as f64 * amount;
    let final_value = total_shares * final_price;
    let return_pct =
        (total_invested > 0.0).then(|| (final_value - total_invested) / total_invested * 100.0);

    tracing::debug!(
        %frequency,
        contributions = contribution_count,
        total_invested,
        final_value,
        "simulation complete"
    );

    Ok(SimulationResult {
        strategy_label: frequency.label().to_string(),
        contribution_count,
        total_invested,
        total_commission,
        total_shares,
        final_value,
        return_pct,
        final_price,
    })
}
