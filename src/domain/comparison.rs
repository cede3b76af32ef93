//! Strategy comparison pipeline.
//!
//! detect granularity -> catalog -> bounded display set -> simulate each
//! strategy -> rank. A failing strategy is recorded next to its siblings and
//! never aborts the batch.

use crate::domain::error::{DcaError, RankingError, SimulationError};
use crate::domain::granularity::{detect_granularity, Granularity};
use crate::domain::price::PriceSeries;
use crate::domain::ranking::{rank, RankingSummary};
use crate::domain::simulation::{simulate, SimulationResult};
use crate::domain::strategy::{select_display_set, strategies_for, Strategy, MAX_DISPLAY_STRATEGIES};
use chrono::NaiveDateTime;
use rayon::prelude::*;

pub const DEFAULT_CONTRIBUTION_AMOUNT: f64 = 100.0;
pub const DEFAULT_COMMISSION_RATE: f64 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct DcaConfig {
    /// Defaults to the first timestamp in the series.
    pub start: Option<NaiveDateTime>,
    /// Defaults to the last timestamp in the series.
    pub end: Option<NaiveDateTime>,
    pub contribution_amount: f64,
    pub commission_rate: f64,
    pub max_strategies: usize,
    pub parallel: bool,
}

impl Default for DcaConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            contribution_amount: DEFAULT_CONTRIBUTION_AMOUNT,
            commission_rate: DEFAULT_COMMISSION_RATE,
            max_strategies: MAX_DISPLAY_STRATEGIES,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub strategy: Strategy,
    pub result: Result<SimulationResult, SimulationError>,
}

#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub granularity: Granularity,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub outcomes: Vec<StrategyOutcome>,
    pub ranking: Result<RankingSummary, RankingError>,
}

impl ComparisonReport {
    pub fn results(&self) -> impl Iterator<Item = &SimulationResult> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Strategy, &SimulationError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.strategy, e)))
    }
}

/// Run every strategy suited to `series` and rank the outcomes.
///
/// Fails only when the series is empty; per-strategy errors are kept in
/// [`ComparisonReport::outcomes`].
pub fn run_comparison(
    series: &PriceSeries,
    config: &DcaConfig,
) -> Result<ComparisonReport, DcaError> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(DcaError::NoData {
            symbol: series.symbol().unwrap_or("series").to_string(),
        });
    };
    let start = config.start.unwrap_or(first.timestamp);
    let end = config.end.unwrap_or(last.timestamp);

    let granularity = detect_granularity(series);
    let strategies = select_display_set(&strategies_for(granularity), config.max_strategies);
    tracing::info!(
        %granularity,
        strategies = strategies.len(),
        %start,
        %end,
        "running comparison"
    );

    let run_one = |strategy: &Strategy| StrategyOutcome {
        strategy: strategy.clone(),
        result: simulate(
            series,
            start,
            end,
            config.contribution_amount,
            strategy.frequency(),
            config.commission_rate,
        ),
    };

    // collect() on an indexed parallel iterator keeps input order, which the
    // tie-breaking in rank() depends on
    let outcomes: Vec<StrategyOutcome> = if config.parallel {
        strategies.par_iter().map(run_one).collect()
    } else {
        strategies.iter().map(run_one).collect()
    };

    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            tracing::warn!(strategy = outcome.strategy.label(), error = %e, "strategy failed");
        }
    }

    let successful: Vec<SimulationResult> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok().cloned())
        .collect();
    let ranking = rank(&successful);

    Ok(ComparisonReport {
        granularity,
        start,
        end,
        outcomes,
        ranking,
    })
}
