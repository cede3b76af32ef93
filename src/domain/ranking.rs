//! Best/worst ranking over a batch of simulation results.

use crate::domain::error::RankingError;
use crate::domain::simulation::SimulationResult;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub label: String,
    pub return_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingSummary {
    pub best: RankedEntry,
    pub worst: RankedEntry,
    /// Percentage points between best and worst return.
    pub spread: f64,
    pub reference_final_price: f64,
    pub ranked: usize,
    /// Labels left out because they made no contributions.
    pub excluded: Vec<String>,
}

/// Rank `results` by return percentage.
///
/// Ties go to the earliest entry in input order. Results without
/// contributions carry no return and are listed in `excluded` instead.
/// Every result must report the same final price as the first one.
pub fn rank(results: &[SimulationResult]) -> Result<RankingSummary, RankingError> {
    let reference_final_price = results
        .first()
        .map(|r| r.final_price)
        .ok_or(RankingError::NoRankableResults)?;

    if let Some(r) = results
        .iter()
        .find(|r| r.final_price != reference_final_price)
    {
        return Err(RankingError::FinalPriceMismatch {
            label: r.strategy_label.clone(),
            expected: reference_final_price,
            found: r.final_price,
        });
    }

    let mut best: Option<(&SimulationResult, f64)> = None;
    let mut worst: Option<(&SimulationResult, f64)> = None;
    let mut ranked = 0usize;
    let mut excluded = Vec::new();

    for r in results {
        let Some(ret) = r.return_pct else {
            excluded.push(r.strategy_label.clone());
            continue;
        };
        ranked += 1;
        if best.is_none_or(|(_, b)| ret > b) {
            best = Some((r, ret));
        }
        if worst.is_none_or(|(_, w)| ret < w) {
            worst = Some((r, ret));
        }
    }

    let (Some((best, best_ret)), Some((worst, worst_ret))) = (best, worst) else {
        return Err(RankingError::NoRankableResults);
    };

    Ok(RankingSummary {
        best: RankedEntry {
            label: best.strategy_label.clone(),
            return_pct: best_ret,
        },
        worst: RankedEntry {
            label: worst.strategy_label.clone(),
            return_pct: worst_ret,
        },
        spread: best_ret - worst_ret,
        reference_final_price,
        ranked,
        excluded,
    })
}
