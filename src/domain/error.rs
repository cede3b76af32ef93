//! Domain error types.

use chrono::NaiveDateTime;

/// Failure of a single strategy simulation.
///
/// Only a missing final valuation price is fatal; running out of price
/// coverage mid-schedule just ends the contribution loop.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("no price at or before {end} to value the position")]
    NoFinalPrice { end: NaiveDateTime },
}

/// Failure to rank a batch of simulation results.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankingError {
    #[error("no results with contributions to rank")]
    NoRankableResults,

    #[error("final price mismatch for {label}: expected {expected}, found {found}")]
    FinalPriceMismatch {
        label: String,
        expected: f64,
        found: f64,
    },
}

/// Top-level error type for dcacompare.
#[derive(Debug, thiserror::Error)]
pub enum DcaError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to read {path}: {reason}")]
    DataRead { path: String, reason: String },

    #[error("{path} line {line}: {reason}")]
    DataFormat {
        path: String,
        line: u64,
        reason: String,
    },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Ranking(#[from] RankingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DcaError {
    /// Process exit status for this error kind.
    pub fn exit_status(&self) -> u8 {
        match self {
            DcaError::Io(_) => 1,
            DcaError::ConfigParse { .. }
            | DcaError::ConfigMissing { .. }
            | DcaError::ConfigInvalid { .. } => 2,
            DcaError::DataRead { .. } | DcaError::DataFormat { .. } | DcaError::NoData { .. } => 3,
            DcaError::Simulation(_) | DcaError::Ranking(_) => 4,
        }
    }
}

impl From<&DcaError> for std::process::ExitCode {
    fn from(err: &DcaError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
