//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::comparison::{run_comparison, ComparisonReport, DcaConfig};
use crate::domain::config_validation::{parse_range_bound, validate_analysis_config, RangeBound};
use crate::domain::error::DcaError;
use crate::domain::granularity::Granularity;
use crate::domain::price::PriceSeries;
use crate::domain::strategy::strategies_for;
use crate::domain::summary::SeriesSummary;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(
    name = "dcacompare",
    about = "Compare periodic investment schedules against price history"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every suitable contribution schedule and rank them
    Analyze {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// First contribution date (YYYY-MM-DD or YYYY-MM-DD HH:MM[:SS])
        #[arg(long)]
        start: Option<String>,
        /// Last contribution and valuation date, inclusive
        #[arg(long)]
        end: Option<String>,
        /// Amount invested per contribution
        #[arg(long)]
        amount: Option<f64>,
        /// Commission as a fraction of each contribution, e.g. 0.001
        #[arg(long)]
        commission: Option<f64>,
        /// Simulate strategies in parallel
        #[arg(long)]
        parallel: bool,
    },
    /// Summarise a price file
    Info {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Check that a price file can be read
    Validate {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// List the strategies offered for a data granularity
    Strategies {
        #[arg(short, long)]
        granularity: Granularity,
    },
    /// List symbols available in a data directory
    ListSymbols {
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Where price data comes from: an explicit file, or a symbol looked up in a
/// data directory.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(short, long, conflicts_with = "symbol")]
    pub file: Option<PathBuf>,
    #[arg(long, requires = "symbol")]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub symbol: Option<String>,
}

/// Command line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOverrides {
    pub start: Option<String>,
    pub end: Option<String>,
    pub amount: Option<f64>,
    pub commission: Option<f64>,
    pub parallel: bool,
}

pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Analyze {
            source,
            config,
            start,
            end,
            amount,
            commission,
            parallel,
        } => {
            let overrides = AnalyzeOverrides {
                start,
                end,
                amount,
                commission,
                parallel,
            };
            run_analyze(&source, config.as_deref(), &overrides)
        }
        Command::Info { source, config } => run_info(&source, config.as_deref()),
        Command::Validate { file } => run_validate(&file),
        Command::Strategies { granularity } => {
            print!("{}", format_strategies(granularity));
            Ok(())
        }
        Command::ListSymbols { data_dir, config } => {
            run_list_symbols(data_dir.as_deref(), config.as_deref())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Option<FileConfigAdapter>, DcaError> {
    let Some(path) = path else {
        return Ok(None);
    };
    tracing::info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_analysis_config(&adapter)?;
    Ok(Some(adapter))
}

/// Read the `[analysis]` section into a [`DcaConfig`], defaulting anything
/// that is not set.
pub fn build_dca_config(adapter: &dyn ConfigPort) -> Result<DcaConfig, DcaError> {
    let defaults = DcaConfig::default();

    let start = config_bound(adapter, "start_date", RangeBound::Start)?;
    let end = config_bound(adapter, "end_date", RangeBound::End)?;
    let max_strategies = adapter.get_int("analysis", "max_strategies", defaults.max_strategies as i64);

    Ok(DcaConfig {
        start,
        end,
        contribution_amount: adapter.get_double(
            "analysis",
            "contribution_amount",
            defaults.contribution_amount,
        ),
        commission_rate: adapter.get_double("analysis", "commission_rate", defaults.commission_rate),
        max_strategies: usize::try_from(max_strategies).unwrap_or(defaults.max_strategies),
        parallel: adapter.get_bool("analysis", "parallel", defaults.parallel),
    })
}

fn config_bound(
    adapter: &dyn ConfigPort,
    key: &str,
    bound: RangeBound,
) -> Result<Option<chrono::NaiveDateTime>, DcaError> {
    match adapter.get_string("analysis", key) {
        Some(s) if !s.trim().is_empty() => {
            parse_range_bound(&s, bound)
                .map(Some)
                .ok_or_else(|| DcaError::ConfigInvalid {
                    section: "analysis".into(),
                    key: key.into(),
                    reason: "invalid date format (expected YYYY-MM-DD)".into(),
                })
        }
        _ => Ok(None),
    }
}

/// Layer command line overrides on top of `config` and re-check the result.
pub fn apply_overrides(
    mut config: DcaConfig,
    overrides: &AnalyzeOverrides,
) -> Result<DcaConfig, DcaError> {
    let invalid = |key: &str, reason: &str| DcaError::ConfigInvalid {
        section: "cli".into(),
        key: key.into(),
        reason: reason.into(),
    };

    if let Some(s) = &overrides.start {
        config.start = Some(
            parse_range_bound(s, RangeBound::Start)
                .ok_or_else(|| invalid("start", "expected YYYY-MM-DD"))?,
        );
    }
    if let Some(s) = &overrides.end {
        config.end = Some(
            parse_range_bound(s, RangeBound::End)
                .ok_or_else(|| invalid("end", "expected YYYY-MM-DD"))?,
        );
    }
    if let Some(amount) = overrides.amount {
        config.contribution_amount = amount;
    }
    if let Some(rate) = overrides.commission {
        config.commission_rate = rate;
    }
    config.parallel |= overrides.parallel;

    if !(config.contribution_amount.is_finite() && config.contribution_amount > 0.0) {
        return Err(invalid("amount", "amount must be a positive number"));
    }
    if !(0.0..1.0).contains(&config.commission_rate) {
        return Err(invalid("commission", "commission must be at least 0 and below 1"));
    }
    if let (Some(start), Some(end)) = (config.start, config.end) {
        if start > end {
            return Err(invalid("start", "start must not be after end"));
        }
    }
    Ok(config)
}

/// Resolve the price series named by `source`, using the config's
/// `[data] path` when a symbol is given without `--data-dir`.
pub fn load_series(
    source: &SourceArgs,
    config: Option<&dyn ConfigPort>,
) -> Result<PriceSeries, DcaError> {
    if let Some(file) = &source.file {
        tracing::info!(path = %file.display(), "loading price file");
        return CsvAdapter::read_file(file);
    }

    let symbol = source.symbol.as_deref().ok_or_else(|| DcaError::ConfigMissing {
        section: "cli".into(),
        key: "file or symbol".into(),
    })?;
    let adapter = CsvAdapter::new(resolve_data_dir(source.data_dir.as_deref(), config)?);
    tracing::info!(symbol, "loading price data");
    adapter.fetch_series(symbol)
}

pub fn resolve_data_dir(
    data_dir: Option<&Path>,
    config: Option<&dyn ConfigPort>,
) -> Result<PathBuf, DcaError> {
    if let Some(dir) = data_dir {
        return Ok(dir.to_path_buf());
    }
    config
        .and_then(|c| c.get_string("data", "path"))
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| DcaError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })
}

fn run_analyze(
    source: &SourceArgs,
    config_path: Option<&Path>,
    overrides: &AnalyzeOverrides,
) -> Result<(), DcaError> {
    let adapter = load_config(config_path)?;
    let base = match &adapter {
        Some(a) => build_dca_config(a)?,
        None => DcaConfig::default(),
    };
    let config = apply_overrides(base, overrides)?;

    let series = load_series(source, adapter.as_ref().map(|a| a as &dyn ConfigPort))?;
    let summary = SeriesSummary::compute(&series).ok_or_else(|| DcaError::NoData {
        symbol: series.symbol().unwrap_or("series").to_string(),
    })?;
    print!("{}", format_summary(&summary, series.symbol()));

    let report = run_comparison(&series, &config)?;
    print!("{}", format_report(&report, &config));

    // a run where nothing could be ranked is still reported above, but the
    // exit status says so
    report.ranking.map(|_| ()).map_err(DcaError::from)
}

fn run_info(source: &SourceArgs, config_path: Option<&Path>) -> Result<(), DcaError> {
    let adapter = load_config(config_path)?;
    let series = load_series(source, adapter.as_ref().map(|a| a as &dyn ConfigPort))?;
    let summary = SeriesSummary::compute(&series).ok_or_else(|| DcaError::NoData {
        symbol: series.symbol().unwrap_or("series").to_string(),
    })?;
    print!("{}", format_summary(&summary, series.symbol()));
    Ok(())
}

fn run_validate(file: &Path) -> Result<(), DcaError> {
    CsvAdapter::validate_file(file)?;
    let series = CsvAdapter::read_file(file)?;
    println!("{}: CSV format is valid ({} rows)", file.display(), series.len());
    Ok(())
}

fn run_list_symbols(data_dir: Option<&Path>, config_path: Option<&Path>) -> Result<(), DcaError> {
    let adapter = load_config(config_path)?;
    let dir = resolve_data_dir(data_dir, adapter.as_ref().map(|a| a as &dyn ConfigPort))?;
    let symbols = CsvAdapter::new(dir.clone()).list_symbols()?;

    if symbols.is_empty() {
        eprintln!("No price files found in {}", dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

pub fn format_strategies(granularity: Granularity) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Strategies for {} data:", granularity);
    for s in strategies_for(granularity) {
        let _ = writeln!(
            out,
            "  {:<18} {:<14} every {}h",
            s.label(),
            s.frequency().code(),
            s.interval_hours()
        );
    }
    out
}

pub fn format_summary(summary: &SeriesSummary, symbol: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", symbol.unwrap_or("Price series"));
    let _ = writeln!(out, "Range:        {} to {}", summary.start, summary.end);
    let _ = writeln!(out, "Points:       {}", summary.points);
    let _ = writeln!(out, "Granularity:  {}", summary.granularity);
    let _ = writeln!(
        out,
        "Price range:  {:.2} - {:.2}",
        summary.min_price, summary.max_price
    );
    let _ = writeln!(out, "Latest price: {:.2}", summary.latest_price);
    let _ = writeln!(
        out,
        "Total return: {:+.2}% (annualized {:+.2}%)",
        summary.total_return_pct, summary.annual_return_pct
    );
    out
}

pub fn format_report(report: &ComparisonReport, config: &DcaConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nPeriod: {} to {}", report.start, report.end);
    let _ = writeln!(
        out,
        "Contribution: {:.2} per period, commission {:.3}%",
        config.contribution_amount,
        config.commission_rate * 100.0
    );

    for outcome in &report.outcomes {
        let _ = writeln!(out, "\n{}:", outcome.strategy.label());
        let r = match &outcome.result {
            Ok(r) => r,
            Err(e) => {
                let _ = writeln!(out, "  failed: {e}");
                continue;
            }
        };
        let _ = writeln!(out, "  Contributions:  {}", r.contribution_count);
        let (Some(ret), Some(avg)) = (r.return_pct, r.average_cost()) else {
            let _ = writeln!(out, "  no contributions in this period");
            continue;
        };
        let _ = writeln!(out, "  Invested:       {:.2}", r.total_invested);
        let _ = writeln!(out, "  Commission:     {:.2}", r.total_commission);
        let _ = writeln!(out, "  Shares:         {:.4}", r.total_shares);
        let _ = writeln!(out, "  Average cost:   {:.2}", avg);
        let _ = writeln!(out, "  Final value:    {:.2}", r.final_value);
        let _ = writeln!(out, "  Profit:         {:.2}", r.profit());
        let _ = writeln!(out, "  Return:         {:.2}%", ret);
    }

    let _ = writeln!(out, "\nConclusion:");
    match &report.ranking {
        Ok(ranking) => {
            let _ = writeln!(
                out,
                "  Best:        {} ({:.2}%)",
                ranking.best.label, ranking.best.return_pct
            );
            let _ = writeln!(
                out,
                "  Worst:       {} ({:.2}%)",
                ranking.worst.label, ranking.worst.return_pct
            );
            let _ = writeln!(out, "  Spread:      {:.2}%", ranking.spread);
            let _ = writeln!(out, "  Final price: {:.2}", ranking.reference_final_price);
            if !ranking.excluded.is_empty() {
                let _ = writeln!(
                    out,
                    "  Not ranked (no contributions): {}",
                    ranking.excluded.join(", ")
                );
            }
        }
        Err(e) => {
            let _ = writeln!(out, "  {e}");
        }
    }
    out
}
