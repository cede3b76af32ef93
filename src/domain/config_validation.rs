//! Analysis configuration validation.
//!
//! Checks the `[analysis]` section before any data is loaded.

use crate::domain::error::DcaError;
use crate::ports::config_port::ConfigPort;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const SECTION: &str = "analysis";

/// Which end of a date range a bare `YYYY-MM-DD` value stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    /// Midnight at the start of the day.
    Start,
    /// The end day is inclusive: a bare date means 23:59:59 on that day.
    End,
}

/// Parse a user-supplied range bound: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` or
/// `YYYY-MM-DD HH:MM:SS`.
pub fn parse_range_bound(value: &str, bound: RangeBound) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M") {
        return Some(dt);
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let time = match bound {
        RangeBound::Start => NaiveTime::MIN,
        RangeBound::End => NaiveTime::from_hms_opt(23, 59, 59)?,
    };
    Some(date.and_time(time))
}

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), DcaError> {
    validate_contribution_amount(config)?;
    validate_commission_rate(config)?;
    validate_max_strategies(config)?;
    validate_dates(config)?;
    Ok(())
}

fn invalid(key: &str, reason: &str) -> DcaError {
    DcaError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_contribution_amount(config: &dyn ConfigPort) -> Result<(), DcaError> {
    if config.get_string(SECTION, "contribution_amount").is_none() {
        return Ok(());
    }
    let value = config.get_double(SECTION, "contribution_amount", f64::NAN);
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(
            "contribution_amount",
            "contribution_amount must be a positive number",
        ));
    }
    Ok(())
}

fn validate_commission_rate(config: &dyn ConfigPort) -> Result<(), DcaError> {
    if config.get_string(SECTION, "commission_rate").is_none() {
        return Ok(());
    }
    let value = config.get_double(SECTION, "commission_rate", f64::NAN);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "commission_rate",
            "commission_rate must be at least 0 and below 1",
        ));
    }
    Ok(())
}

fn validate_max_strategies(config: &dyn ConfigPort) -> Result<(), DcaError> {
    if config.get_string(SECTION, "max_strategies").is_none() {
        return Ok(());
    }
    if config.get_int(SECTION, "max_strategies", 0) < 1 {
        return Err(invalid(
            "max_strategies",
            "max_strategies must be at least 1",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), DcaError> {
    let start = parse_optional(config, "start_date", RangeBound::Start)?;
    let end = parse_optional(config, "end_date", RangeBound::End)?;

    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(invalid(
            "start_date",
            "start_date must not be after end_date",
        )),
        _ => Ok(()),
    }
}

fn parse_optional(
    config: &dyn ConfigPort,
    key: &str,
    bound: RangeBound,
) -> Result<Option<NaiveDateTime>, DcaError> {
    match config.get_string(SECTION, key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_range_bound(&s, bound).map(Some).ok_or_else(|| {
            invalid(key, &format!("invalid {key} format, expected YYYY-MM-DD"))
        }),
    }
}
