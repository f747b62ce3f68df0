//! Configuration validation.
//!
//! Reads and checks every setting before a bar is processed, turning the raw
//! key/value configuration into a [`RunConfig`].

use std::path::PathBuf;

use crate::domain::backtest::BacktestRequest;
use crate::domain::error::BacktestError;
use crate::domain::metrics::{AnalyticsConfig, DEFAULT_PERIODS_PER_YEAR};
use crate::domain::strategy::{build_strategy, lookup, StrategyParams};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;
pub const DEFAULT_DATA_DIR: &str = "data";

/// A validated run: the request plus where to read data and write output.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub request: BacktestRequest,
    pub data_dir: PathBuf,
    pub output: Option<String>,
    pub log_level: Option<String>,
}

/// Validate everything except the strategy selection.
pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<RunConfig, BacktestError> {
    let symbol = required(config, "backtest", "symbol")?;
    let initial_cash = validate_initial_cash(config)?;
    let (start_date, end_date) = validate_dates(config)?;
    let analytics = validate_analytics(config)?;

    let mut request = BacktestRequest::new(symbol, String::new(), initial_cash);
    request.start_date = start_date;
    request.end_date = end_date;
    request.analytics = analytics;
    request.benchmark = config.get_string("backtest", "benchmark");
    request.strict = config.get_bool("backtest", "strict", false);

    Ok(RunConfig {
        request,
        data_dir: config
            .get_string("backtest", "data_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        output: config.get_string("backtest", "output"),
        log_level: config.get_string("logging", "level"),
    })
}

/// Validate the strategy name and its `[params]`, returning both ready for a
/// request.
pub fn validate_strategy_config(
    config: &dyn ConfigPort,
) -> Result<(String, StrategyParams), BacktestError> {
    let name = required(config, "backtest", "strategy")?;
    let entry = lookup(&name).ok_or_else(|| BacktestError::UnknownStrategy {
        name: name.clone(),
    })?;
    let params: StrategyParams = config.get_section("params").into_iter().collect();
    build_strategy(entry.name, &params)?;
    Ok((entry.name.to_string(), params))
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, BacktestError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(BacktestError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

/// A numeric setting; absent gives `None`, unparsable is an error.
fn number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, BacktestError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(BacktestError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("not a number: {raw}"),
        }),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<f64, BacktestError> {
    let value = number(config, "backtest", "initial_cash")?.unwrap_or(DEFAULT_INITIAL_CASH);
    if value <= 0.0 {
        return Err(BacktestError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_cash".to_string(),
            reason: "initial_cash must be positive".to_string(),
        });
    }
    Ok(value)
}

fn validate_analytics(config: &dyn ConfigPort) -> Result<AnalyticsConfig, BacktestError> {
    let periods_per_year =
        number(config, "analytics", "periods_per_year")?.unwrap_or(DEFAULT_PERIODS_PER_YEAR);
    if periods_per_year <= 0.0 {
        return Err(BacktestError::ConfigInvalid {
            section: "analytics".to_string(),
            key: "periods_per_year".to_string(),
            reason: "periods_per_year must be positive".to_string(),
        });
    }

    let risk_free_rate = number(config, "analytics", "risk_free_rate")?.unwrap_or(0.0);
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(BacktestError::ConfigInvalid {
            section: "analytics".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }

    Ok(AnalyticsConfig {
        periods_per_year,
        risk_free_rate,
    })
}

type DateBounds = (Option<NaiveDate>, Option<NaiveDate>);

fn validate_dates(config: &dyn ConfigPort) -> Result<DateBounds, BacktestError> {
    let start_date = parse_date(config.get_string("backtest", "start_date"), "start_date")?;
    let end_date = parse_date(config.get_string("backtest", "end_date"), "end_date")?;

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start >= end {
            return Err(BacktestError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
    }
    Ok((start_date, end_date))
}

fn parse_date(value: Option<String>, field: &str) -> Result<Option<NaiveDate>, BacktestError> {
    let Some(s) = value else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|_| BacktestError::ConfigInvalid {
            section: "backtest".to_string(),
            key: field.to_string(),
            reason: format!("invalid {field} format, expected YYYY-MM-DD"),
        })
}
