//! Performance statistics over a run's value history and trade log.

use chrono::NaiveDate;

use super::benchmark::adjusted_returns;
use super::portfolio::{Portfolio, ValuePoint};
use super::position::TradeRecord;

pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Annualisation settings for the risk-adjusted ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticsConfig {
    pub periods_per_year: f64,
    /// Annual rate, spread evenly over `periods_per_year`.
    pub risk_free_rate: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            risk_free_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Drawdown {
    /// Largest peak-to-trough decline as a fraction of the peak.
    pub max: f64,
    /// Bars from the peak to the trough.
    pub length: usize,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annual_return: f64,
    pub drawdown: Drawdown,
    pub sharpe: f64,
    pub win_rate: f64,
    pub total_trades: usize,
    pub final_value: f64,
}

impl Metrics {
    pub fn compute(portfolio: &Portfolio, config: &AnalyticsConfig) -> Self {
        let history = &portfolio.value_history;
        let initial = portfolio.initial_cash;
        let final_value = history.last().map(|p| p.value).unwrap_or(initial);
        let total_return = total_return(initial, final_value);

        let annual_return = match (history.first(), history.last()) {
            (Some(first), Some(last)) => annual_return(total_return, first.date, last.date),
            _ => 0.0,
        };

        Metrics {
            total_return,
            annual_return,
            drawdown: max_drawdown(history),
            sharpe: sharpe_ratio(history, config),
            win_rate: win_rate(&portfolio.trades),
            total_trades: portfolio.trades.len(),
            final_value,
        }
    }
}

pub fn total_return(initial: f64, final_value: f64) -> f64 {
    if initial > 0.0 {
        final_value / initial - 1.0
    } else {
        0.0
    }
}

/// Compound annual rate over calendar days; 0 for zero or negative spans.
pub fn annual_return(total_return: f64, first: NaiveDate, last: NaiveDate) -> f64 {
    let elapsed_days = (last - first).num_days();
    if elapsed_days <= 0 || total_return <= -1.0 {
        return 0.0;
    }
    (1.0 + total_return).powf(DAYS_PER_YEAR / elapsed_days as f64) - 1.0
}

pub fn max_drawdown(history: &[ValuePoint]) -> Drawdown {
    let Some(first) = history.first() else {
        return Drawdown::default();
    };

    let mut peak = first.value;
    let mut peak_index = 0usize;
    let mut worst = Drawdown::default();

    for (i, point) in history.iter().enumerate() {
        if point.value > peak {
            peak = point.value;
            peak_index = i;
            continue;
        }
        if peak <= 0.0 {
            continue;
        }
        let dd = (peak - point.value) / peak;
        if dd > worst.max {
            worst = Drawdown {
                max: dd,
                length: i - peak_index,
                start: Some(history[peak_index].date),
                end: Some(point.date),
            };
        }
    }
    worst
}

/// Bar-to-bar returns of the value history.
pub fn period_returns(history: &[ValuePoint]) -> Vec<f64> {
    history
        .windows(2)
        .map(|w| {
            if w[0].value > 0.0 {
                w[1].value / w[0].value - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

pub fn sharpe_ratio(history: &[ValuePoint], config: &AnalyticsConfig) -> f64 {
    let returns = period_returns(history);
    if returns.len() < 2 || config.periods_per_year <= 0.0 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    if stddev <= f64::EPSILON {
        return 0.0;
    }

    let per_period_rf = config.risk_free_rate / config.periods_per_year;
    (mean - per_period_rf) / stddev * config.periods_per_year.sqrt()
}

pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.won).count() as f64 / trades.len() as f64
}

/// Return of simply holding the traded symbol across `closes`, with split
/// artifacts filtered out.
pub fn buy_hold_return(closes: &[f64]) -> f64 {
    adjusted_returns(closes)
        .iter()
        .fold(1.0, |acc, r| acc * (1.0 + r))
        - 1.0
}
