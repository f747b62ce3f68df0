//! Backtest runner and output record.
//!
//! A run feeds every bar of the series, in order, to one strategy. Intents are
//! executed at the bar's close and each fill is recorded as a signal. Once the
//! strategy is warm the marked portfolio value is appended to the value
//! history. After the last bar the analytics and benchmark curve are computed
//! and assembled into a [`BacktestResult`].
//!
//! Configuration and data-integrity failures abort the run. Too little data and
//! a missing benchmark are reported as [`RunWarning`]s, except that a strict run
//! treats too little data as an error.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, info_span, warn, Dispatch};

use super::benchmark::{benchmark_symbol_for, normalize_benchmark};
use super::error::BacktestError;
use super::execution::execute;
use super::metrics::{buy_hold_return, AnalyticsConfig, Metrics};
use super::ohlcv::DataSeries;
use super::portfolio::Portfolio;
use super::signal::{Signal, SignalRecorder};
use super::strategy::{build_strategy, is_warm, MarketState, Strategy, StrategyParams};
use crate::ports::data_port::DataPort;

const NOT_AVAILABLE: &str = "N/A";

/// Everything needed to run one backtest apart from the price data.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRequest {
    pub symbol: String,
    pub strategy: String,
    pub params: StrategyParams,
    pub initial_cash: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Benchmark symbol; chosen from the symbol's exchange suffix when unset.
    pub benchmark: Option<String>,
    pub analytics: AnalyticsConfig,
    /// Fail instead of warn when the series is shorter than the warm-up.
    pub strict: bool,
}

impl BacktestRequest {
    pub fn new(symbol: impl Into<String>, strategy: impl Into<String>, initial_cash: f64) -> Self {
        BacktestRequest {
            symbol: symbol.into(),
            strategy: strategy.into(),
            params: StrategyParams::new(),
            initial_cash,
            start_date: None,
            end_date: None,
            benchmark: None,
            analytics: AnalyticsConfig::default(),
            strict: false,
        }
    }

    pub fn benchmark_symbol(&self) -> String {
        self.benchmark
            .clone()
            .unwrap_or_else(|| benchmark_symbol_for(&self.symbol).to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub symbol: String,
    pub total_return: f64,
    pub annual_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_length: usize,
    pub max_drawdown_start: String,
    pub max_drawdown_end: String,
    pub sharpe: f64,
    pub win_rate: f64,
    pub buy_hold_return: f64,
    pub total_trades: usize,
    pub final_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Chart {
    pub dates: Vec<NaiveDate>,
    pub strategy_values: Vec<f64>,
    pub benchmark_dates: Vec<NaiveDate>,
    pub benchmark_values: Vec<f64>,
    pub buy_points: Vec<Signal>,
    pub sell_points: Vec<Signal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    InsufficientData { bars: usize, minimum: usize },
    BenchmarkUnavailable { symbol: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub summary: Summary,
    pub chart: Chart,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RunWarning>,
}

/// Runs backtests, emitting log events to the injected dispatch.
#[derive(Debug, Clone)]
pub struct Backtest {
    dispatch: Dispatch,
}

impl Default for Backtest {
    fn default() -> Self {
        Backtest {
            dispatch: Dispatch::none(),
        }
    }
}

impl Backtest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dispatch(dispatch: Dispatch) -> Self {
        Backtest { dispatch }
    }

    /// Run over `data`, comparing against `benchmark` when one is supplied.
    pub fn run(
        &self,
        request: &BacktestRequest,
        data: &DataSeries,
        benchmark: Option<&DataSeries>,
    ) -> Result<BacktestResult, BacktestError> {
        tracing::dispatcher::with_default(&self.dispatch, || {
            let span = info_span!(
                "backtest",
                symbol = %request.symbol,
                strategy = %request.strategy
            );
            let _guard = span.enter();
            simulate(request, data, benchmark)
        })
    }

    /// Fetch the symbol and its benchmark through `port`, then run. A benchmark
    /// that cannot be fetched degrades to an empty curve.
    pub fn run_with_port(
        &self,
        request: &BacktestRequest,
        port: &dyn DataPort,
    ) -> Result<BacktestResult, BacktestError> {
        let data = port.fetch_series(&request.symbol, request.start_date, request.end_date)?;

        let benchmark_symbol = request.benchmark_symbol();
        match port.fetch_series(&benchmark_symbol, request.start_date, request.end_date) {
            Ok(series) => self.run(request, &data, Some(&series)),
            Err(e) => {
                tracing::dispatcher::with_default(&self.dispatch, || {
                    warn!(benchmark = %benchmark_symbol, error = %e, "benchmark unavailable");
                });
                let mut result = self.run(request, &data, None)?;
                result.warnings.push(RunWarning::BenchmarkUnavailable {
                    symbol: benchmark_symbol,
                    reason: e.to_string(),
                });
                Ok(result)
            }
        }
    }
}

fn validate_request(request: &BacktestRequest) -> Result<(), BacktestError> {
    if !(request.initial_cash.is_finite() && request.initial_cash > 0.0) {
        return Err(BacktestError::ConfigInvalid {
            section: "backtest".into(),
            key: "initial_cash".into(),
            reason: "must be greater than 0".into(),
        });
    }
    Ok(())
}

fn simulate(
    request: &BacktestRequest,
    data: &DataSeries,
    benchmark: Option<&DataSeries>,
) -> Result<BacktestResult, BacktestError> {
    validate_request(request)?;
    let mut strategy = build_strategy(&request.strategy, &request.params)?;
    let warmup = strategy.warmup();
    let mut warnings = Vec::new();

    if data.len() < warmup {
        if request.strict {
            return Err(BacktestError::InsufficientData {
                symbol: request.symbol.clone(),
                bars: data.len(),
                minimum: warmup,
            });
        }
        warn!(bars = data.len(), minimum = warmup, "series shorter than warm-up");
        warnings.push(RunWarning::InsufficientData {
            bars: data.len(),
            minimum: warmup,
        });
    }

    info!(bars = data.len(), warmup, cash = request.initial_cash, "run started");

    let mut portfolio = Portfolio::new(request.initial_cash);
    let mut recorder = SignalRecorder::new();

    for (i, bar) in data.bars().iter().enumerate() {
        let state = portfolio.state(bar.close);
        let intents = strategy.next(i, &MarketState { bar }, &state);
        for intent in intents {
            match execute(&mut portfolio, intent, bar.date, bar.close) {
                Some(receipt) => recorder.record(&receipt),
                None => debug!(date = %bar.date, ?intent, "intent rejected"),
            }
        }
        if is_warm(i, warmup) {
            let value = portfolio.mark_value(bar.close);
            portfolio.record_value(bar.date, value);
        }
    }

    let metrics = Metrics::compute(&portfolio, &request.analytics);
    let buy_hold = buy_hold_return(&data.closes());

    let mut chart = Chart {
        dates: portfolio.value_history.iter().map(|p| p.date).collect(),
        strategy_values: portfolio.value_history.iter().map(|p| p.value).collect(),
        ..Chart::default()
    };

    if let Some(series) = benchmark {
        let window = chart_window(&chart, data);
        let curve = match window {
            Some((start, end)) => {
                normalize_benchmark(&series.between(start, end), request.initial_cash)
            }
            None => Vec::new(),
        };
        if curve.is_empty() {
            let symbol = request.benchmark_symbol();
            warn!(benchmark = %symbol, "benchmark has no bars in the chart range");
            warnings.push(RunWarning::BenchmarkUnavailable {
                symbol,
                reason: "no bars in the chart range".into(),
            });
        }
        chart.benchmark_dates = curve.iter().map(|p| p.date).collect();
        chart.benchmark_values = curve.iter().map(|p| p.value).collect();
    }

    let (buys, sells) = recorder.into_parts();
    chart.buy_points = buys;
    chart.sell_points = sells;

    let summary = summarize(&request.symbol, &metrics, buy_hold, chart.dates.len());
    info!(
        total_return = summary.total_return,
        trades = summary.total_trades,
        final_value = summary.final_value,
        "run finished"
    );

    Ok(BacktestResult {
        summary,
        chart,
        warnings,
    })
}

/// Date range the benchmark is restricted to: the chart's, or the whole
/// series when the strategy never produced a value.
fn chart_window(chart: &Chart, data: &DataSeries) -> Option<(NaiveDate, NaiveDate)> {
    match (chart.dates.first(), chart.dates.last()) {
        (Some(&start), Some(&end)) => Some((start, end)),
        _ => Some((data.first_date()?, data.last_date()?)),
    }
}

fn finite(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn summarize(symbol: &str, metrics: &Metrics, buy_hold: f64, history_len: usize) -> Summary {
    let dd = &metrics.drawdown;
    let dd_date = |date: Option<NaiveDate>| match date {
        Some(d) if dd.length > 0 && dd.length < history_len => d.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    };

    Summary {
        symbol: symbol.to_string(),
        total_return: finite(metrics.total_return),
        annual_return: finite(metrics.annual_return),
        max_drawdown: finite(metrics.drawdown.max),
        max_drawdown_length: dd.length,
        max_drawdown_start: dd_date(dd.start),
        max_drawdown_end: dd_date(dd.end),
        sharpe: finite(metrics.sharpe),
        win_rate: finite(metrics.win_rate),
        buy_hold_return: finite(buy_hold),
        total_trades: metrics.total_trades,
        final_value: finite(metrics.final_value),
    }
}
