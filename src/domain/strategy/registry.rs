//! Name → constructor table for the closed set of strategies.
//!
//! Lookup is case-insensitive. Construction validates the parameters before
//! any bar is processed.

use super::params::StrategyParams;
use super::{
    AnyStrategy, BollStrategy, BuyHold, Dca, DualThrust, Grid, MacdStrategy, RsiStrategy,
    SmaCross, SmileCurve, Turtle, ValueAveraging,
};
use crate::domain::error::BacktestError;

pub struct StrategyEntry {
    pub name: &'static str,
    pub summary: &'static str,
    /// Recognised parameter keys.
    pub keys: &'static [&'static str],
    pub build: fn(&StrategyParams) -> Result<AnyStrategy, BacktestError>,
}

pub static REGISTRY: &[StrategyEntry] = &[
    StrategyEntry {
        name: SmaCross::NAME,
        summary: "fast SMA crosses above slow SMA to enter, below to exit",
        keys: &["fast", "slow", "position_pct"],
        build: |p| SmaCross::from_params(p).map(AnyStrategy::SmaCross),
    },
    StrategyEntry {
        name: BuyHold::NAME,
        summary: "buy on the first bar and hold",
        keys: &["position_pct"],
        build: |p| BuyHold::from_params(p).map(AnyStrategy::BuyHold),
    },
    StrategyEntry {
        name: RsiStrategy::NAME,
        summary: "buy when RSI is below buy_level, exit above sell_level",
        keys: &["rsi_period", "buy_level", "sell_level", "position_pct"],
        build: |p| RsiStrategy::from_params(p).map(AnyStrategy::Rsi),
    },
    StrategyEntry {
        name: MacdStrategy::NAME,
        summary: "hold while the MACD(12,26,9) line is above its signal",
        keys: &["position_pct"],
        build: |p| MacdStrategy::from_params(p).map(AnyStrategy::Macd),
    },
    StrategyEntry {
        name: BollStrategy::NAME,
        summary: "buy below the lower Bollinger band, exit above the upper",
        keys: &["bb_period", "bb_dev", "position_pct"],
        build: |p| BollStrategy::from_params(p).map(AnyStrategy::Boll),
    },
    StrategyEntry {
        name: Turtle::NAME,
        summary: "enter on a new entry-bar high, exit on a new exit-bar low",
        keys: &["entry", "exit", "position_pct"],
        build: |p| Turtle::from_params(p).map(AnyStrategy::Turtle),
    },
    StrategyEntry {
        name: Grid::NAME,
        summary: "sell into each step% rise, buy into each step% fall",
        keys: &["step", "position_size"],
        build: |p| Grid::from_params(p).map(AnyStrategy::Grid),
    },
    StrategyEntry {
        name: DualThrust::NAME,
        summary: "range breakout from the open scaled by k1/k2",
        keys: &["k1", "k2", "period", "position_pct"],
        build: |p| DualThrust::from_params(p).map(AnyStrategy::DualThrust),
    },
    StrategyEntry {
        name: Dca::NAME,
        summary: "buy a fixed amount every invest_period bars",
        keys: &["invest_period", "invest_amount"],
        build: |p| Dca::from_params(p).map(AnyStrategy::Dca),
    },
    StrategyEntry {
        name: ValueAveraging::NAME,
        summary: "steer position value toward a geometrically growing target",
        keys: &["check_period", "target_growth", "initial_target"],
        build: |p| ValueAveraging::from_params(p).map(AnyStrategy::ValueAveraging),
    },
    StrategyEntry {
        name: SmileCurve::NAME,
        summary: "periodic buys sized by where price sits in its trailing range",
        keys: &["lookback_period", "invest_period", "base_amount", "max_multiplier"],
        build: |p| SmileCurve::from_params(p).map(AnyStrategy::SmileCurve),
    },
];

pub fn lookup(name: &str) -> Option<&'static StrategyEntry> {
    let name = name.trim();
    REGISTRY.iter().find(|e| e.name.eq_ignore_ascii_case(name))
}

/// Build the strategy registered under `name` from raw parameters.
pub fn build_strategy(name: &str, params: &StrategyParams) -> Result<AnyStrategy, BacktestError> {
    let entry = lookup(name).ok_or_else(|| BacktestError::UnknownStrategy {
        name: name.to_string(),
    })?;
    (entry.build)(params)
}
