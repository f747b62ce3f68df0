//! Trading strategies.
//!
//! A strategy sees one bar per step, in date order, and answers with zero or
//! more [`OrderIntent`]s. It owns its indicator state and parameters and never
//! touches the portfolio directly: the runner executes the intents and records
//! the receipts.
//!
//! The set of strategies is closed. [`AnyStrategy`] tags every variant and
//! [`registry`] maps the public strategy names to constructors.

pub mod bollinger;
pub mod buy_hold;
pub mod dca;
pub mod dual_thrust;
pub mod grid;
pub mod macd;
pub mod params;
pub mod registry;
pub mod rsi;
pub mod sma_cross;
pub mod smile_curve;
pub mod turtle;
pub mod value_averaging;

pub use bollinger::{BollParams, BollStrategy};
pub use buy_hold::{BuyHold, BuyHoldParams};
pub use dca::{Dca, DcaParams};
pub use dual_thrust::{DualThrust, DualThrustParams};
pub use grid::{Grid, GridParams};
pub use macd::{MacdParams, MacdStrategy};
pub use params::StrategyParams;
pub use registry::{build_strategy, lookup, StrategyEntry, REGISTRY};
pub use rsi::{RsiParams, RsiStrategy};
pub use sma_cross::{SmaCross, SmaCrossParams};
pub use smile_curve::{SmileCurve, SmileCurveParams};
pub use turtle::{Turtle, TurtleParams};
pub use value_averaging::{ValueAveraging, ValueAveragingParams};

use crate::domain::execution::OrderIntent;
use crate::domain::indicator::IndicatorType;
use crate::domain::ohlcv::Bar;
use crate::domain::portfolio::PortfolioState;

/// Market data visible to a strategy on the current step.
#[derive(Debug, Clone, Copy)]
pub struct MarketState<'a> {
    pub bar: &'a Bar,
}

pub trait Strategy {
    fn name(&self) -> &'static str;

    /// Indicators the strategy maintains, for display and warm-up.
    fn indicators(&self) -> Vec<IndicatorType> {
        Vec::new()
    }

    /// Bars (including the current one) that must be seen before the strategy
    /// may trade. Always at least 1.
    fn warmup(&self) -> usize {
        self.indicators()
            .iter()
            .map(IndicatorType::warmup_bars)
            .max()
            .unwrap_or(1)
            .max(1)
    }

    fn next(
        &mut self,
        bar_index: usize,
        market: &MarketState<'_>,
        portfolio: &PortfolioState,
    ) -> Vec<OrderIntent>;
}

/// `(available_cash × position_pct) / close`; zero when the close is unusable.
pub fn calculate_position_size(available_cash: f64, position_pct: f64, close: f64) -> f64 {
    if close <= 0.0 || available_cash <= 0.0 {
        return 0.0;
    }
    available_cash * position_pct / close
}

/// True once `bar_index` is at or past the last warm-up bar.
pub fn is_warm(bar_index: usize, warmup: usize) -> bool {
    bar_index + 1 >= warmup
}

#[derive(Debug, Clone)]
pub enum AnyStrategy {
    SmaCross(SmaCross),
    BuyHold(BuyHold),
    Rsi(RsiStrategy),
    Macd(MacdStrategy),
    Boll(BollStrategy),
    Turtle(Turtle),
    Grid(Grid),
    DualThrust(DualThrust),
    Dca(Dca),
    ValueAveraging(ValueAveraging),
    SmileCurve(SmileCurve),
}

impl AnyStrategy {
    fn inner(&self) -> &dyn Strategy {
        match self {
            AnyStrategy::SmaCross(s) => s,
            AnyStrategy::BuyHold(s) => s,
            AnyStrategy::Rsi(s) => s,
            AnyStrategy::Macd(s) => s,
            AnyStrategy::Boll(s) => s,
            AnyStrategy::Turtle(s) => s,
            AnyStrategy::Grid(s) => s,
            AnyStrategy::DualThrust(s) => s,
            AnyStrategy::Dca(s) => s,
            AnyStrategy::ValueAveraging(s) => s,
            AnyStrategy::SmileCurve(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Strategy {
        match self {
            AnyStrategy::SmaCross(s) => s,
            AnyStrategy::BuyHold(s) => s,
            AnyStrategy::Rsi(s) => s,
            AnyStrategy::Macd(s) => s,
            AnyStrategy::Boll(s) => s,
            AnyStrategy::Turtle(s) => s,
            AnyStrategy::Grid(s) => s,
            AnyStrategy::DualThrust(s) => s,
            AnyStrategy::Dca(s) => s,
            AnyStrategy::ValueAveraging(s) => s,
            AnyStrategy::SmileCurve(s) => s,
        }
    }
}

impl Strategy for AnyStrategy {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn indicators(&self) -> Vec<IndicatorType> {
        self.inner().indicators()
    }

    fn warmup(&self) -> usize {
        self.inner().warmup()
    }

    fn next(
        &mut self,
        bar_index: usize,
        market: &MarketState<'_>,
        portfolio: &PortfolioState,
    ) -> Vec<OrderIntent> {
        self.inner_mut().next(bar_index, market, portfolio)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::execution::{execute, OrderKind};
    use crate::domain::portfolio::Portfolio;

    pub fn bar(day: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    pub fn flat_bar(day: usize, close: f64) -> Bar {
        bar(day, close, close, close, close)
    }

    /// Drive `strategy` over `bars` with a real portfolio; returns the kinds of
    /// filled orders with their bar index.
    pub fn drive(
        strategy: &mut dyn Strategy,
        bars: &[Bar],
        cash: f64,
    ) -> (Vec<(usize, OrderKind)>, Portfolio) {
        let mut portfolio = Portfolio::new(cash);
        let mut fills = Vec::new();
        for (i, b) in bars.iter().enumerate() {
            let state = portfolio.state(b.close);
            let intents = strategy.next(i, &MarketState { bar: b }, &state);
            for intent in intents {
                if let Some(receipt) = execute(&mut portfolio, intent, b.date, b.close) {
                    fills.push((i, receipt.kind));
                }
            }
        }
        (fills, portfolio)
    }
}
