//! Dual Thrust range breakout.
//!
//! `range = highest(high, period) - lowest(low, period)`, both including the
//! current bar. Enter when the close clears `open + k1 × range`; exit when it
//! drops under `open - k2 × range`.

use super::params::StrategyParams;
use super::{calculate_position_size, is_warm, MarketState, Strategy};
use crate::domain::error::BacktestError;
use crate::domain::execution::OrderIntent;
use crate::domain::indicator::{Highest, IndicatorType, Lowest};
use crate::domain::portfolio::PortfolioState;

#[derive(Debug, Clone, PartialEq)]
pub struct DualThrustParams {
    pub k1: f64,
    pub k2: f64,
    pub period: usize,
    pub position_pct: f64,
}

impl Default for DualThrustParams {
    fn default() -> Self {
        DualThrustParams {
            k1: 0.5,
            k2: 0.5,
            period: 4,
            position_pct: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DualThrust {
    params: DualThrustParams,
    highest: Highest,
    lowest: Lowest,
}

impl DualThrust {
    pub const NAME: &'static str = "DualThrust";

    pub fn new(params: DualThrustParams) -> Self {
        DualThrust {
            highest: Highest::new(params.period),
            lowest: Lowest::new(params.period),
            params,
        }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, BacktestError> {
        let d = DualThrustParams::default();
        let mut r = params.reader(Self::NAME);
        let k1 = r.non_negative("k1", d.k1)?;
        let k2 = r.non_negative("k2", d.k2)?;
        let period = r.period("period", d.period)?;
        let position_pct = r.fraction("position_pct", d.position_pct)?;
        r.finish()?;
        Ok(DualThrust::new(DualThrustParams {
            k1,
            k2,
            period,
            position_pct,
        }))
    }
}

impl Strategy for DualThrust {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Highest(self.params.period),
            IndicatorType::Lowest(self.params.period),
        ]
    }

    fn next(
        &mut self,
        bar_index: usize,
        market: &MarketState<'_>,
        portfolio: &PortfolioState,
    ) -> Vec<OrderIntent> {
        let bar = market.bar;
        let high = self.highest.update(bar.high);
        let low = self.lowest.update(bar.low);
        let (Some(high), Some(low)) = (high, low) else {
            return Vec::new();
        };
        if !is_warm(bar_index, self.warmup()) {
            return Vec::new();
        }

        let range = high - low;
        let upper = bar.open + self.params.k1 * range;
        let lower = bar.open - self.params.k2 * range;

        if portfolio.is_flat() && bar.close > upper {
            let size = calculate_position_size(portfolio.cash, self.params.position_pct, bar.close);
            vec![OrderIntent::buy(size)]
        } else if !portfolio.is_flat() && bar.close < lower {
            vec![OrderIntent::close()]
        } else {
            Vec::new()
        }
    }
}
