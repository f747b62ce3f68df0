//! MACD trend following: hold while the MACD line sits above its signal line.

use super::params::StrategyParams;
use super::{calculate_position_size, is_warm, MarketState, Strategy};
use crate::domain::error::BacktestError;
use crate::domain::execution::OrderIntent;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::{IndicatorType, Macd};
use crate::domain::portfolio::PortfolioState;

/// The EMA lengths are fixed at 12/26/9; only the allocation is tunable.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdParams {
    pub position_pct: f64,
}

impl Default for MacdParams {
    fn default() -> Self {
        MacdParams { position_pct: 1.0 }
    }
}

#[derive(Debug, Clone)]
pub struct MacdStrategy {
    params: MacdParams,
    macd: Macd,
}

impl MacdStrategy {
    pub const NAME: &'static str = "MACD";

    pub fn new(params: MacdParams) -> Self {
        MacdStrategy {
            params,
            macd: Macd::default(),
        }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, BacktestError> {
        let mut r = params.reader(Self::NAME);
        let position_pct = r.fraction("position_pct", MacdParams::default().position_pct)?;
        r.finish()?;
        Ok(MacdStrategy::new(MacdParams { position_pct }))
    }
}

impl Strategy for MacdStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::Macd {
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
            signal: DEFAULT_SIGNAL,
        }]
    }

    fn next(
        &mut self,
        bar_index: usize,
        market: &MarketState<'_>,
        portfolio: &PortfolioState,
    ) -> Vec<OrderIntent> {
        let close = market.bar.close;
        let Some(macd) = self.macd.update(close) else {
            return Vec::new();
        };
        if !is_warm(bar_index, self.warmup()) {
            return Vec::new();
        }

        if portfolio.is_flat() && macd.line > macd.signal {
            let size = calculate_position_size(portfolio.cash, self.params.position_pct, close);
            vec![OrderIntent::buy(size)]
        } else if !portfolio.is_flat() && macd.line < macd.signal {
            vec![OrderIntent::close()]
        } else {
            Vec::new()
        }
    }
}
