//! Grid trading around a moving reference price.
//!
//! The first bar only sets the reference. While flat the strategy buys. Once
//! holding, a rise of `step` or more above the reference sells a share of the
//! position and a fall of `step` or more buys more; each fill moves the
//! reference to the current close.

use super::params::StrategyParams;
use super::{calculate_position_size, MarketState, Strategy};
use crate::domain::error::BacktestError;
use crate::domain::execution::OrderIntent;
use crate::domain::portfolio::PortfolioState;

#[derive(Debug, Clone, PartialEq)]
pub struct GridParams {
    /// Relative move that triggers a grid order, e.g. `0.05` for 5%.
    pub step: f64,
    /// Share of cash spent per buy and share of the position sold per sell.
    pub position_size: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        GridParams {
            step: 0.05,
            position_size: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    params: GridParams,
    reference: Option<f64>,
}

impl Grid {
    pub const NAME: &'static str = "Grid";

    pub fn new(params: GridParams) -> Self {
        Grid {
            params,
            reference: None,
        }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, BacktestError> {
        let d = GridParams::default();
        let mut r = params.reader(Self::NAME);
        let step = r.positive("step", d.step)?;
        let position_size = r.fraction("position_size", d.position_size)?;
        r.ensure(step < 1.0, "step", "must be below 1")?;
        r.finish()?;
        Ok(Grid::new(GridParams {
            step,
            position_size,
        }))
    }

    fn buy(&self, portfolio: &PortfolioState, close: f64) -> OrderIntent {
        OrderIntent::buy(calculate_position_size(
            portfolio.cash,
            self.params.position_size,
            close,
        ))
    }
}

impl Strategy for Grid {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn next(
        &mut self,
        _bar_index: usize,
        market: &MarketState<'_>,
        portfolio: &PortfolioState,
    ) -> Vec<OrderIntent> {
        let close = market.bar.close;
        let Some(reference) = self.reference else {
            self.reference = Some(close);
            return Vec::new();
        };

        let intent = if portfolio.is_flat() {
            self.buy(portfolio, close)
        } else if close >= reference * (1.0 + self.params.step) {
            OrderIntent::sell(portfolio.position_size * self.params.position_size)
        } else if close <= reference * (1.0 - self.params.step) {
            self.buy(portfolio, close)
        } else {
            return Vec::new();
        };
        self.reference = Some(close);
        vec![intent]
    }
}
