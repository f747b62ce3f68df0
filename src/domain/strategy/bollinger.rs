//! Bollinger mean reversion: buy below the lower band, close above the upper.

use super::params::StrategyParams;
use super::{calculate_position_size, is_warm, MarketState, Strategy};
use crate::domain::error::BacktestError;
use crate::domain::execution::OrderIntent;
use crate::domain::indicator::{Bollinger, IndicatorType};
use crate::domain::portfolio::PortfolioState;

#[derive(Debug, Clone, PartialEq)]
pub struct BollParams {
    pub bb_period: usize,
    pub bb_dev: f64,
    pub position_pct: f64,
}

impl Default for BollParams {
    fn default() -> Self {
        BollParams {
            bb_period: 20,
            bb_dev: 2.0,
            position_pct: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BollStrategy {
    params: BollParams,
    bands: Bollinger,
}

impl BollStrategy {
    pub const NAME: &'static str = "Boll";

    pub fn new(params: BollParams) -> Self {
        BollStrategy {
            bands: Bollinger::new(params.bb_period, params.bb_dev),
            params,
        }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, BacktestError> {
        let d = BollParams::default();
        let mut r = params.reader(Self::NAME);
        let bb_period = r.period("bb_period", d.bb_period)?;
        let bb_dev = r.positive("bb_dev", d.bb_dev)?;
        let position_pct = r.fraction("position_pct", d.position_pct)?;
        r.finish()?;
        Ok(BollStrategy::new(BollParams {
            bb_period,
            bb_dev,
            position_pct,
        }))
    }
}

impl Strategy for BollStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::Bollinger {
            period: self.params.bb_period,
            stddev_mult_x100: (self.params.bb_dev * 100.0).round() as u32,
        }]
    }

    fn next(
        &mut self,
        bar_index: usize,
        market: &MarketState<'_>,
        portfolio: &PortfolioState,
    ) -> Vec<OrderIntent> {
        let close = market.bar.close;
        let Some(band) = self.bands.update(close) else {
            return Vec::new();
        };
        if !is_warm(bar_index, self.warmup()) {
            return Vec::new();
        }

        if portfolio.is_flat() && close < band.lower {
            let size = calculate_position_size(portfolio.cash, self.params.position_pct, close);
            vec![OrderIntent::buy(size)]
        } else if !portfolio.is_flat() && close > band.upper {
            vec![OrderIntent::close()]
        } else {
            Vec::new()
        }
    }
}
