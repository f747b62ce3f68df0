//! "Smile curve" periodic investing: invest more when the price sits low in
//! its trailing range, less when it sits high, and trim the position near the
//! top of the range.

use super::params::StrategyParams;
use super::{is_warm, MarketState, Strategy};
use crate::domain::error::BacktestError;
use crate::domain::execution::OrderIntent;
use crate::domain::indicator::{Highest, IndicatorType, Lowest};
use crate::domain::portfolio::PortfolioState;

/// Share of the position sold when the price is in the top band.
const TRIM_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct SmileCurveParams {
    pub lookback_period: usize,
    pub invest_period: usize,
    pub base_amount: f64,
    pub max_multiplier: f64,
}

impl Default for SmileCurveParams {
    fn default() -> Self {
        SmileCurveParams {
            lookback_period: 60,
            invest_period: 10,
            base_amount: 1500.0,
            max_multiplier: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Invest(f64),
    Trim,
}

#[derive(Debug, Clone)]
pub struct SmileCurve {
    params: SmileCurveParams,
    highest: Highest,
    lowest: Lowest,
}

impl SmileCurve {
    pub const NAME: &'static str = "SmileCurve";

    pub fn new(params: SmileCurveParams) -> Self {
        SmileCurve {
            highest: Highest::new(params.lookback_period),
            lowest: Lowest::new(params.lookback_period),
            params,
        }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, BacktestError> {
        let d = SmileCurveParams::default();
        let mut r = params.reader(Self::NAME);
        let lookback_period = r.period("lookback_period", d.lookback_period)?;
        let invest_period = r.period("invest_period", d.invest_period)?;
        let base_amount = r.positive("base_amount", d.base_amount)?;
        let max_multiplier = r.positive("max_multiplier", d.max_multiplier)?;
        r.finish()?;
        Ok(SmileCurve::new(SmileCurveParams {
            lookback_period,
            invest_period,
            base_amount,
            max_multiplier,
        }))
    }

    /// Where `close` sits in `[low, high]`, from 0 (bottom) to 1 (top). A
    /// range of zero width counts as the middle.
    fn relative_position(close: f64, high: f64, low: f64) -> f64 {
        let range = high - low;
        if range <= 0.0 {
            return 0.5;
        }
        ((close - low) / range).clamp(0.0, 1.0)
    }

    fn action(&self, position: f64) -> Action {
        let max = self.params.max_multiplier;
        match position {
            p if p <= 0.2 => Action::Invest(max),
            p if p <= 0.4 => Action::Invest(0.8 * max),
            p if p <= 0.6 => Action::Invest(1.0),
            p if p <= 0.8 => Action::Invest(0.5),
            _ => Action::Trim,
        }
    }
}

impl Strategy for SmileCurve {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Highest(self.params.lookback_period),
            IndicatorType::Lowest(self.params.lookback_period),
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
        if !is_warm(bar_index, self.warmup())
            || (bar_index + 1) % self.params.invest_period != 0
            || bar.close <= 0.0
        {
            return Vec::new();
        }

        match self.action(Self::relative_position(bar.close, high, low)) {
            Action::Invest(multiplier) => {
                let amount = self.params.base_amount * multiplier;
                vec![OrderIntent::buy(amount / bar.close)]
            }
            Action::Trim if !portfolio.is_flat() => {
                vec![OrderIntent::sell(portfolio.position_size * TRIM_FRACTION)]
            }
            Action::Trim => Vec::new(),
        }
    }
}
