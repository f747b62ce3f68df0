//! Value averaging.
//!
//! On every `check_period`-th bar the held position is steered toward a target
//! value that grows geometrically: `initial_target × (1 + target_growth)^k`
//! where `k` counts the checks already made. A shortfall is bought, a surplus
//! sold.

use super::params::StrategyParams;
use super::{MarketState, Strategy};
use crate::domain::error::BacktestError;
use crate::domain::execution::OrderIntent;
use crate::domain::portfolio::PortfolioState;

#[derive(Debug, Clone, PartialEq)]
pub struct ValueAveragingParams {
    pub check_period: usize,
    pub target_growth: f64,
    pub initial_target: f64,
}

impl Default for ValueAveragingParams {
    fn default() -> Self {
        ValueAveragingParams {
            check_period: 22,
            target_growth: 0.01,
            initial_target: 2000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValueAveraging {
    params: ValueAveragingParams,
    checks: u32,
}

impl ValueAveraging {
    pub const NAME: &'static str = "ValueAveraging";

    pub fn new(params: ValueAveragingParams) -> Self {
        ValueAveraging { params, checks: 0 }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, BacktestError> {
        let d = ValueAveragingParams::default();
        let mut r = params.reader(Self::NAME);
        let check_period = r.period("check_period", d.check_period)?;
        let target_growth = r.non_negative("target_growth", d.target_growth)?;
        let initial_target = r.positive("initial_target", d.initial_target)?;
        r.finish()?;
        Ok(ValueAveraging::new(ValueAveragingParams {
            check_period,
            target_growth,
            initial_target,
        }))
    }

    /// Target for the check about to be made.
    pub fn current_target(&self) -> f64 {
        self.params.initial_target * (1.0 + self.params.target_growth).powi(self.checks as i32)
    }
}

impl Strategy for ValueAveraging {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn next(
        &mut self,
        bar_index: usize,
        market: &MarketState<'_>,
        portfolio: &PortfolioState,
    ) -> Vec<OrderIntent> {
        let close = market.bar.close;
        if (bar_index + 1) % self.params.check_period != 0 || close <= 0.0 {
            return Vec::new();
        }
        let target = self.current_target();
        self.checks += 1;

        let delta = target - portfolio.position_value();
        if delta > 0.0 {
            vec![OrderIntent::buy(delta / close)]
        } else if delta < 0.0 {
            vec![OrderIntent::sell(-delta / close)]
        } else {
            Vec::new()
        }
    }
}
