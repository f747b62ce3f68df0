//! Moving-average crossover: enter when the fast SMA crosses above the slow
//! SMA, exit when it crosses back below.

use super::params::StrategyParams;
use super::{calculate_position_size, is_warm, MarketState, Strategy};
use crate::domain::error::BacktestError;
use crate::domain::execution::OrderIntent;
use crate::domain::indicator::{IndicatorType, Sma};
use crate::domain::portfolio::PortfolioState;

#[derive(Debug, Clone, PartialEq)]
pub struct SmaCrossParams {
    pub fast: usize,
    pub slow: usize,
    pub position_pct: f64,
}

impl Default for SmaCrossParams {
    fn default() -> Self {
        SmaCrossParams {
            fast: 10,
            slow: 30,
            position_pct: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmaCross {
    params: SmaCrossParams,
    fast: Sma,
    slow: Sma,
    prev: Option<(f64, f64)>,
}

impl SmaCross {
    pub const NAME: &'static str = "SmaCross";

    pub fn new(params: SmaCrossParams) -> Self {
        SmaCross {
            fast: Sma::new(params.fast),
            slow: Sma::new(params.slow),
            prev: None,
            params,
        }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, BacktestError> {
        let defaults = SmaCrossParams::default();
        let mut r = params.reader(Self::NAME);
        let fast = r.period("fast", defaults.fast)?;
        let slow = r.period("slow", defaults.slow)?;
        let position_pct = r.fraction("position_pct", defaults.position_pct)?;
        r.ensure(fast < slow, "fast", "must be shorter than slow")?;
        r.finish()?;
        Ok(SmaCross::new(SmaCrossParams {
            fast,
            slow,
            position_pct,
        }))
    }
}

impl Strategy for SmaCross {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Sma(self.params.fast),
            IndicatorType::Sma(self.params.slow),
        ]
    }

    // one extra bar so the previous pair of averages exists
    fn warmup(&self) -> usize {
        self.params.fast.max(self.params.slow).saturating_add(1)
    }

    fn next(
        &mut self,
        bar_index: usize,
        market: &MarketState<'_>,
        portfolio: &PortfolioState,
    ) -> Vec<OrderIntent> {
        let close = market.bar.close;
        let fast = self.fast.update(close);
        let slow = self.slow.update(close);
        let (Some(fast), Some(slow)) = (fast, slow) else {
            return Vec::new();
        };
        let prev = self.prev.replace((fast, slow));
        if !is_warm(bar_index, self.warmup()) {
            return Vec::new();
        }
        let Some((prev_fast, prev_slow)) = prev else {
            return Vec::new();
        };

        let crossed_up = prev_fast <= prev_slow && fast > slow;
        let crossed_down = prev_fast >= prev_slow && fast < slow;

        if portfolio.is_flat() && crossed_up {
            let size = calculate_position_size(portfolio.cash, self.params.position_pct, close);
            vec![OrderIntent::buy(size)]
        } else if !portfolio.is_flat() && crossed_down {
            vec![OrderIntent::close()]
        } else {
            Vec::new()
        }
    }
}
