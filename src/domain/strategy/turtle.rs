//! Channel breakout. Entry compares the close against the highest high of the
//! `entry` bars before today; exit against the lowest low of the `exit` bars
//! before today.

use super::params::StrategyParams;
use super::{calculate_position_size, is_warm, MarketState, Strategy};
use crate::domain::error::BacktestError;
use crate::domain::execution::OrderIntent;
use crate::domain::indicator::{Highest, IndicatorType, Lowest};
use crate::domain::portfolio::PortfolioState;

#[derive(Debug, Clone, PartialEq)]
pub struct TurtleParams {
    pub entry: usize,
    pub exit: usize,
    pub position_pct: f64,
}

impl Default for TurtleParams {
    fn default() -> Self {
        TurtleParams {
            entry: 20,
            exit: 10,
            position_pct: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Turtle {
    params: TurtleParams,
    highest: Highest,
    lowest: Lowest,
    // channel values as of the previous bar
    prior_high: Option<f64>,
    prior_low: Option<f64>,
}

impl Turtle {
    pub const NAME: &'static str = "Turtle";

    pub fn new(params: TurtleParams) -> Self {
        Turtle {
            highest: Highest::new(params.entry),
            lowest: Lowest::new(params.exit),
            prior_high: None,
            prior_low: None,
            params,
        }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, BacktestError> {
        let d = TurtleParams::default();
        let mut r = params.reader(Self::NAME);
        let entry = r.period("entry", d.entry)?;
        let exit = r.period("exit", d.exit)?;
        let position_pct = r.fraction("position_pct", d.position_pct)?;
        r.finish()?;
        Ok(Turtle::new(TurtleParams {
            entry,
            exit,
            position_pct,
        }))
    }
}

impl Strategy for Turtle {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Highest(self.params.entry),
            IndicatorType::Lowest(self.params.exit),
        ]
    }

    fn warmup(&self) -> usize {
        self.params.entry.max(self.params.exit).saturating_add(1)
    }

    fn next(
        &mut self,
        bar_index: usize,
        market: &MarketState<'_>,
        portfolio: &PortfolioState,
    ) -> Vec<OrderIntent> {
        let bar = market.bar;
        let channel_high = std::mem::replace(&mut self.prior_high, self.highest.update(bar.high));
        let channel_low = std::mem::replace(&mut self.prior_low, self.lowest.update(bar.low));
        if !is_warm(bar_index, self.warmup()) {
            return Vec::new();
        }
        let (Some(channel_high), Some(channel_low)) = (channel_high, channel_low) else {
            return Vec::new();
        };

        if portfolio.is_flat() && bar.close > channel_high {
            let size = calculate_position_size(portfolio.cash, self.params.position_pct, bar.close);
            vec![OrderIntent::buy(size)]
        } else if !portfolio.is_flat() && bar.close < channel_low {
            vec![OrderIntent::close()]
        } else {
            Vec::new()
        }
    }
}
