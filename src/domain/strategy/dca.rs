//! Dollar-cost averaging: a fixed-amount buy every `invest_period` bars.

use super::params::StrategyParams;
use super::{MarketState, Strategy};
use crate::domain::error::BacktestError;
use crate::domain::execution::OrderIntent;
use crate::domain::portfolio::PortfolioState;

#[derive(Debug, Clone, PartialEq)]
pub struct DcaParams {
    pub invest_period: usize,
    pub invest_amount: f64,
}

impl Default for DcaParams {
    fn default() -> Self {
        DcaParams {
            invest_period: 22,
            invest_amount: 2000.0,
        }
    }
}

/// Dollar-cost averaging: buy `invest_amount` worth on every
/// `invest_period`-th bar, never sell.
#[derive(Debug, Clone)]
pub struct Dca {
    params: DcaParams,
}

impl Dca {
    pub const NAME: &'static str = "DCA";

    pub fn new(params: DcaParams) -> Self {
        Dca { params }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, BacktestError> {
        let d = DcaParams::default();
        let mut r = params.reader(Self::NAME);
        let invest_period = r.period("invest_period", d.invest_period)?;
        let invest_amount = r.positive("invest_amount", d.invest_amount)?;
        r.finish()?;
        Ok(Dca::new(DcaParams {
            invest_period,
            invest_amount,
        }))
    }
}

impl Strategy for Dca {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn next(
        &mut self,
        bar_index: usize,
        market: &MarketState<'_>,
        _portfolio: &PortfolioState,
    ) -> Vec<OrderIntent> {
        let close = market.bar.close;
        if (bar_index + 1) % self.params.invest_period != 0 || close <= 0.0 {
            return Vec::new();
        }
        vec![OrderIntent::buy(self.params.invest_amount / close)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::OrderKind;
    use crate::domain::strategy::test_support::{drive, flat_bar};

    #[test]
    fn invests_every_period() {
        let bars: Vec<_> = (0..20)
            .map(|i| flat_bar(i, 10.0 + (i % 3) as f64))
            .collect();
        let mut strategy = Dca::new(DcaParams {
            invest_period: 5,
            invest_amount: 100.0,
        });
        let (fills, portfolio) = drive(&mut strategy, &bars, 10_000.0);

        let indices: Vec<_> = fills.iter().map(|&(i, _)| i).collect();
        assert_eq!(indices, vec![4, 9, 14, 19]);
        assert!(fills.iter().all(|&(_, k)| k == OrderKind::Buy));
        assert!((10_000.0 - portfolio.cash - 400.0).abs() < 1e-9);
    }

    #[test]
    fn stops_buying_when_cash_runs_out() {
        let bars: Vec<_> = (0..10).map(|i| flat_bar(i, 10.0)).collect();
        let mut strategy = Dca::new(DcaParams {
            invest_period: 1,
            invest_amount: 300.0,
        });
        let (fills, portfolio) = drive(&mut strategy, &bars, 1_000.0);

        assert_eq!(fills.len(), 4);
        assert_eq!(portfolio.cash, 0.0);
    }
}
