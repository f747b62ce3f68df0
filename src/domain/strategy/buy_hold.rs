//! Buy-and-hold: enter on the first usable bar and never sell.

use super::params::StrategyParams;
use super::{calculate_position_size, MarketState, Strategy};
use crate::domain::error::BacktestError;
use crate::domain::execution::OrderIntent;
use crate::domain::portfolio::PortfolioState;

#[derive(Debug, Clone, PartialEq)]
pub struct BuyHoldParams {
    pub position_pct: f64,
}

impl Default for BuyHoldParams {
    fn default() -> Self {
        BuyHoldParams { position_pct: 1.0 }
    }
}

/// Buy on the first bar and never sell.
#[derive(Debug, Clone)]
pub struct BuyHold {
    params: BuyHoldParams,
}

impl BuyHold {
    pub const NAME: &'static str = "BuyHold";

    pub fn new(params: BuyHoldParams) -> Self {
        BuyHold { params }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, BacktestError> {
        let mut r = params.reader(Self::NAME);
        let position_pct = r.fraction("position_pct", BuyHoldParams::default().position_pct)?;
        r.finish()?;
        Ok(BuyHold::new(BuyHoldParams { position_pct }))
    }
}

impl Strategy for BuyHold {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn next(
        &mut self,
        _bar_index: usize,
        market: &MarketState<'_>,
        portfolio: &PortfolioState,
    ) -> Vec<OrderIntent> {
        if !portfolio.is_flat() {
            return Vec::new();
        }
        let size =
            calculate_position_size(portfolio.cash, self.params.position_pct, market.bar.close);
        if size > 0.0 {
            vec![OrderIntent::buy(size)]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::OrderKind;
    use crate::domain::strategy::test_support::{drive, flat_bar};

    #[test]
    fn buys_exactly_once() {
        let bars: Vec<_> = (0..30)
            .map(|i| flat_bar(i, 100.0 + (i as f64 * 0.7).sin() * 5.0))
            .collect();
        let mut strategy = BuyHold::new(BuyHoldParams::default());
        let (fills, portfolio) = drive(&mut strategy, &bars, 10_000.0);

        assert_eq!(fills, vec![(0, OrderKind::Buy)]);
        assert!(portfolio.cash.abs() < 1e-9);
        assert!(portfolio.trades.is_empty());
    }

    #[test]
    fn partial_allocation_keeps_cash() {
        let bars: Vec<_> = (0..5).map(|i| flat_bar(i, 50.0)).collect();
        let mut strategy = BuyHold::new(BuyHoldParams { position_pct: 0.5 });
        let (fills, portfolio) = drive(&mut strategy, &bars, 10_000.0);

        assert_eq!(fills.len(), 1);
        assert!((portfolio.cash - 5_000.0).abs() < 1e-9);
        assert!((portfolio.position.size - 100.0).abs() < 1e-9);
    }
}
