//! RSI mean reversion: buy when oversold, close when overbought.

use super::params::StrategyParams;
use super::{calculate_position_size, is_warm, MarketState, Strategy};
use crate::domain::error::BacktestError;
use crate::domain::execution::OrderIntent;
use crate::domain::indicator::{IndicatorType, Rsi};
use crate::domain::portfolio::PortfolioState;

#[derive(Debug, Clone, PartialEq)]
pub struct RsiParams {
    pub rsi_period: usize,
    pub buy_level: f64,
    pub sell_level: f64,
    pub position_pct: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        RsiParams {
            rsi_period: 14,
            buy_level: 30.0,
            sell_level: 70.0,
            position_pct: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RsiStrategy {
    params: RsiParams,
    rsi: Rsi,
}

impl RsiStrategy {
    pub const NAME: &'static str = "RSI";

    pub fn new(params: RsiParams) -> Self {
        RsiStrategy {
            rsi: Rsi::new(params.rsi_period),
            params,
        }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, BacktestError> {
        let d = RsiParams::default();
        let mut r = params.reader(Self::NAME);
        let rsi_period = r.period("rsi_period", d.rsi_period)?;
        let buy_level = r.level("buy_level", d.buy_level)?;
        let sell_level = r.level("sell_level", d.sell_level)?;
        let position_pct = r.fraction("position_pct", d.position_pct)?;
        r.ensure(buy_level < sell_level, "buy_level", "must be below sell_level")?;
        r.finish()?;
        Ok(RsiStrategy::new(RsiParams {
            rsi_period,
            buy_level,
            sell_level,
            position_pct,
        }))
    }
}

impl Strategy for RsiStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::Rsi(self.params.rsi_period)]
    }

    fn next(
        &mut self,
        bar_index: usize,
        market: &MarketState<'_>,
        portfolio: &PortfolioState,
    ) -> Vec<OrderIntent> {
        let close = market.bar.close;
        let Some(rsi) = self.rsi.update(close) else {
            return Vec::new();
        };
        if !is_warm(bar_index, self.warmup()) {
            return Vec::new();
        }

        if portfolio.is_flat() && rsi < self.params.buy_level {
            let size = calculate_position_size(portfolio.cash, self.params.position_pct, close);
            vec![OrderIntent::buy(size)]
        } else if !portfolio.is_flat() && rsi > self.params.sell_level {
            vec![OrderIntent::close()]
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

    fn strategy() -> RsiStrategy {
        RsiStrategy::new(RsiParams {
            rsi_period: 3,
            ..RsiParams::default()
        })
    }

    #[test]
    fn warmup_is_period_plus_one() {
        assert_eq!(strategy().warmup(), 4);
    }

    #[test]
    fn buys_after_decline_and_closes_after_rally() {
        let mut closes: Vec<f64> = (0..6).map(|i| 100.0 - i as f64 * 5.0).collect();
        closes.extend((1..8).map(|i| 75.0 + i as f64 * 5.0));
        let bars: Vec<_> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| flat_bar(i, c))
            .collect();

        let (fills, portfolio) = drive(&mut strategy(), &bars, 10_000.0);

        assert_eq!(fills[0], (3, OrderKind::Buy));
        assert!(fills.iter().any(|&(_, k)| k == OrderKind::Close));
        assert!(portfolio.trades[0].won);
    }

    #[test]
    fn constant_series_never_trades() {
        let bars: Vec<_> = (0..40).map(|i| flat_bar(i, 20.0)).collect();
        let (fills, _) = drive(&mut strategy(), &bars, 10_000.0);
        assert!(fills.is_empty());
    }

    #[test]
    fn rejects_inverted_levels() {
        let params = StrategyParams::new()
            .with("buy_level", 80)
            .with("sell_level", 20);
        assert!(RsiStrategy::from_params(&params).is_err());
    }

    #[test]
    fn reads_rsi_period() {
        let params = StrategyParams::new().with("rsi_period", 7);
        let strategy = RsiStrategy::from_params(&params).unwrap();
        assert_eq!(strategy.params.rsi_period, 7);
        assert_eq!(strategy.warmup(), 8);
    }

    #[test]
    fn bare_period_key_is_unknown() {
        let params = StrategyParams::new().with("period", 7);
        assert!(matches!(
            RsiStrategy::from_params(&params),
            Err(BacktestError::UnknownParam { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_level() {
        let params = StrategyParams::new().with("sell_level", 120);
        assert!(RsiStrategy::from_params(&params).is_err());
    }
}
