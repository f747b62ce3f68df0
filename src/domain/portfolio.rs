//! Portfolio state and value tracking.

use chrono::NaiveDate;

use super::position::{Position, TradeRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Read-only view of the portfolio handed to a strategy each bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub position_size: f64,
    pub average_cost: f64,
    pub mark_value: f64,
}

impl PortfolioState {
    pub fn is_flat(&self) -> bool {
        self.position_size <= 0.0
    }

    /// Value of the held position at the mark price.
    pub fn position_value(&self) -> f64 {
        self.mark_value - self.cash
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_cash: f64,
    pub position: Position,
    pub trades: Vec<TradeRecord>,
    pub value_history: Vec<ValuePoint>,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Portfolio {
            cash: initial_cash,
            initial_cash,
            position: Position::default(),
            trades: Vec::new(),
            value_history: Vec::new(),
        }
    }

    pub fn mark_value(&self, price: f64) -> f64 {
        self.cash + self.position.market_value(price)
    }

    pub fn state(&self, price: f64) -> PortfolioState {
        PortfolioState {
            cash: self.cash,
            position_size: self.position.size,
            average_cost: self.position.average_cost,
            mark_value: self.mark_value(price),
        }
    }

    pub fn record_trade(&mut self, trade: TradeRecord) {
        self.trades.push(trade);
    }

    pub fn record_value(&mut self, date: NaiveDate, value: f64) {
        self.value_history.push(ValuePoint { date, value });
    }
}
