//! Position tracking and completed trades.

use chrono::NaiveDate;
use serde::Serialize;

/// Long-only holding of the traded symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Position {
    pub size: f64,
    pub average_cost: f64,
    /// Date of the buy that opened the position from flat.
    pub entry_date: Option<NaiveDate>,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.size > 0.0
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.size * price
    }

    /// Add `size` units bought at `price`, blending the average cost.
    pub fn add(&mut self, size: f64, price: f64, date: NaiveDate) {
        if !self.is_open() {
            self.entry_date = Some(date);
            self.average_cost = price;
            self.size = size;
            return;
        }
        let total = self.size + size;
        self.average_cost = (self.size * self.average_cost + size * price) / total;
        self.size = total;
    }

    /// Remove up to `size` units; returns the amount actually removed.
    pub fn reduce(&mut self, size: f64) -> f64 {
        let removed = size.min(self.size);
        self.size -= removed;
        if self.size <= 0.0 {
            *self = Position::default();
        }
        removed
    }
}

/// A full or partial unwind of a position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub size: f64,
    pub pnl: f64,
    pub won: bool,
}
