//! Append-only log of executed buy and sell events, owned by the run.

use chrono::NaiveDate;
use serde::Serialize;

use super::execution::{ExecutionReceipt, OrderKind};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Signal {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalRecorder {
    buys: Vec<Signal>,
    sells: Vec<Signal>,
}

impl SignalRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buys go to the buy log; sells and closes both go to the sell log.
    pub fn record(&mut self, receipt: &ExecutionReceipt) {
        let signal = Signal {
            date: receipt.date,
            price: receipt.price,
        };
        match receipt.kind {
            OrderKind::Buy => self.buys.push(signal),
            OrderKind::Sell | OrderKind::Close => self.sells.push(signal),
        }
    }

    pub fn into_parts(self) -> (Vec<Signal>, Vec<Signal>) {
        (self.buys, self.sells)
    }
}
