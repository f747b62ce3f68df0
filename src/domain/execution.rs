//! Order intents and their execution at the bar's close.
//!
//! Fills happen at the close price with no slippage and no commission. A
//! buy never spends more cash than the portfolio holds and a sell never
//! unwinds more than the position; an intent that resolves to a size of zero
//! or less is rejected and produces no receipt.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::portfolio::Portfolio;
use super::position::TradeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    Buy,
    Sell,
    Close,
}

/// What a strategy asks for on the current bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderIntent {
    pub kind: OrderKind,
    /// Units requested. Ignored for [`OrderKind::Close`].
    pub size: f64,
}

impl OrderIntent {
    pub fn buy(size: f64) -> Self {
        OrderIntent {
            kind: OrderKind::Buy,
            size,
        }
    }

    pub fn sell(size: f64) -> Self {
        OrderIntent {
            kind: OrderKind::Sell,
            size,
        }
    }

    pub fn close() -> Self {
        OrderIntent {
            kind: OrderKind::Close,
            size: 0.0,
        }
    }
}

/// Proof that an intent was filled.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReceipt {
    pub kind: OrderKind,
    pub date: NaiveDate,
    pub price: f64,
    pub size: f64,
    pub value: f64,
}

/// Fill `intent` against `portfolio` at `price` on `date`.
pub fn execute(
    portfolio: &mut Portfolio,
    intent: OrderIntent,
    date: NaiveDate,
    price: f64,
) -> Option<ExecutionReceipt> {
    if !price.is_finite() || price <= 0.0 {
        return None;
    }
    match intent.kind {
        OrderKind::Buy => buy(portfolio, intent.size, date, price),
        OrderKind::Sell => sell(portfolio, OrderKind::Sell, intent.size, date, price),
        OrderKind::Close => {
            let size = portfolio.position.size;
            sell(portfolio, OrderKind::Close, size, date, price)
        }
    }
}

fn buy(
    portfolio: &mut Portfolio,
    requested: f64,
    date: NaiveDate,
    price: f64,
) -> Option<ExecutionReceipt> {
    if !requested.is_finite() || requested <= 0.0 || portfolio.cash <= 0.0 {
        return None;
    }

    let (size, cost) = if requested * price >= portfolio.cash {
        // spend everything; keeps cash at exactly zero instead of -1ulp
        (portfolio.cash / price, portfolio.cash)
    } else {
        (requested, requested * price)
    };
    if size <= 0.0 {
        return None;
    }

    portfolio.cash -= cost;
    portfolio.position.add(size, price, date);
    debug!(%date, price, size, cost, "buy filled");

    Some(ExecutionReceipt {
        kind: OrderKind::Buy,
        date,
        price,
        size,
        value: cost,
    })
}

fn sell(
    portfolio: &mut Portfolio,
    kind: OrderKind,
    requested: f64,
    date: NaiveDate,
    price: f64,
) -> Option<ExecutionReceipt> {
    if !requested.is_finite() || requested <= 0.0 || !portfolio.position.is_open() {
        return None;
    }

    let entry_price = portfolio.position.average_cost;
    let entry_date = portfolio.position.entry_date.unwrap_or(date);
    let size = portfolio.position.reduce(requested);
    let proceeds = size * price;
    portfolio.cash += proceeds;

    let pnl = size * (price - entry_price);
    portfolio.record_trade(TradeRecord {
        entry_date,
        entry_price,
        exit_date: date,
        exit_price: price,
        size,
        pnl,
        won: pnl > 0.0,
    });
    debug!(%date, price, size, pnl, ?kind, "sell filled");

    Some(ExecutionReceipt {
        kind,
        date,
        price,
        size,
        value: proceeds,
    })
}
