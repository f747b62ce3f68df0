//! Technical indicators.
//!
//! Every indicator is a small state machine fed one value (or bar) at a time
//! in date order. Each owns its trailing window; nothing is shared between
//! instances and nothing reads ahead of the value just supplied. `update`
//! returns `None` until the indicator has seen enough input to be defined.
//!
//! [`IndicatorType`] names an indicator with its parameters and knows how many
//! bars it needs before producing a value. Strategies use it to declare their
//! warm-up.

pub mod bollinger;
pub mod ema;
pub mod extremes;
pub mod macd;
pub mod rsi;
pub mod sma;
mod stddev;

pub use bollinger::{Bollinger, BollingerValue};
pub use ema::Ema;
pub use extremes::{Highest, Lowest};
pub use macd::{Macd, MacdValue};
pub use rsi::Rsi;
pub use sma::Sma;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Highest(usize),
    Lowest(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    /// Number of bars, including the current one, before a value exists.
    pub fn warmup_bars(&self) -> usize {
        match self {
            IndicatorType::Sma(period)
            | IndicatorType::Highest(period)
            | IndicatorType::Lowest(period) => *period,
            IndicatorType::Rsi(period) => period.saturating_add(1),
            IndicatorType::Macd { fast, slow, signal } => {
                fast.max(slow).saturating_add(*signal).saturating_sub(1)
            }
            IndicatorType::Bollinger { period, .. } => *period,
        }
    }
}
