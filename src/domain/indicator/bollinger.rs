//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) values are undefined.

use std::collections::VecDeque;

use super::stddev::mean_and_stddev;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    window: VecDeque<f64>,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        let period = period.max(1);
        Self {
            period,
            multiplier,
            window: VecDeque::new(),
        }
    }

    pub fn update(&mut self, value: f64) -> Option<BollingerValue> {
        if self.window.len() == self.period {
            self.window.pop_front();
        }
        self.window.push_back(value);
        if self.window.len() < self.period {
            return None;
        }
        let (middle, stddev) = mean_and_stddev(self.window.iter().copied(), self.period);
        Some(BollingerValue {
            upper: middle + self.multiplier * stddev,
            middle,
            lower: middle - self.multiplier * stddev,
        })
    }
}
