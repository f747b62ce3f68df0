//! Simple Moving Average.
//!
//! SMA(n) = mean of the last n values. Undefined until n values are seen.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: VecDeque<f64>,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            window: VecDeque::new(),
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.window.len() == self.period {
            self.window.pop_front();
        }
        self.window.push_back(value);
        self.value()
    }

    fn value(&self) -> Option<f64> {
        if self.window.len() < self.period {
            return None;
        }
        Some(self.window.iter().sum::<f64>() / self.period as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(sma: &mut Sma, values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|&v| sma.update(v)).collect()
    }

    #[test]
    fn sma_warmup() {
        let mut sma = Sma::new(3);
        let out = feed(&mut sma, &[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!(out[2].is_some());
        assert!(out[3].is_some());
    }

    #[test]
    fn sma_rolls_window() {
        let mut sma = Sma::new(3);
        let out = feed(&mut sma, &[10.0, 20.0, 30.0, 40.0, 50.0]);
        assert!((out[2].unwrap() - 20.0).abs() < 1e-12);
        assert!((out[3].unwrap() - 30.0).abs() < 1e-12);
        assert!((out[4].unwrap() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn sma_period_one_is_identity() {
        let mut sma = Sma::new(1);
        assert_eq!(sma.update(7.5), Some(7.5));
        assert_eq!(sma.update(3.0), Some(3.0));
    }
}
