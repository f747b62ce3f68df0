//! RSI (Relative Strength Index).
//!
//! Uses Wilder's smoothing for average gain/loss:
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: n changes are needed, so the first value appears on the (n+1)th input.

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    prev: Option<f64>,
    changes: usize,
    avg_gain: f64,
    avg_loss: f64,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
            prev: None,
            changes: 0,
            avg_gain: 0.0,
            avg_loss: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        let prev = self.prev.replace(value)?;
        let change = value - prev;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        let n = self.period as f64;

        self.changes += 1;
        if self.changes <= self.period {
            // accumulate the seed as a running sum, averaged once complete
            self.avg_gain += gain;
            self.avg_loss += loss;
            if self.changes < self.period {
                return None;
            }
            self.avg_gain /= n;
            self.avg_loss /= n;
        } else {
            self.avg_gain = (self.avg_gain * (n - 1.0) + gain) / n;
            self.avg_loss = (self.avg_loss * (n - 1.0) + loss) / n;
        }

        Some(self.current())
    }

    fn current(&self) -> f64 {
        if self.avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + self.avg_gain / self.avg_loss))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(rsi: &mut Rsi, values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|&v| rsi.update(v)).collect()
    }

    #[test]
    fn rsi_warmup() {
        let mut rsi = Rsi::new(3);
        let out = feed(&mut rsi, &[10.0, 11.0, 12.0, 13.0, 12.0]);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], None);
        assert!(out[3].is_some());
        assert!(out[4].is_some());
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let mut rsi = Rsi::new(3);
        let out = feed(&mut rsi, &[10.0, 11.0, 12.0, 13.0]);
        assert!((out[3].unwrap() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let mut rsi = Rsi::new(3);
        let out = feed(&mut rsi, &[13.0, 12.0, 11.0, 10.0]);
        assert!(out[3].unwrap().abs() < 1e-12);
    }

    #[test]
    fn rsi_seed_and_wilder_smoothing() {
        let mut rsi = Rsi::new(2);
        // changes: +2, -1 → avg_gain 1.0, avg_loss 0.5 → RS 2 → RSI 66.67
        let out = feed(&mut rsi, &[10.0, 12.0, 11.0, 13.0]);
        let seed = out[2].unwrap();
        assert!((seed - (100.0 - 100.0 / 3.0)).abs() < 1e-9);
        // change +2: avg_gain (1*1+2)/2=1.5, avg_loss (0.5*1+0)/2=0.25 → RS 6
        let next = out[3].unwrap();
        assert!((next - (100.0 - 100.0 / 7.0)).abs() < 1e-9);
    }

    #[test]
    fn rsi_stays_in_range() {
        let mut rsi = Rsi::new(5);
        let prices = [44.0, 44.3, 44.1, 43.6, 44.3, 44.8, 45.1, 45.4, 45.8, 46.1, 45.9];
        for v in feed(&mut rsi, &prices).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }
}
