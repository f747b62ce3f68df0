//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the SMA of the first n values, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Undefined for the first (n-1) values.

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    k: f64,
    seen: usize,
    seed_sum: f64,
    value: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            k: 2.0 / (period as f64 + 1.0),
            seen: 0,
            seed_sum: 0.0,
            value: None,
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.seen += 1;
        match self.value {
            Some(prev) => {
                self.value = Some(value * self.k + prev * (1.0 - self.k));
            }
            None => {
                self.seed_sum += value;
                if self.seen == self.period {
                    self.value = Some(self.seed_sum / self.period as f64);
                }
            }
        }
        self.value
    }
}
