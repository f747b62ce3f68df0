//! Rolling Highest / Lowest over the last n values, current value included.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
struct Window {
    period: usize,
    values: VecDeque<f64>,
}

impl Window {
    fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            values: VecDeque::new(),
        }
    }

    fn push(&mut self, value: f64) -> bool {
        if self.values.len() == self.period {
            self.values.pop_front();
        }
        self.values.push_back(value);
        self.values.len() == self.period
    }
}

#[derive(Debug, Clone)]
pub struct Highest(Window);

impl Highest {
    pub fn new(period: usize) -> Self {
        Highest(Window::new(period))
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if !self.0.push(value) {
            return None;
        }
        self.0.values.iter().copied().reduce(f64::max)
    }
}

#[derive(Debug, Clone)]
pub struct Lowest(Window);

impl Lowest {
    pub fn new(period: usize) -> Self {
        Lowest(Window::new(period))
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if !self.0.push(value) {
            return None;
        }
        self.0.values.iter().copied().reduce(f64::min)
    }
}
