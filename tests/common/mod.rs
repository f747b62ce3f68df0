#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
pub use tradesim::domain::ohlcv::{Bar, DataSeries};
use tradesim::domain::error::BacktestError;
use tradesim::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<DataSeries, BacktestError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BacktestError::DataSource {
                reason: reason.clone(),
            });
        }
        let bars: Vec<Bar> = self
            .data
            .get(symbol)
            .ok_or_else(|| BacktestError::NoData {
                symbol: symbol.to_string(),
            })?
            .iter()
            .filter(|b| start_date.is_none_or(|s| b.date >= s))
            .filter(|b| end_date.is_none_or(|e| b.date <= e))
            .cloned()
            .collect();
        DataSeries::new(bars)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> Bar {
    Bar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000.0,
    }
}

/// One bar per calendar day starting at `start`, closing at each of `closes`.
pub fn bars_from_closes(start: &str, closes: &[f64]) -> Vec<Bar> {
    let first = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: first + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1000.0,
        })
        .collect()
}

pub fn series_from_closes(start: &str, closes: &[f64]) -> DataSeries {
    DataSeries::new(bars_from_closes(start, closes)).unwrap()
}

/// A gently oscillating upward-drifting price path.
pub fn wave(n: usize, base: f64) -> Vec<f64> {
    (0..n)
        .map(|i| base + i as f64 * 0.1 + (i as f64 * 0.35).sin() * base * 0.08)
        .collect()
}

/// `date,open,high,low,close,volume` CSV text for the given bars.
pub fn to_csv(bars: &[Bar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}
