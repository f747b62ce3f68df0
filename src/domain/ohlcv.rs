//! Daily OHLCV bars and the validated bar sequence the engine consumes.

use chrono::NaiveDate;

use super::error::BacktestError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Which price of a bar an indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
}

impl Bar {
    pub fn field(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
        }
    }

    fn check_values(&self) -> Result<(), BacktestError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(BacktestError::InvalidValue {
                    date: self.date,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Bars with strictly increasing, duplicate-free dates and finite,
/// non-negative values. Construction rejects violations; nothing is repaired.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSeries {
    bars: Vec<Bar>,
}

impl DataSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, BacktestError> {
        for (i, bar) in bars.iter().enumerate() {
            bar.check_values()?;
            if i == 0 {
                continue;
            }
            let previous = bars[i - 1].date;
            if bar.date == previous {
                return Err(BacktestError::DuplicateDate { date: bar.date });
            }
            if bar.date < previous {
                return Err(BacktestError::UnorderedDates {
                    index: i,
                    previous,
                    date: bar.date,
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Bars dated within `[start, end]`. Order is preserved so the result is
    /// still a valid series.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> DataSeries {
        DataSeries {
            bars: self
                .bars
                .iter()
                .filter(|b| b.date >= start && b.date <= end)
                .cloned()
                .collect(),
        }
    }
}
