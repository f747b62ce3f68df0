//! CSV file data adapter.
//!
//! One file per symbol, `<base_path>/<SYMBOL>.csv`, with the header
//! `date,open,high,low,close,volume` and ISO dates.

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::{Bar, DataSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }
}

fn column<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<&'r str, BacktestError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| BacktestError::DataSource {
            reason: format!("line {line}: missing {name} column"),
        })
}

fn number(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<f64, BacktestError> {
    let raw = column(record, index, name, line)?;
    raw.parse().map_err(|e| BacktestError::DataSource {
        reason: format!("line {line}: invalid {name} value {raw:?}: {e}"),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<DataSeries, BacktestError> {
        let path = self.csv_path(symbol);
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| match e.kind() {
            csv::ErrorKind::Io(io) if io.kind() == ErrorKind::NotFound => BacktestError::NoData {
                symbol: symbol.to_string(),
            },
            _ => BacktestError::DataSource {
                reason: format!("failed to open {}: {}", path.display(), e),
            },
        })?;
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| BacktestError::DataSource {
                reason: format!("CSV parse error: {e}"),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let date_str = column(&record, 0, "date", line)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                BacktestError::DataSource {
                    reason: format!("line {line}: invalid date {date_str:?}: {e}"),
                }
            })?;

            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }

            bars.push(Bar {
                date,
                open: number(&record, 1, "open", line)?,
                high: number(&record, 2, "high", line)?,
                low: number(&record, 3, "low", line)?,
                close: number(&record, 4, "close", line)?,
                volume: number(&record, 5, "volume", line)?,
            });
        }

        if bars.is_empty() {
            return Err(BacktestError::NoData {
                symbol: symbol.to_string(),
            });
        }
        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded csv");
        DataSeries::new(bars)
    }
}
