//! JSON report adapter: the output record, pretty-printed.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;
use crate::ports::report_port::ReportPort;

/// Output path that selects stdout.
pub const STDOUT_PATH: &str = "-";

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        JsonReportAdapter
    }

    pub fn write_to<W: Write>(
        &self,
        result: &BacktestResult,
        mut writer: W,
    ) -> Result<(), BacktestError> {
        serde_json::to_writer_pretty(&mut writer, result)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), BacktestError> {
        if output_path == STDOUT_PATH {
            return self.write_to(result, io::stdout().lock());
        }
        let file = File::create(output_path)?;
        self.write_to(result, BufWriter::new(file))?;
        info!(path = output_path, "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::{Backtest, BacktestRequest, RunWarning};
    use crate::domain::ohlcv::{Bar, DataSeries};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_result() -> BacktestResult {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = [10.0, 12.0, 11.0]
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                date: start + chrono::Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1.0,
            })
            .collect();
        let data = DataSeries::new(bars).unwrap();
        Backtest::new()
            .run(&BacktestRequest::new("AAPL", "BuyHold", 1_000.0), &data, None)
            .unwrap()
    }

    #[test]
    fn writes_pretty_json_with_summary_and_chart() {
        let mut buf = Vec::new();
        JsonReportAdapter::new()
            .write_to(&sample_result(), &mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("\n  \"summary\": {"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["summary"]["symbol"], "AAPL");
        assert_eq!(value["chart"]["dates"].as_array().unwrap().len(), 3);
        assert_eq!(value["chart"]["buy_points"][0]["date"], "2024-01-01");
    }

    #[test]
    fn warnings_are_tagged() {
        let mut result = sample_result();
        result.warnings.push(RunWarning::BenchmarkUnavailable {
            symbol: "SPY".into(),
            reason: "no data for SPY".into(),
        });
        let mut buf = Vec::new();
        JsonReportAdapter::new().write_to(&result, &mut buf).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["warnings"][0]["kind"], "benchmark_unavailable");
        assert_eq!(value["warnings"][0]["symbol"], "SPY");
    }

    #[test]
    fn writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("result.json");
        JsonReportAdapter::new()
            .write(&sample_result(), path.to_str().unwrap())
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(value["summary"]["total_return"].is_f64());
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let err = JsonReportAdapter::new()
            .write(&sample_result(), "/nonexistent/dir/result.json")
            .unwrap_err();
        assert!(matches!(err, BacktestError::Io(_)));
    }
}
