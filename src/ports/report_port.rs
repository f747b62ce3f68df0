//! Result sink port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacktestError;

/// Port for handing a finished run to the charting collaborator.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), BacktestError>;
}
