//! Market-data port.

use crate::domain::error::BacktestError;
use crate::domain::ohlcv::DataSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `symbol` dated within the optional inclusive bounds.
    ///
    /// Implementations return [`BacktestError::NoData`] when the symbol is
    /// unknown and must not reorder or repair the bars they read.
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<DataSeries, BacktestError>;
}
