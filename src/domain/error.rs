//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for tradesim.
///
/// Configuration and data-integrity failures are terminal for a run. Degraded
/// outcomes (short warm-up, missing benchmark) are reported as
/// [`RunWarning`](crate::domain::backtest::RunWarning)s instead, unless the run
/// is strict.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("unrecognized parameter for {strategy}: {key}")]
    UnknownParam { strategy: String, key: String },

    #[error("invalid parameter for {strategy} {key}: {reason}")]
    ParamInvalid {
        strategy: String,
        key: String,
        reason: String,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("bar {index} dated {date} is not after previous bar dated {previous}")]
    UnorderedDates {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("duplicate bar date {date}")]
    DuplicateDate { date: NaiveDate },

    #[error("invalid {field} on {date}: {value}")]
    InvalidValue {
        date: NaiveDate,
        field: &'static str,
        value: f64,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("benchmark {symbol} unavailable: {reason}")]
    BenchmarkUnavailable { symbol: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BacktestError {
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BacktestError::UnknownStrategy { .. }
                | BacktestError::UnknownParam { .. }
                | BacktestError::ParamInvalid { .. }
                | BacktestError::ConfigParse { .. }
                | BacktestError::ConfigMissing { .. }
                | BacktestError::ConfigInvalid { .. }
        )
    }

    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            BacktestError::UnorderedDates { .. }
                | BacktestError::DuplicateDate { .. }
                | BacktestError::InvalidValue { .. }
        )
    }
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        let code: u8 = match err {
            BacktestError::Io(_) | BacktestError::Json(_) => 1,
            BacktestError::UnknownStrategy { .. }
            | BacktestError::UnknownParam { .. }
            | BacktestError::ParamInvalid { .. }
            | BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. } => 2,
            BacktestError::UnorderedDates { .. }
            | BacktestError::DuplicateDate { .. }
            | BacktestError::InvalidValue { .. }
            | BacktestError::NoData { .. }
            | BacktestError::DataSource { .. } => 3,
            BacktestError::InsufficientData { .. } | BacktestError::BenchmarkUnavailable { .. } => {
                5
            }
        };
        std::process::ExitCode::from(code)
    }
}
