//! Independent backtests over the same data, run in parallel.
//!
//! Each job builds its own strategy, portfolio and signal log, so jobs share
//! nothing mutable. Results come back in job order.

use rayon::prelude::*;

use super::backtest::{Backtest, BacktestRequest, BacktestResult};
use super::error::BacktestError;
use super::ohlcv::DataSeries;

pub fn run_all(
    runner: &Backtest,
    jobs: &[BacktestRequest],
    data: &DataSeries,
    benchmark: Option<&DataSeries>,
) -> Vec<Result<BacktestResult, BacktestError>> {
    jobs.par_iter()
        .map(|request| runner.run(request, data, benchmark))
        .collect()
}
