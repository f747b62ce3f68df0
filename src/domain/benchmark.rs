//! Split-aware benchmark normalisation.
//!
//! Raw feeds are not adjusted for corporate actions, so an n:1 split shows up
//! as a one-day drop of `1/n - 1`. Returns that look like one are treated as
//! artifacts and zeroed before compounding.

use super::ohlcv::DataSeries;
use super::portfolio::ValuePoint;

/// Returns at or below this are checked against the split ratios.
pub const SPLIT_FLAG_THRESHOLD: f64 = -0.5;

/// Absolute tolerance when matching a return against a split ratio.
pub const SPLIT_TOLERANCE: f64 = 0.05;

/// n for the n:1 splits recognised.
pub const SPLIT_FACTORS: [u32; 7] = [2, 3, 4, 5, 7, 10, 20];

const CN_BENCHMARK: &str = "510300.SH";
const HK_BENCHMARK: &str = "02800.HK";
const DEFAULT_BENCHMARK: &str = "SPY";

pub fn is_split_artifact(daily_return: f64) -> bool {
    daily_return <= SPLIT_FLAG_THRESHOLD
        && SPLIT_FACTORS.iter().any(|&n| {
            let ratio = 1.0 / f64::from(n) - 1.0;
            (daily_return - ratio).abs() <= SPLIT_TOLERANCE
        })
}

/// `close[i] / close[i-1] - 1` for `i >= 1`. A non-positive previous close
/// yields 0.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// Daily returns with split artifacts replaced by 0.
pub fn adjusted_returns(closes: &[f64]) -> Vec<f64> {
    daily_returns(closes)
        .into_iter()
        .map(|r| if is_split_artifact(r) { 0.0 } else { r })
        .collect()
}

/// Value of `initial_cash` held in the benchmark from its first bar.
pub fn normalize_benchmark(series: &DataSeries, initial_cash: f64) -> Vec<ValuePoint> {
    let bars = series.bars();
    let Some(first) = bars.first() else {
        return Vec::new();
    };

    let returns = adjusted_returns(&series.closes());
    let mut curve = Vec::with_capacity(bars.len());
    curve.push(ValuePoint {
        date: first.date,
        value: initial_cash,
    });
    let mut value = initial_cash;
    for (bar, r) in bars[1..].iter().zip(returns) {
        value *= 1.0 + r;
        curve.push(ValuePoint {
            date: bar.date,
            value,
        });
    }
    curve
}

/// Default comparison index for a symbol, chosen by exchange suffix.
pub fn benchmark_symbol_for(symbol: &str) -> &'static str {
    let upper = symbol.trim().to_ascii_uppercase();
    if [".SH", ".SZ", ".BJ"].iter().any(|s| upper.ends_with(s)) {
        CN_BENCHMARK
    } else if upper.ends_with(".HK") {
        HK_BENCHMARK
    } else {
        DEFAULT_BENCHMARK
    }
}
