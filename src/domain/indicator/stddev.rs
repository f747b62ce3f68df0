//! Population standard deviation over a full window.
//!
//! STDDEV(n) = sqrt(sum((x - mean)^2) / n)

/// Mean and population standard deviation of exactly `n` values.
pub(crate) fn mean_and_stddev(values: impl Iterator<Item = f64> + Clone, n: usize) -> (f64, f64) {
    let n = n as f64;
    let mean = values.clone().sum::<f64>() / n;
    let variance = values
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_values_have_zero_spread() {
        let (mean, sd) = mean_and_stddev([100.0; 5].into_iter(), 5);
        assert_eq!(mean, 100.0);
        assert!(sd.abs() < f64::EPSILON);
    }

    #[test]
    fn known_values() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let (mean, sd) = mean_and_stddev(values.into_iter(), values.len());
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((sd - 2.0).abs() < 1e-10);
    }
}
