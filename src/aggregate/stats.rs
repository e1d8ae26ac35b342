//! Small statistics helpers shared by both aggregation strategies.
//!
//! Undefined statistics are NaN, not errors: a mean over zero elements
//! and a standard deviation over fewer than two elements both report NaN,
//! and downstream consumers filter non-finite values instead of handling
//! a failure path.

/// Keep only finite values.
pub fn finite(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    values.into_iter().filter(|v| v.is_finite()).collect()
}

/// Sample mean and sample standard deviation (divisor n-1).
///
/// Zero elements: both NaN. Exactly one element: mean defined, std NaN.
pub fn mean_std_sample(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let std = if values.len() >= 2 {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    } else {
        f64::NAN
    };

    (mean, std)
}
