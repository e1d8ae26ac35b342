//! Pair-level aggregation: sample-count-weighted overall mse.
//!
//! Weighting by `test_samples` makes the result comparable across
//! artifacts whose targets were evaluated on very different sample
//! counts, unlike the unweighted graph-level mean where a 5-sample
//! target counts as much as a 5000-sample one.

use crate::types::{PairSummaryRow, ResultArtifact};

/// Summarize one artifact into a pair-level row.
///
/// Accumulates `Σ(mse·samples)` and `Σ(samples)` over measurements where
/// both values are present and samples > 0; `overall_mse` is the ratio,
/// or NaN when the accumulated weight is zero.
///
/// Returns `None` for an empty measurement list - stricter than the
/// graph-level policy, because a weighted average over zero samples is
/// not meaningful even as a placeholder.
pub fn pair_summary_row(artifact: &ResultArtifact) -> Option<PairSummaryRow> {
    if artifact.measurements.is_empty() {
        return None;
    }

    let mut weighted_sum = 0.0;
    let mut total_samples = 0.0;

    for m in &artifact.measurements {
        if let (Some(mse), Some(samples)) = (m.mse, m.test_samples) {
            if samples > 0.0 {
                weighted_sum += mse * samples;
                total_samples += samples;
            }
        }
    }

    let overall_mse = if total_samples > 0.0 {
        weighted_sum / total_samples
    } else {
        f64::NAN
    };

    Some(PairSummaryRow {
        key: artifact.key.clone(),
        overall_mse,
    })
}
