//! Graph-level aggregation: unweighted statistics per artifact.
//!
//! Each target counts equally, regardless of how many underlying samples
//! it was evaluated on. The rmse population is derived from the retained
//! mse population, with one asymmetry: negative mse values (numerical
//! noise, they should not occur) are excluded from the rmse population
//! but still counted in the mse population.

use crate::aggregate::stats::{finite, mean_std_sample};
use crate::types::{GraphSummaryRow, ResultArtifact};

/// Summarize one artifact into a graph-level row.
///
/// A row is emitted even when every statistic is NaN; a broken run shows
/// up as a visible row of NaNs rather than silently vanishing.
pub fn graph_summary_row(artifact: &ResultArtifact) -> GraphSummaryRow {
    // Absent mse maps to NaN, then the finite pass drops it.
    let mse_list = finite(
        artifact
            .measurements
            .iter()
            .map(|m| m.mse.unwrap_or(f64::NAN)),
    );

    let rmse_list: Vec<f64> = mse_list
        .iter()
        .filter(|&&mse| mse >= 0.0)
        .map(|mse| mse.sqrt())
        .collect();

    let (mse_mean, mse_std) = mean_std_sample(&mse_list);
    let (rmse_mean, rmse_std) = mean_std_sample(&rmse_list);

    GraphSummaryRow {
        key: artifact.key.clone(),
        mse_mean,
        mse_std,
        rmse_mean,
        rmse_std,
        n_targets_used: mse_list.len(),
    }
}
