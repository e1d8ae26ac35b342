//! Grouped descriptive statistics over the combined comparison table.
//!
//! Groups are keyed by `(model, condition, alpha)`. Within a group the
//! mean and sample standard deviation are computed over finite metric
//! values only, and `count` is the number of finite values - NaN metrics
//! stay visible as a reduced count, never as a poisoned mean.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::aggregate::stats::{finite, mean_std_sample};
use crate::table::{fmt_f64, fmt_opt_f64, open_writer};
use crate::types::{Condition, cmp_opt_f64};

use super::load::ComparisonRow;

/// Descriptive statistics for one `(model, condition, alpha)` group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStat {
    pub model: String,
    pub condition: Condition,
    pub alpha: Option<f64>,
    pub mean: f64,
    pub std: f64,
    pub count: usize,
}

/// Compute grouped statistics, deterministically sorted by group key.
///
/// Rows whose alpha is still missing after broadcasting cannot join an
/// alpha group and are excluded, matching the grouping semantics the
/// reporting layer has always had.
pub fn group_stats(rows: &[ComparisonRow]) -> Vec<GroupStat> {
    let mut groups: HashMap<(String, Condition, u64), Vec<f64>> = HashMap::new();

    for row in rows {
        let Some(alpha) = row.alpha else { continue };
        groups
            .entry((row.model.clone(), row.condition, alpha.to_bits()))
            .or_default()
            .push(row.overall_rmse);
    }

    let mut stats: Vec<GroupStat> = groups
        .into_iter()
        .map(|((model, condition, alpha_bits), values)| {
            let usable = finite(values);
            let (mean, std) = mean_std_sample(&usable);
            GroupStat {
                model,
                condition,
                alpha: Some(f64::from_bits(alpha_bits)),
                mean,
                std,
                count: usable.len(),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        a.model
            .cmp(&b.model)
            .then_with(|| a.condition.cmp(&b.condition))
            .then_with(|| cmp_opt_f64(a.alpha, b.alpha))
    });

    stats
}

/// Render grouped statistics as an aligned terminal table, three decimal
/// places like the reporting layer prints.
pub fn render_group_stats(stats: &[GroupStat], metric_label: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Mean & std of {metric_label} by (model, condition, alpha):\n"
    ));
    out.push_str(&format!(
        "{:<10} {:<10} {:>8} {:>12} {:>12} {:>7}\n",
        "model", "condition", "alpha", "mean", "std", "count"
    ));
    for stat in stats {
        out.push_str(&format!(
            "{:<10} {:<10} {:>8} {:>12} {:>12} {:>7}\n",
            stat.model,
            stat.condition,
            fmt_alpha(stat.alpha),
            round3(stat.mean),
            round3(stat.std),
            stat.count
        ));
    }
    out
}

/// Persist grouped statistics as CSV (same missing-value convention as
/// the summary tables).
pub fn write_group_stats(path: &Path, stats: &[GroupStat]) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer.write_record(["model", "condition", "alpha", "mean", "std", "count"])?;
    for stat in stats {
        writer.write_record([
            stat.model.clone(),
            stat.condition.to_string(),
            fmt_opt_f64(stat.alpha),
            fmt_f64(stat.mean),
            fmt_f64(stat.std),
            stat.count.to_string(),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn round3(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.3}")
    } else {
        "NaN".to_string()
    }
}

fn fmt_alpha(alpha: Option<f64>) -> String {
    match alpha {
        Some(a) if a.is_finite() && a.fract() == 0.0 => format!("{}", a as i64),
        Some(a) => format!("{a}"),
        None => "-".to_string(),
    }
}
