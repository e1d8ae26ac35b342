//! Loading summary tables for cross-model comparison.
//!
//! The comparison layer speaks one metric: an overall RMSE per row.
//! Pair-level tables carry `overall_mse` (metric = its square root);
//! graph-level tables prefer `rmse_mean` when it has any finite value and
//! fall back to `sqrt(mse_mean)`. A table offering neither is skipped
//! with a warning - the remaining tables still produce a comparison.

use std::path::{Path, PathBuf};

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::table::{Header, coerce_f64, parse_opt_f64};
use crate::types::Condition;

/// Which aggregation strategy produced a summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Graph,
    Pair,
}

impl SummaryKind {
    /// Label of the metric the comparison reports for this kind.
    pub fn metric_label(self) -> &'static str {
        match self {
            SummaryKind::Graph => "RMSE (mean over graphs)",
            SummaryKind::Pair => "overall RMSE",
        }
    }
}

/// One row of the combined comparison table: a summary row tagged with
/// its model, reduced to the comparison metric.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub model: String,
    pub condition: Condition,
    pub alpha: Option<f64>,
    pub overall_rmse: f64,
}

/// Load and combine summary tables, tagging each row with its model.
///
/// Missing files and tables without a usable error column are warnings,
/// not errors; an empty combined result is the caller's terminal
/// condition to report.
pub fn load_summaries(
    kind: SummaryKind,
    sources: &[(String, PathBuf)],
) -> Result<Vec<ComparisonRow>> {
    let mut combined = Vec::new();

    for (model, path) in sources {
        if !path.exists() {
            eprintln!(
                "{} '{}' file not found: {}",
                "warning:".yellow().bold(),
                model,
                path.display()
            );
            continue;
        }

        match load_one(kind, model, path) {
            Ok(mut rows) => combined.append(&mut rows),
            Err(reason) => {
                eprintln!(
                    "{} skip '{}': {}",
                    "warning:".yellow().bold(),
                    model,
                    reason
                );
            }
        }
    }

    Ok(combined)
}

/// Load one table, or explain (as a string) why it is unusable.
fn load_one(kind: SummaryKind, model: &str, path: &Path) -> Result<Vec<ComparisonRow>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .from_path(path)
        .map_err(|err| err.to_string())?;
    let header = Header::from_reader(&mut reader).map_err(|err| err.to_string())?;

    if !header.has_column("condition") {
        return Err("no condition column".into());
    }

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record.map_err(|err| err.to_string())?);
    }

    let metrics = extract_metric(kind, &header, &records)?;

    let rows = records
        .iter()
        .zip(metrics)
        .filter_map(|(record, metric)| {
            // Rows without a parseable condition cannot join any
            // comparison group; they are dropped, not fatal.
            let condition = header.field(record, "condition").and_then(Condition::parse)?;
            Some(ComparisonRow {
                model: model.to_string(),
                condition,
                alpha: parse_opt_f64(header.field(record, "alpha")),
                overall_rmse: metric,
            })
        })
        .collect();

    Ok(rows)
}

/// Per-record comparison metric, or why none is available.
fn extract_metric(
    kind: SummaryKind,
    header: &Header,
    records: &[csv::StringRecord],
) -> Result<Vec<f64>, String> {
    let column = |name: &str| -> Option<Vec<f64>> {
        if !header.has_column(name) {
            return None;
        }
        let values: Vec<f64> = records
            .iter()
            .map(|r| coerce_f64(header.field(r, name)))
            .collect();
        values.iter().any(|v| v.is_finite()).then_some(values)
    };

    match kind {
        SummaryKind::Pair => {
            if !header.has_column("overall_mse") {
                return Err("overall_mse not found".into());
            }
            Ok(records
                .iter()
                .map(|r| coerce_f64(header.field(r, "overall_mse")).sqrt())
                .collect())
        }
        SummaryKind::Graph => {
            if let Some(values) = column("rmse_mean") {
                Ok(values)
            } else if let Some(values) = column("mse_mean") {
                Ok(values.into_iter().map(f64::sqrt).collect())
            } else {
                Err("neither rmse_mean nor mse_mean found".into())
            }
        }
    }
}
