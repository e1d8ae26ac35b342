//! Per-model aggregation pipelines.
//!
//! ```text
//! Discovery → Parsing → {Graph | Pair} Aggregation → Normalization → CSV
//!     ↓           ↓             ↓                        ↓            ↓
//!  ignore     serde_json   per-artifact row       dedup + sort     csv
//!  crate                   construction           (shared)        crate
//! ```
//!
//! Both pipelines share the same skeleton and the same normalization
//! tail; they differ only in the per-artifact row constructor and in how
//! strictly they treat artifacts without usable measurements.
//!
//! Failure policy (see `BatchReport`):
//! - empty discovery: reported, no output file, batch continues
//! - malformed artifact: warned + recorded, processing continues
//! - zero rows after aggregation: reported, no output file written
//!   (distinct from writing a zero-row file)
//! - output write failure: the only fatal error

pub mod graph;
pub mod normalize;
pub mod pair;
pub mod stats;

pub use graph::graph_summary_row;
pub use normalize::normalize_rows;
pub use pair::pair_summary_row;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::artifact::{BatchReport, load_artifact};
use crate::discovery::find_result_files;
use crate::table::{write_graph_summary, write_pair_summary};
use crate::types::{GraphSummaryRow, KeyedRow, PairSummaryRow, ResultArtifact};

/// Outcome of one graph-level aggregation run.
#[derive(Debug)]
pub struct GraphAggregation {
    pub rows: Vec<GraphSummaryRow>,
    pub report: BatchReport,
}

/// Outcome of one pair-level aggregation run.
#[derive(Debug)]
pub struct PairAggregation {
    pub rows: Vec<PairSummaryRow>,
    pub report: BatchReport,
}

/// Aggregate one model's artifacts into a graph-level summary table.
pub fn aggregate_graph_results(
    model: &str,
    input_root: &Path,
    output_csv: &Path,
) -> Result<GraphAggregation> {
    println!(
        "{} graph-level aggregation for {} from '{}'",
        "→".cyan().bold(),
        model.to_uppercase().bold(),
        input_root.display()
    );

    let (rows, report) = run_pipeline(input_root, |artifact| Some(graph_summary_row(artifact)))?;

    if !rows.is_empty() {
        write_graph_summary(output_csv, &rows)
            .with_context(|| format!("Failed to write summary to {}", output_csv.display()))?;
        println!(
            "  {} {} ({})",
            "saved".green().bold(),
            output_csv.display(),
            report.summary_line()
        );
    }

    Ok(GraphAggregation { rows, report })
}

/// Aggregate one model's artifacts into a pair-level summary table.
pub fn aggregate_pair_results(
    model: &str,
    input_root: &Path,
    output_csv: &Path,
) -> Result<PairAggregation> {
    println!(
        "{} pair-level aggregation for {} from '{}'",
        "→".cyan().bold(),
        model.to_uppercase().bold(),
        input_root.display()
    );

    let (rows, report) = run_pipeline(input_root, pair_summary_row)?;

    if !rows.is_empty() {
        write_pair_summary(output_csv, &rows)
            .with_context(|| format!("Failed to write summary to {}", output_csv.display()))?;
        println!(
            "  {} {} ({})",
            "saved".green().bold(),
            output_csv.display(),
            report.summary_line()
        );
    }

    Ok(PairAggregation { rows, report })
}

/// Locate, parse, aggregate and normalize. The returned rows are empty
/// when discovery found nothing or no artifact survived; the report says
/// which.
fn run_pipeline<R, F>(input_root: &Path, per_artifact: F) -> Result<(Vec<R>, BatchReport)>
where
    R: KeyedRow,
    F: Fn(&ResultArtifact) -> Option<R>,
{
    let files = find_result_files(input_root)?;

    let mut report = BatchReport::new(input_root);
    report.scanned = files.len();

    if files.is_empty() {
        report.discovery_empty = true;
        eprintln!(
            "{} no result artifacts found under '{}'",
            "warning:".yellow().bold(),
            input_root.display()
        );
        return Ok((Vec::new(), report));
    }

    let rows = collect_rows(&files, &mut report, per_artifact);

    let before = rows.len();
    let rows = normalize_rows(rows);
    report.duplicates_dropped = before - rows.len();
    report.emitted = rows.len();

    if report.is_empty_aggregation() {
        eprintln!(
            "{} no rows could be aggregated from '{}'",
            "warning:".yellow().bold(),
            input_root.display()
        );
    }

    Ok((rows, report))
}

fn collect_rows<R, F>(files: &[PathBuf], report: &mut BatchReport, per_artifact: F) -> Vec<R>
where
    F: Fn(&ResultArtifact) -> Option<R>,
{
    let mut rows = Vec::with_capacity(files.len());
    for path in files {
        match load_artifact(path) {
            Ok(artifact) => {
                if let Some(row) = per_artifact(&artifact) {
                    rows.push(row);
                }
            }
            Err(skip) => report.record_skip(skip),
        }
    }
    rows
}
