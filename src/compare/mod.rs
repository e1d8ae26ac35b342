//! Cross-model comparison: load, broadcast, group.
//!
//! ```text
//! Summary CSVs → model-tagged rows → alpha broadcast → grouped stats
//! ```
//!
//! The comparison step consumes tables the aggregation pipelines wrote
//! (possibly across several runs and models) and produces one grouped
//! statistics table keyed by `(model, condition, alpha)`.

pub mod broadcast;
pub mod group;
pub mod load;

pub use broadcast::{AlphaBroadcast, broadcast_alpha};
pub use group::{GroupStat, group_stats, render_group_stats, write_group_stats};
pub use load::{ComparisonRow, SummaryKind, load_summaries};

use std::path::{Path, PathBuf};

use anyhow::Result;
use owo_colors::OwoColorize;

/// Run the full comparison over a set of summary tables.
///
/// Returns `None` when no usable table could be loaded - reported, but
/// not an error, so a batch caller can move on.
pub fn run_comparison(
    kind: SummaryKind,
    sources: &[(String, PathBuf)],
    output: Option<&Path>,
) -> Result<Option<Vec<GroupStat>>> {
    let rows = load_summaries(kind, sources)?;
    if rows.is_empty() {
        eprintln!(
            "{} no usable summary tables loaded, nothing to compare",
            "error:".red().bold()
        );
        return Ok(None);
    }

    let AlphaBroadcast { rows, alphas } = broadcast_alpha(rows);
    println!(
        "{} {} rows across alpha axis {:?}",
        "→".cyan().bold(),
        rows.len(),
        alphas
    );

    let stats = group_stats(&rows);
    println!();
    print!("{}", render_group_stats(&stats, kind.metric_label()));

    if let Some(path) = output {
        write_group_stats(path, &stats)?;
        println!("\n  {} {}", "saved".green().bold(), path.display());
    }

    Ok(Some(stats))
}
