//! Per-batch processing report.
//!
//! The skip-and-warn behavior of the pipeline is reified into a value so
//! tests and callers can inspect exactly what happened to a root without
//! scraping terminal output. Printing stays available for interactive
//! use, but the report is the source of truth.

use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;

use super::parser::ArtifactSkip;

/// What happened while aggregating one input root.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// The input root this report covers.
    pub root: PathBuf,
    /// Artifacts discovered under the root.
    pub scanned: usize,
    /// Rows in the final normalized table.
    pub emitted: usize,
    /// Rows dropped by last-write-wins deduplication.
    pub duplicates_dropped: usize,
    /// True when discovery found no artifacts at all.
    pub discovery_empty: bool,
    /// Every artifact that produced zero rows, and why.
    pub skips: Vec<ArtifactSkip>,
}

impl BatchReport {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Default::default()
        }
    }

    /// Artifacts were found but none survived to a row. Distinct from
    /// `discovery_empty`: an empty root is a discovery problem, an empty
    /// table from a populated root is a data problem.
    pub fn is_empty_aggregation(&self) -> bool {
        !self.discovery_empty && self.emitted == 0
    }

    /// Record a skipped artifact and warn, matching the interactive
    /// contract: one warning line per skipped file, processing continues.
    pub fn record_skip(&mut self, skip: ArtifactSkip) {
        eprintln!(
            "{} {}: {}. Skipping.",
            "warning:".yellow().bold(),
            skip.path.display(),
            skip.reason
        );
        self.skips.push(skip);
    }

    /// One-line outcome summary for the end of a root's processing.
    pub fn summary_line(&self) -> String {
        format!(
            "{} artifacts scanned, {} rows emitted, {} skipped, {} duplicates dropped",
            self.scanned,
            self.emitted,
            self.skips.len(),
            self.duplicates_dropped
        )
    }
}
