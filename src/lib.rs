//! runsum - experiment result aggregation & cross-condition normalization
//!
//! Turns many per-run result artifacts, scattered across a directory
//! tree, into deduplicated, correctly-weighted statistical summaries that
//! stay comparable across experimental conditions which do not share the
//! same parameter axes.
//!
//! # Architecture
//!
//! ```text
//! Discovery → Parsing → Aggregation → Normalization → Summary CSV
//!     ↓          ↓       {graph|pair}       ↓              ↓
//!  ignore    serde_json   per-artifact   dedup+sort       csv
//!  crate                  statistics     (shared)        crate
//!
//! Summary CSVs → Comparison loader → Alpha broadcast → Grouped stats
//! ```
//!
//! # Design invariants
//!
//! - Partial failure never aborts a batch: malformed artifacts are
//!   structured skips in a `BatchReport`, not errors.
//! - Undefined statistics are NaN sentinels, never errors; the CSV layer
//!   writes them as empty fields.
//! - Re-running over the same artifact set reproduces an identical
//!   table: discovery is sorted, dedup is last-write-wins on the full
//!   metadata key, and the final sort is stable.

pub mod aggregate;
pub mod artifact;
pub mod compare;
pub mod config;
pub mod discovery;
pub mod table;
pub mod types;

// Re-export the core vocabulary
pub use types::{
    Condition, GraphSummaryRow, KeyedRow, MetadataKey, PairSummaryRow, PerTargetMeasurement,
    ResultArtifact,
};

pub use aggregate::{GraphAggregation, PairAggregation, aggregate_graph_results,
    aggregate_pair_results};
pub use artifact::{ArtifactSkip, BatchReport, SkipReason};
pub use compare::{ComparisonRow, GroupStat, SummaryKind, run_comparison};
pub use config::{BatchConfig, ModelSpec};
