//! Core types for runsum - the experiment result summarizer.
//!
//! The central contract is the `MetadataKey`: the ordered tuple of
//! experiment parameters that identifies one run configuration. Two
//! artifacts with an identical key are re-runs of the same configuration,
//! and the later one (in processing order) wins.
//!
//! Key design decisions:
//! - Every parameter except `condition` is nullable; artifacts routinely
//!   omit hyperparameters that don't apply to their model.
//! - Undefined statistics are `f64::NAN`, never an error. Downstream code
//!   filters non-finite values instead of branching on `Option`.
//! - Float key fields take part in deduplication by exact bit pattern;
//!   re-runs of one configuration carry the same literal values.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Source-selection strategy of a run.
///
/// `Topk`/`Bottomk` are parameterized by alpha; `All`/`Random` are not,
/// so their rows appear once per seed instead of once per (alpha, seed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    All,
    Topk,
    Bottomk,
    Random,
}

impl Condition {
    /// Wire name as it appears in artifact metadata and summary tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::All => "all",
            Condition::Topk => "topk",
            Condition::Bottomk => "bottomk",
            Condition::Random => "random",
        }
    }

    /// Parse a wire name. Unknown names yield `None` (caller decides how
    /// to report).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Condition::All),
            "topk" => Some(Condition::Topk),
            "bottomk" => Some(Condition::Bottomk),
            "random" => Some(Condition::Random),
            _ => None,
        }
    }

    /// Whether alpha has any effect under this condition.
    pub fn is_alpha_dependent(self) -> bool {
        matches!(self, Condition::Topk | Condition::Bottomk)
    }
}

// Summary tables sort lexicographically on the wire name
// (all < bottomk < random < topk), not on declaration order.
impl Ord for Condition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Condition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered tuple of experiment parameters identifying a unique run
/// configuration.
///
/// Invariant: for `All`/`Random` conditions, `alpha` is normalized to
/// `None` regardless of what the raw artifact declares - alpha has no
/// effect under those conditions. The normalizer enforces this so both
/// aggregation strategies share identical semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataKey {
    pub condition: Condition,
    pub alpha: Option<f64>,
    pub seed: Option<i64>,
    pub top_k: Option<i64>,
    pub bottom_k: Option<i64>,
    pub max_samples: Option<i64>,
    pub epochs: Option<i64>,
    pub batch_size: Option<i64>,
    pub lr: Option<f64>,
}

impl MetadataKey {
    /// A key with every nullable parameter unset.
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            alpha: None,
            seed: None,
            top_k: None,
            bottom_k: None,
            max_samples: None,
            epochs: None,
            batch_size: None,
            lr: None,
        }
    }

    /// Null out alpha for alpha-independent conditions.
    pub fn normalize_alpha(&mut self) {
        if !self.condition.is_alpha_dependent() {
            self.alpha = None;
        }
    }

    /// Hashable form of the key for last-write-wins deduplication.
    ///
    /// Float fields are compared by bit pattern: no epsilon, and distinct
    /// NaN payloads stay distinct. Identical re-runs serialize identical
    /// literals, which is the only equality the dedup contract needs.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            condition: self.condition,
            alpha: self.alpha.map(f64::to_bits),
            seed: self.seed,
            top_k: self.top_k,
            bottom_k: self.bottom_k,
            max_samples: self.max_samples,
            epochs: self.epochs,
            batch_size: self.batch_size,
            lr: self.lr.map(f64::to_bits),
        }
    }
}

/// Bit-exact hashable projection of a `MetadataKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey {
    condition: Condition,
    alpha: Option<u64>,
    seed: Option<i64>,
    top_k: Option<i64>,
    bottom_k: Option<i64>,
    max_samples: Option<i64>,
    epochs: Option<i64>,
    batch_size: Option<i64>,
    lr: Option<u64>,
}

/// Order two optional reals with missing values first.
///
/// This is the documented sort rule for missing alpha: `None` orders
/// before every real value, and the `Some` side uses `total_cmp`. Applied
/// consistently by the normalizer, the broadcaster and grouped statistics.
pub fn cmp_opt_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.total_cmp(&y),
    }
}

/// Summary table ordering: `(condition, alpha, seed)` ascending.
pub fn summary_order(a: &MetadataKey, b: &MetadataKey) -> Ordering {
    a.condition
        .cmp(&b.condition)
        .then_with(|| cmp_opt_f64(a.alpha, b.alpha))
        .then_with(|| a.seed.cmp(&b.seed))
}

/// One observation within an artifact.
///
/// `mse` may be absent; absent maps to a NaN sentinel and is filtered by
/// the finite-value pass. `test_samples` is only consulted by pair-level
/// weighting. Unknown fields in the document are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerTargetMeasurement {
    #[serde(default)]
    pub mse: Option<f64>,
    #[serde(default)]
    pub test_samples: Option<f64>,
}

/// A parsed result artifact: one run's metadata plus its ordered
/// per-target measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultArtifact {
    pub key: MetadataKey,
    pub measurements: Vec<PerTargetMeasurement>,
}

/// Graph-level summary: unweighted statistics over one artifact's
/// per-target mse/rmse populations. One row per valid artifact, even when
/// every statistic is NaN - broken runs stay visible.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSummaryRow {
    pub key: MetadataKey,
    pub mse_mean: f64,
    pub mse_std: f64,
    pub rmse_mean: f64,
    pub rmse_std: f64,
    pub n_targets_used: usize,
}

/// Pair-level summary: sample-count-weighted overall mse for one
/// artifact. NaN when no measurement carried a positive sample count.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSummaryRow {
    pub key: MetadataKey,
    pub overall_mse: f64,
}

/// Access to the metadata key of a summary row.
///
/// Both aggregation strategies produce keyed rows; the normalizer is
/// generic over this trait so alpha nulling, deduplication and sorting
/// are implemented exactly once.
pub trait KeyedRow {
    fn key(&self) -> &MetadataKey;
    fn key_mut(&mut self) -> &mut MetadataKey;
}

impl KeyedRow for GraphSummaryRow {
    fn key(&self) -> &MetadataKey {
        &self.key
    }
    fn key_mut(&mut self) -> &mut MetadataKey {
        &mut self.key
    }
}

impl KeyedRow for PairSummaryRow {
    fn key(&self) -> &MetadataKey {
        &self.key
    }
    fn key_mut(&mut self) -> &mut MetadataKey {
        &mut self.key
    }
}
