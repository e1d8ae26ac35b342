//! Row normalization: the shared tail of both aggregation strategies.
//!
//! Centralizing these rules here is deliberate - condition-dependent
//! alpha nulling and last-write-wins deduplication are easy to implement
//! inconsistently across two aggregators, and a summary table is only
//! comparable if both strategies normalized identically.
//!
//! The steps, in order:
//! 1. Alpha nulling: `All`/`Random` rows get `alpha = None` regardless of
//!    what the artifact declared.
//! 2. Deduplication on the full `MetadataKey`, keeping the last
//!    occurrence in processing order. The survivor keeps its later
//!    position, so re-runs overwrite stale results in place.
//! 3. Stable sort by `(condition, alpha, seed)`, missing alpha first
//!    (see `cmp_opt_f64`). Ties keep processing order.
//! 4. The resulting `Vec` order is the dense 0-based row ordering.
//!
//! The whole pass is idempotent: normalizing an already-normalized table
//! is a no-op.

use std::collections::HashMap;

use crate::types::{DedupKey, KeyedRow, summary_order};

/// Normalize a full set of emitted rows for one model.
pub fn normalize_rows<R: KeyedRow>(mut rows: Vec<R>) -> Vec<R> {
    for row in &mut rows {
        row.key_mut().normalize_alpha();
    }

    let mut rows = dedup_last_wins(rows);
    rows.sort_by(|a, b| summary_order(a.key(), b.key()));
    rows
}

/// Drop all but the last occurrence of each key, keeping the survivor at
/// its later position.
fn dedup_last_wins<R: KeyedRow>(rows: Vec<R>) -> Vec<R> {
    let mut slots: Vec<Option<R>> = Vec::with_capacity(rows.len());
    let mut seen: HashMap<DedupKey, usize> = HashMap::with_capacity(rows.len());

    for row in rows {
        let key = row.key().dedup_key();
        if let Some(&previous) = seen.get(&key) {
            slots[previous] = None;
        }
        seen.insert(key, slots.len());
        slots.push(Some(row));
    }

    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Condition, GraphSummaryRow, MetadataKey};

    fn row(condition: Condition, alpha: Option<f64>, seed: i64, mse_mean: f64) -> GraphSummaryRow {
        let mut key = MetadataKey::new(condition);
        key.alpha = alpha;
        key.seed = Some(seed);
        // Finite stds so whole-row equality checks stay meaningful
        // (NaN != NaN under PartialEq).
        GraphSummaryRow {
            key,
            mse_mean,
            mse_std: 0.5,
            rmse_mean: mse_mean.sqrt(),
            rmse_std: 0.25,
            n_targets_used: 1,
        }
    }

    #[test]
    fn test_alpha_nulled_for_independent_conditions() {
        let rows = normalize_rows(vec![
            row(Condition::Random, Some(50.0), 1, 1.0),
            row(Condition::All, Some(100.0), 1, 2.0),
            row(Condition::Topk, Some(50.0), 1, 3.0),
        ]);
        for r in &rows {
            if !r.key.condition.is_alpha_dependent() {
                assert_eq!(r.key.alpha, None);
            }
        }
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_last_write_wins() {
        // Two artifacts sharing {condition: all, seed: 2}; the later one
        // must be the only survivor.
        let rows = normalize_rows(vec![
            row(Condition::All, None, 2, 1.0),
            row(Condition::Topk, Some(50.0), 1, 7.0),
            row(Condition::All, None, 2, 99.0),
        ]);
        let survivors: Vec<_> = rows
            .iter()
            .filter(|r| r.key.condition == Condition::All)
            .collect();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].mse_mean, 99.0);
    }

    #[test]
    fn test_dedup_happens_after_alpha_nulling() {
        // Same (all, seed 2) configuration declared with two different raw
        // alphas: nulling makes them collide, last one wins.
        let rows = normalize_rows(vec![
            row(Condition::All, Some(50.0), 2, 1.0),
            row(Condition::All, Some(100.0), 2, 2.0),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mse_mean, 2.0);
    }

    #[test]
    fn test_sort_order() {
        let rows = normalize_rows(vec![
            row(Condition::Topk, Some(100.0), 1, 0.0),
            row(Condition::Topk, Some(50.0), 2, 0.0),
            row(Condition::Topk, Some(50.0), 1, 0.0),
            row(Condition::All, None, 1, 0.0),
            row(Condition::Bottomk, Some(50.0), 1, 0.0),
            row(Condition::Random, None, 1, 0.0),
        ]);
        let order: Vec<_> = rows
            .iter()
            .map(|r| (r.key.condition, r.key.alpha, r.key.seed))
            .collect();
        assert_eq!(
            order,
            vec![
                (Condition::All, None, Some(1)),
                (Condition::Bottomk, Some(50.0), Some(1)),
                (Condition::Random, None, Some(1)),
                (Condition::Topk, Some(50.0), Some(1)),
                (Condition::Topk, Some(50.0), Some(2)),
                (Condition::Topk, Some(100.0), Some(1)),
            ]
        );
    }

    #[test]
    fn test_missing_alpha_sorts_before_real_alphas() {
        // A topk row without alpha should lead the topk block.
        let rows = normalize_rows(vec![
            row(Condition::Topk, Some(50.0), 1, 0.0),
            row(Condition::Topk, None, 1, 0.0),
        ]);
        assert_eq!(rows[0].key.alpha, None);
        assert_eq!(rows[1].key.alpha, Some(50.0));
    }

    #[test]
    fn test_idempotent() {
        let rows = normalize_rows(vec![
            row(Condition::All, Some(50.0), 2, 1.0),
            row(Condition::Topk, Some(100.0), 1, 2.0),
            row(Condition::All, None, 2, 3.0),
            row(Condition::Topk, Some(50.0), 1, 4.0),
        ]);
        let again = normalize_rows(rows.clone());
        assert_eq!(rows, again);
    }
}
