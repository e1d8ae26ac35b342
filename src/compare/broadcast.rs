//! Alpha broadcasting: making alpha-independent rows comparable.
//!
//! `topk`/`bottomk` runs exist once per (alpha, seed); `random`/`all`
//! runs only once per seed. To compare all four conditions at a fixed
//! alpha, every alpha-independent row is replicated at each alpha value
//! observed among alpha-dependent rows. The generated copies exist only
//! inside the comparison step and are never persisted as primary output.

use super::load::ComparisonRow;

/// The combined comparison table plus the alpha axis it spans.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaBroadcast {
    pub rows: Vec<ComparisonRow>,
    pub alphas: Vec<f64>,
}

/// Broadcast alpha-independent rows across the observed alpha axis.
///
/// The alpha set is taken from alpha-dependent rows across all models;
/// when they declare none it falls back to alphas observed anywhere, and
/// when no alpha exists in the data at all, a sentinel alpha of 0.0 is
/// assigned to every row so a single comparison group still forms.
pub fn broadcast_alpha(rows: Vec<ComparisonRow>) -> AlphaBroadcast {
    let (dependent, independent): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|row| row.condition.is_alpha_dependent());

    let mut alphas = distinct_alphas(dependent.iter());
    if alphas.is_empty() {
        alphas = distinct_alphas(dependent.iter().chain(independent.iter()));
    }

    if !alphas.is_empty() && !independent.is_empty() {
        let mut rows = dependent;
        for &alpha in &alphas {
            for row in &independent {
                let mut copy = row.clone();
                copy.alpha = Some(alpha);
                rows.push(copy);
            }
        }
        AlphaBroadcast { rows, alphas }
    } else if alphas.is_empty() {
        // No alpha anywhere: one synthetic group.
        let mut rows: Vec<_> = dependent.into_iter().chain(independent).collect();
        for row in &mut rows {
            row.alpha = Some(0.0);
        }
        AlphaBroadcast {
            rows,
            alphas: vec![0.0],
        }
    } else {
        // Alphas exist but there is nothing to replicate.
        let rows = dependent.into_iter().chain(independent).collect();
        AlphaBroadcast { rows, alphas }
    }
}

/// Sorted distinct finite alpha values of the given rows.
fn distinct_alphas<'a>(rows: impl Iterator<Item = &'a ComparisonRow>) -> Vec<f64> {
    let mut alphas: Vec<f64> = rows
        .filter_map(|row| row.alpha)
        .filter(|alpha| alpha.is_finite())
        .collect();
    alphas.sort_by(|a, b| a.total_cmp(b));
    alphas.dedup_by(|a, b| a.to_bits() == b.to_bits());
    alphas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Condition, cmp_opt_f64};

    fn row(model: &str, condition: Condition, alpha: Option<f64>) -> ComparisonRow {
        ComparisonRow {
            model: model.to_string(),
            condition,
            alpha,
            overall_rmse: 1.0,
        }
    }

    #[test]
    fn test_row_count_k_times_m() {
        // 2 alpha-independent rows, 3 distinct alpha-dependent alphas:
        // 2*3 generated rows plus the 4 dependent originals.
        let rows = vec![
            row("SVR", Condition::Topk, Some(50.0)),
            row("SVR", Condition::Topk, Some(100.0)),
            row("SVR", Condition::Bottomk, Some(200.0)),
            row("SVR", Condition::Bottomk, Some(50.0)),
            row("SVR", Condition::All, None),
            row("SVR", Condition::Random, None),
        ];

        let broadcast = broadcast_alpha(rows);
        assert_eq!(broadcast.alphas, vec![50.0, 100.0, 200.0]);
        assert_eq!(broadcast.rows.len(), 4 + 2 * 3);

        let generated: Vec<_> = broadcast
            .rows
            .iter()
            .filter(|r| !r.condition.is_alpha_dependent())
            .collect();
        assert_eq!(generated.len(), 6);
        assert!(generated.iter().all(|r| r.alpha.is_some()));
    }

    #[test]
    fn test_dependent_rows_unchanged() {
        let rows = vec![
            row("SVR", Condition::Topk, Some(50.0)),
            row("SVR", Condition::All, None),
        ];
        let broadcast = broadcast_alpha(rows.clone());
        let dependent: Vec<_> = broadcast
            .rows
            .iter()
            .filter(|r| r.condition.is_alpha_dependent())
            .collect();
        assert_eq!(dependent.len(), 1);
        assert_eq!(*dependent[0], rows[0]);
    }

    #[test]
    fn test_alpha_axis_spans_all_models() {
        let rows = vec![
            row("SVR", Condition::Topk, Some(50.0)),
            row("RF", Condition::Topk, Some(100.0)),
            row("SVR", Condition::All, None),
        ];
        let broadcast = broadcast_alpha(rows);
        assert_eq!(broadcast.alphas, vec![50.0, 100.0]);
        // The SVR all-row is replicated at RF's alpha too.
        let all_alphas: Vec<_> = broadcast
            .rows
            .iter()
            .filter(|r| r.condition == Condition::All)
            .map(|r| r.alpha)
            .collect();
        assert_eq!(all_alphas, vec![Some(50.0), Some(100.0)]);
    }

    #[test]
    fn test_fallback_to_alphas_observed_anywhere() {
        // No alpha-dependent rows declare alpha, but an independent row
        // still carries one (denormalized input).
        let rows = vec![
            row("SVR", Condition::Topk, None),
            row("SVR", Condition::All, Some(25.0)),
        ];
        let broadcast = broadcast_alpha(rows);
        assert_eq!(broadcast.alphas, vec![25.0]);
        assert_eq!(broadcast.rows.len(), 2);
    }

    #[test]
    fn test_sentinel_alpha_when_none_exists() {
        let rows = vec![
            row("SVR", Condition::All, None),
            row("SVR", Condition::Random, None),
            row("SVR", Condition::Topk, None),
        ];
        let broadcast = broadcast_alpha(rows);
        assert_eq!(broadcast.alphas, vec![0.0]);
        assert_eq!(broadcast.rows.len(), 3);
        assert!(broadcast.rows.iter().all(|r| r.alpha == Some(0.0)));
    }

    #[test]
    fn test_no_independent_rows_pass_through() {
        let rows = vec![
            row("SVR", Condition::Topk, Some(50.0)),
            row("SVR", Condition::Bottomk, Some(100.0)),
        ];
        let broadcast = broadcast_alpha(rows.clone());
        assert_eq!(broadcast.rows, rows);
        assert_eq!(broadcast.alphas, vec![50.0, 100.0]);
    }

    #[test]
    fn test_empty_input() {
        let broadcast = broadcast_alpha(Vec::new());
        assert_eq!(broadcast.alphas, vec![0.0]);
        assert!(broadcast.rows.is_empty());
    }

    #[test]
    fn test_alphas_sorted() {
        let rows = vec![
            row("SVR", Condition::Topk, Some(200.0)),
            row("SVR", Condition::Topk, Some(50.0)),
            row("SVR", Condition::Topk, Some(100.0)),
        ];
        let broadcast = broadcast_alpha(rows);
        let mut sorted = broadcast.alphas.clone();
        sorted.sort_by(|a, b| cmp_opt_f64(Some(*a), Some(*b)));
        assert_eq!(broadcast.alphas, sorted);
    }
}
