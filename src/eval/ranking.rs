//! Next-item ranking metrics
//!
//! A user vector is the sum of the input vectors of the user's context
//! items. Every non-padding item is scored by the dot product of that vector
//! with the item's output vector, and the held-out target's rank among those
//! scores drives both metrics. Ties count in the target's favour: rank is one
//! plus the number of items scoring strictly higher.

use crate::data::EvalCase;
use crate::embedding::{Bundler, Item2Vec};
use crate::error::{Error, Result};
use ndarray::{Array1, ArrayView2};
use std::fmt;

/// Hit ratio and MRR at a cutoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingReport {
    /// Cutoff
    pub k: usize,
    /// Share of cases whose target ranks within `k`
    pub hit_ratio: f64,
    /// Mean of `1 / rank` over cases, 0 when the rank exceeds `k`
    pub mrr: f64,
    /// Number of cases scored
    pub cases: usize,
}

impl RankingReport {
    /// Metric name for the hit ratio, e.g. `hit_ratio_10`
    pub fn hit_ratio_tag(&self) -> String {
        format!("hit_ratio_{}", self.k)
    }

    /// Metric name for MRR, e.g. `mrr_10`
    pub fn mrr_tag(&self) -> String {
        format!("mrr_{}", self.k)
    }
}

impl fmt::Display for RankingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HR@{k}={:.4} MRR@{k}={:.4} over {} cases", self.hit_ratio, self.mrr, self.cases, k = self.k)
    }
}

/// Score `cases` against `model` and report HR@k and MRR@k
pub fn evaluate_ranking(model: &Item2Vec, cases: &[EvalCase], k: usize) -> Result<RankingReport> {
    if k == 0 {
        return Err(Error::InvalidParameter("k must be > 0".into()));
    }
    if cases.is_empty() {
        return Err(Error::InvalidParameter("no evaluation cases".into()));
    }

    let ranks = target_ranks(model, cases)?;
    let n = ranks.len() as f64;
    let hits = ranks.iter().filter(|&&r| r <= k).count() as f64;
    let reciprocal: f64 = ranks.iter().filter(|&&r| r <= k).map(|&r| 1.0 / r as f64).sum();

    Ok(RankingReport { k, hit_ratio: hits / n, mrr: reciprocal / n, cases: ranks.len() })
}

/// HR@k: share of cases whose target ranks within the top `k`
pub fn hit_ratio_at_k(model: &Item2Vec, cases: &[EvalCase], k: usize) -> Result<f64> {
    evaluate_ranking(model, cases, k).map(|r| r.hit_ratio)
}

/// MRR@k: mean reciprocal rank, truncated at `k`
pub fn mrr_at_k(model: &Item2Vec, cases: &[EvalCase], k: usize) -> Result<f64> {
    evaluate_ranking(model, cases, k).map(|r| r.mrr)
}

/// 1-based rank of each case's target
fn target_ranks(model: &Item2Vec, cases: &[EvalCase]) -> Result<Vec<usize>> {
    let v = model.vocab_size();
    let e = model.embedding_size();
    let pad = model.pad_idx();
    let ivectors = table_view(model.ivectors().data(), v, e)?;
    let ovectors = table_view(model.ovectors().data(), v, e)?;

    cases
        .iter()
        .map(|case| {
            for &idx in case.context.iter().chain(std::iter::once(&case.target)) {
                if idx >= v {
                    return Err(Error::IndexOutOfRange { index: idx, vocab_size: v });
                }
            }

            let mut user = Array1::<f32>::zeros(e);
            for &idx in case.context.iter().filter(|&&i| i != pad) {
                user += &ivectors.row(idx);
            }

            let scores = ovectors.dot(&user);
            let target_score = scores[case.target];
            let higher = scores
                .iter()
                .enumerate()
                .filter(|&(i, &s)| i != pad && s > target_score)
                .count();
            Ok(higher + 1)
        })
        .collect()
}

fn table_view(data: &Array1<f32>, v: usize, e: usize) -> Result<ArrayView2<'_, f32>> {
    data.view()
        .into_shape_with_order((v, e))
        .map_err(|err| Error::ShapeMismatch(format!("embedding table is not [{v}, {e}]: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Item2VecConfig;
    use approx::assert_abs_diff_eq;

    /// Item i's output vector is [i, 0]; input vectors are all [1, 0]
    fn model() -> Item2Vec {
        let config = Item2VecConfig::new(5, 2);
        let iv = vec![0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let ov = vec![0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 4.0, 0.0];
        Item2Vec::from_tables(config, iv, ov).unwrap()
    }

    fn case(context: Vec<usize>, target: usize) -> EvalCase {
        EvalCase { context, target }
    }

    #[test]
    fn test_ranks_follow_output_scores() {
        let m = model();
        let ranks = target_ranks(&m, &[case(vec![1], 4), case(vec![1], 1), case(vec![2, 3], 3)]).unwrap();
        assert_eq!(ranks, vec![1, 4, 2]);
    }

    #[test]
    fn test_hit_ratio_and_mrr() {
        let m = model();
        let cases = [case(vec![1], 4), case(vec![1], 1), case(vec![2], 3)];
        let report = evaluate_ranking(&m, &cases, 2).unwrap();
        assert_abs_diff_eq!(report.hit_ratio, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.mrr, (1.0 + 0.5) / 3.0, epsilon = 1e-12);
        assert_eq!(report.cases, 3);
        assert_eq!(report.hit_ratio_tag(), "hit_ratio_2");
        assert_eq!(report.mrr_tag(), "mrr_2");

        assert_abs_diff_eq!(hit_ratio_at_k(&m, &cases, 4).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_padding_context_is_ignored() {
        let m = model();
        let with_pad = target_ranks(&m, &[case(vec![0, 0, 1], 2)]).unwrap();
        let without = target_ranks(&m, &[case(vec![1], 2)]).unwrap();
        assert_eq!(with_pad, without);
    }

    #[test]
    fn test_all_padding_context_ties_everything() {
        let m = model();
        // zero user vector: every score ties, so every target ranks first
        assert_abs_diff_eq!(mrr_at_k(&m, &[case(vec![0], 2)], 1).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_inputs() {
        let m = model();
        assert!(evaluate_ranking(&m, &[case(vec![1], 2)], 0).is_err());
        assert!(evaluate_ranking(&m, &[], 3).is_err());
        let err = evaluate_ranking(&m, &[case(vec![9], 2)], 3).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 9, vocab_size: 5 }));
    }
}
