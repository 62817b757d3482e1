// ============================================================
// Metrics — ROC AUC
// ============================================================
// Area under the ROC curve via the rank-sum (Mann-Whitney U)
// identity:
//
//   AUC = (R_pos - n_pos * (n_pos + 1) / 2) / (n_pos * n_neg)
//
// where R_pos is the sum of the (1-based) ranks of the positive
// examples when all scores are sorted ascending. Tied scores get
// the average of the ranks they span, so equal scores contribute
// 0.5 — matching the probabilistic definition
// P(score_pos > score_neg) + 0.5 * P(score_pos == score_neg).
//
// The binary task feeds RAW positive-class logits in here, not
// calibrated probabilities. AUC is rank-based, so any monotone
// transform of the scores yields the same value; the observed
// behavior of the original pipeline is preserved as-is.
//
// Returns None when the truth vector contains only one class —
// the curve is undefined there, and the caller decides what to
// print.

use crate::domain::errors::PipelineError;

pub fn roc_auc(y_true: &[usize], y_score: &[f32]) -> Result<Option<f64>, PipelineError> {
    if y_true.len() != y_score.len() {
        return Err(PipelineError::ShapeMismatch(format!(
            "{} true labels vs {} scores",
            y_true.len(),
            y_score.len()
        )));
    }

    let n_pos = y_true.iter().filter(|&&t| t == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Ok(None);
    }

    // Sort indices by score ascending
    let mut order: Vec<usize> = (0..y_score.len()).collect();
    order.sort_by(|&a, &b| {
        y_score[a]
            .partial_cmp(&y_score[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Walk tie groups, assigning each member the average rank
    let mut rank_sum_pos = 0.0f64;
    let mut i = 0usize;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && y_score[order[j + 1]] == y_score[order[i]] {
            j += 1;
        }
        // Ranks i+1 ..= j+1 (1-based) average to:
        let avg_rank = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            if y_true[idx] == 1 {
                rank_sum_pos += avg_rank;
            }
        }
        i = j + 1;
    }

    let auc = (rank_sum_pos - (n_pos * (n_pos + 1)) as f64 / 2.0)
        / (n_pos as f64 * n_neg as f64);
    Ok(Some(auc))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_separation() {
        let auc = roc_auc(&[0, 0, 1, 1], &[0.1, 0.2, 0.8, 0.9]).unwrap().unwrap();
        assert!((auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_perfectly_wrong() {
        let auc = roc_auc(&[1, 1, 0, 0], &[0.1, 0.2, 0.8, 0.9]).unwrap().unwrap();
        assert!(auc.abs() < 1e-12);
    }

    #[test]
    fn test_all_scores_tied_gives_half() {
        let auc = roc_auc(&[0, 1, 0, 1], &[0.5, 0.5, 0.5, 0.5]).unwrap().unwrap();
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_known_mixed_ranking() {
        // Pairs (pos, neg): (0.8 vs 0.4)=1, (0.8 vs 0.6)=1,
        //                   (0.3 vs 0.4)=0, (0.3 vs 0.6)=0 → 2/4
        let auc = roc_auc(&[1, 0, 1, 0], &[0.8, 0.4, 0.3, 0.6]).unwrap().unwrap();
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_monotone_transform_invariance() {
        // Raw logits vs their sigmoids rank identically
        let logits = [2.0f32, -1.0, 0.5, -0.2];
        let sigmoid: Vec<f32> = logits.iter().map(|&x| 1.0 / (1.0 + (-x).exp())).collect();
        let y = [1, 0, 1, 0];
        let a = roc_auc(&y, &logits).unwrap().unwrap();
        let b = roc_auc(&y, &sigmoid).unwrap().unwrap();
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_is_undefined() {
        assert!(roc_auc(&[1, 1], &[0.2, 0.9]).unwrap().is_none());
        assert!(roc_auc(&[0, 0], &[0.2, 0.9]).unwrap().is_none());
    }

    #[test]
    fn test_length_mismatch_is_shape_error() {
        assert!(matches!(
            roc_auc(&[0, 1], &[0.5]).unwrap_err(),
            PipelineError::ShapeMismatch(_)
        ));
    }
}
