// ============================================================
// Metrics — Classification Report
// ============================================================
// Per-class precision / recall / F1 plus overall accuracy,
// printed in the familiar tabular layout. Mean absolute error
// is reported separately for the ordinal task, where the label
// DISTANCE of a miss matters (predicting 2 for a true 3 is a
// smaller mistake than predicting 0).
//
// Conventions for degenerate classes (no predicted or no true
// examples): the affected ratio is 0.0, never NaN.

use std::fmt;

use crate::domain::errors::PipelineError;

/// Precision/recall/F1 for a single class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label:     usize,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    /// Number of true examples of this class
    pub support:   usize,
}

/// The full per-class report plus overall accuracy.
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    pub classes:  Vec<ClassMetrics>,
    pub accuracy: f64,
    pub total:    usize,
}

/// Build the per-class report from parallel truth/prediction vectors.
pub fn classification_report(
    y_true: &[usize],
    y_pred: &[usize],
    num_labels: usize,
) -> Result<ClassificationReport, PipelineError> {
    check_aligned(y_true.len(), y_pred.len())?;

    let total = y_true.len();

    // Confusion counts per class
    let mut true_pos  = vec![0usize; num_labels];
    let mut pred_cnt  = vec![0usize; num_labels];
    let mut truth_cnt = vec![0usize; num_labels];
    let mut correct   = 0usize;

    for (&t, &p) in y_true.iter().zip(y_pred) {
        truth_cnt[t] += 1;
        pred_cnt[p]  += 1;
        if t == p {
            true_pos[t] += 1;
            correct += 1;
        }
    }

    let classes = (0..num_labels)
        .map(|c| {
            let precision = ratio(true_pos[c], pred_cnt[c]);
            let recall    = ratio(true_pos[c], truth_cnt[c]);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics { label: c, precision, recall, f1, support: truth_cnt[c] }
        })
        .collect();

    let accuracy = ratio(correct, total);
    Ok(ClassificationReport { classes, accuracy, total })
}

/// Fraction of exact matches: P correct out of N is exactly P/N.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> Result<f64, PipelineError> {
    check_aligned(y_true.len(), y_pred.len())?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(ratio(correct, y_true.len()))
}

/// Mean absolute label distance — the ordinal-miss metric.
pub fn mean_absolute_error(y_true: &[usize], y_pred: &[usize]) -> Result<f64, PipelineError> {
    check_aligned(y_true.len(), y_pred.len())?;
    if y_true.is_empty() {
        return Ok(0.0);
    }
    let total_distance: usize = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| t.abs_diff(p))
        .sum();
    Ok(total_distance as f64 / y_true.len() as f64)
}

fn check_aligned(truths: usize, preds: usize) -> Result<(), PipelineError> {
    if truths != preds {
        return Err(PipelineError::ShapeMismatch(format!(
            "{truths} true labels vs {preds} predictions"
        )));
    }
    Ok(())
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>10} {:>10} {:>10} {:>10}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10.4} {:>10}",
            "accuracy", "", "", self.accuracy, self.total
        )
    }
}
