// ============================================================
// Layer 4 — Class Balancer
// ============================================================
// WRIME labels are heavily imbalanced: most sentences carry no
// anger gap and low intensity. Left alone, gradient updates are
// dominated by the majority class. Two corrections, both
// proportional to inverse class frequency in the TRAINING split:
//
//   sample_weight[i] = 1 / count(label == labels[i])
//     — drives the weighted-with-replacement sampler so rare
//       classes are seen as often as common ones per epoch
//
//   class_weight[c] = 1 / count(label == c)
//     — scales each class's loss contribution
//
// A class with zero examples would mean division by zero, so
// fitting fails fast with ClassCoverage before any sampling
// happens. Validation/test splits are never balanced.

use crate::domain::errors::PipelineError;

#[derive(Debug)]
pub struct ClassBalancer {
    /// Number of training examples per class, indexed by label
    class_counts: Vec<usize>,
}

impl ClassBalancer {
    /// Count classes over the training labels and verify that every
    /// expected class is present.
    pub fn fit(labels: &[usize], num_labels: usize) -> Result<Self, PipelineError> {
        let mut class_counts = vec![0usize; num_labels];
        for &label in labels {
            // Out-of-range labels are rejected by the loader
            class_counts[label] += 1;
        }

        if let Some(class) = class_counts.iter().position(|&c| c == 0) {
            return Err(PipelineError::ClassCoverage { class, num_labels });
        }

        tracing::info!("Class counts: {:?}", class_counts);
        Ok(Self { class_counts })
    }

    /// Loss weight per class: 1 / count(c).
    pub fn class_weights(&self) -> Vec<f32> {
        self.class_counts
            .iter()
            .map(|&c| 1.0 / c as f32)
            .collect()
    }

    /// Sampling weight per example: 1 / count(labels[i]).
    pub fn sample_weights(&self, labels: &[usize]) -> Vec<f64> {
        labels
            .iter()
            .map(|&label| 1.0 / self.class_counts[label] as f64)
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_frequency_weights() {
        // 3 examples of class 0, 1 of class 1
        let labels = [0, 0, 0, 1];
        let b = ClassBalancer::fit(&labels, 2).unwrap();

        let cw = b.class_weights();
        assert_eq!(cw.len(), 2);
        assert!((cw[0] - 1.0 / 3.0).abs() < 1e-6);
        assert!((cw[1] - 1.0).abs() < 1e-6);

        let sw = b.sample_weights(&labels);
        assert_eq!(sw.len(), 4);
        for w in &sw[..3] {
            assert!((w - 1.0 / 3.0).abs() < 1e-9);
        }
        assert!((sw[3] - 1.0).abs() < 1e-9);
        assert!(sw.iter().sum::<f64>() > 0.0);
    }

    #[test]
    fn test_every_present_class_is_exact_inverse_count() {
        let labels = [0, 1, 1, 2, 2, 2, 3, 3];
        let b = ClassBalancer::fit(&labels, 4).unwrap();
        let cw = b.class_weights();
        for (c, &count) in [1usize, 2, 3, 2].iter().enumerate() {
            assert!((cw[c] - 1.0 / count as f32).abs() < 1e-6);
        }
    }

    #[test]
    fn test_missing_class_fails_fast() {
        // Only label 0 present while two classes are expected
        let err = ClassBalancer::fit(&[0, 0, 0], 2).unwrap_err();
        match err {
            PipelineError::ClassCoverage { class, num_labels } => {
                assert_eq!(class, 1);
                assert_eq!(num_labels, 2);
            }
            other => panic!("expected ClassCoverage, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_split_fails() {
        assert!(ClassBalancer::fit(&[], 2).is_err());
    }
}
