// ============================================================
// Layer 4 — Weighted Epoch Sampler
// ============================================================
// Draws one epoch's worth of training examples with replacement,
// each example weighted by its inverse class frequency. The total
// number of draws equals the dataset size, so an epoch still
// covers len(dataset) steps — rare classes simply appear more
// often and common classes less often.
//
// rand's WeightedIndex does the heavy lifting: O(log n) per draw
// over a precomputed cumulative weight table.
//
// The evaluation loop never goes through this module — test and
// dev splits are iterated once, in file order.
//
// Reference: rand crate documentation (WeightedIndex)

use burn::data::dataset::Dataset;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::data::dataset::EmotionDataset;
use crate::domain::errors::PipelineError;

/// Materialise one resampled epoch view of the training split.
///
/// Weights must be strictly positive and aligned with the dataset;
/// the balancer guarantees both.
pub fn resample_with_replacement<R: Rng>(
    dataset: &EmotionDataset,
    weights: &[f64],
    rng:     &mut R,
) -> Result<EmotionDataset, PipelineError> {
    if weights.len() != dataset.len() {
        return Err(PipelineError::ShapeMismatch(format!(
            "{} sample weights for {} examples",
            weights.len(),
            dataset.len()
        )));
    }

    let dist = WeightedIndex::new(weights).map_err(|e| {
        PipelineError::ShapeMismatch(format!("invalid sampling weights: {e}"))
    })?;

    let examples = (0..dataset.len())
        .map(|_| {
            let index = dist.sample(rng);
            // index comes from 0..len, so get() cannot miss
            dataset.get(index).unwrap_or_else(|| {
                unreachable!("sampled index {index} out of bounds")
            })
        })
        .collect();

    Ok(EmotionDataset::new(examples))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::Example;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dataset(labels: &[usize]) -> EmotionDataset {
        EmotionDataset::new(
            labels
                .iter()
                .map(|&l| Example::new(format!("s{l}"), l))
                .collect(),
        )
    }

    #[test]
    fn test_epoch_size_equals_dataset_size() {
        let ds = dataset(&[0, 0, 0, 1]);
        let mut rng = StdRng::seed_from_u64(42);
        let epoch =
            resample_with_replacement(&ds, &[0.25, 0.25, 0.25, 1.0], &mut rng).unwrap();
        assert_eq!(epoch.len(), ds.len());
    }

    #[test]
    fn test_rare_class_is_upsampled() {
        // 90 examples of class 0, 10 of class 1 with inverse-frequency
        // weights: each class should land near half the epoch draws.
        let labels: Vec<usize> =
            std::iter::repeat(0).take(90).chain(std::iter::repeat(1).take(10)).collect();
        let ds = dataset(&labels);
        let weights: Vec<f64> = labels
            .iter()
            .map(|&l| if l == 0 { 1.0 / 90.0 } else { 1.0 / 10.0 })
            .collect();

        let mut rng = StdRng::seed_from_u64(7);
        let epoch = resample_with_replacement(&ds, &weights, &mut rng).unwrap();
        let rare = epoch.labels().iter().filter(|&&l| l == 1).count();
        // Expectation is 50; allow generous slack for a 100-draw sample
        assert!((30..=70).contains(&rare), "rare class drawn {rare} times");
    }

    #[test]
    fn test_seeded_draw_is_reproducible() {
        let ds = dataset(&[0, 1, 1, 0, 1]);
        let w = [1.0, 0.5, 0.5, 1.0, 0.5];
        let a = resample_with_replacement(&ds, &w, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = resample_with_replacement(&ds, &w, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a.labels(), b.labels());
    }

    #[test]
    fn test_weight_length_mismatch_fails() {
        let ds = dataset(&[0, 1]);
        let mut rng = StdRng::seed_from_u64(0);
        let err = resample_with_replacement(&ds, &[1.0], &mut rng).unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch(_)));
    }
}
