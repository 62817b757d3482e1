// ============================================================
// Layer 5 — Evaluation Loop
// ============================================================
// One gradient-free pass over a held-out split in fixed,
// sequential order. Callers hand in the inner-backend model
// (model.valid()) so no autodiff graph is built and dropout is
// inert — two runs over the same weights and loader yield
// identical predictions.
//
// Collected per example:
//   - ground-truth label
//   - predicted class (arg-max logit)
//   - binary task only: the RAW positive-class logit, used for
//     AUC (observed behavior of the original pipeline; AUC is
//     rank-based, so calibration does not change it)

use std::sync::Arc;

use anyhow::{anyhow, Result};
use burn::{data::dataloader::DataLoader, prelude::*};

use crate::data::batcher::EmotionBatch;
use crate::domain::errors::PipelineError;
use crate::ml::model::TextClassifier;

/// Everything the metrics layer needs, aligned by example index.
#[derive(Debug, Clone)]
pub struct EvalPredictions {
    pub y_true: Vec<usize>,
    pub y_pred: Vec<usize>,
    /// Positive-class raw logits; Some only for the binary task
    pub y_score: Option<Vec<f32>>,
}

pub fn run_evaluation<B, M>(
    model:  &M,
    loader: Arc<dyn DataLoader<EmotionBatch<B>>>,
) -> Result<EvalPredictions>
where
    B: Backend,
    M: TextClassifier<B>,
{
    let binary = model.num_labels() == 2;

    let mut y_true: Vec<usize> = Vec::new();
    let mut y_pred: Vec<usize> = Vec::new();
    let mut y_score: Vec<f32>  = Vec::new();

    for batch in loader.iter() {
        let logits = model.forward(batch.input_ids, batch.attention_mask);
        let [batch_size, _] = logits.dims();

        let truths = batch
            .labels
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| anyhow!("cannot read label tensor: {e:?}"))?;
        y_true.extend(truths.iter().map(|&t| t as usize));

        let preds = logits
            .clone()
            .argmax(1)
            .flatten::<1>(0, 1)
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| anyhow!("cannot read prediction tensor: {e:?}"))?;
        y_pred.extend(preds.iter().map(|&p| p as usize));

        if binary {
            let scores = logits
                .slice([0..batch_size, 1..2])
                .reshape([batch_size])
                .into_data()
                .convert::<f32>()
                .to_vec::<f32>()
                .map_err(|e| anyhow!("cannot read score tensor: {e:?}"))?;
            y_score.extend(scores);
        }
    }

    if y_true.len() != y_pred.len() {
        return Err(PipelineError::ShapeMismatch(format!(
            "{} truths vs {} predictions after evaluation",
            y_true.len(),
            y_pred.len()
        ))
        .into());
    }

    tracing::info!("Evaluated {} examples", y_true.len());
    Ok(EvalPredictions {
        y_true,
        y_pred,
        y_score: binary.then_some(y_score),
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::data::dataloader::DataLoaderBuilder;

    use crate::data::batcher::{test_support::toy_tokenizer, EmotionBatcher};
    use crate::data::dataset::EmotionDataset;
    use crate::domain::example::Example;
    use crate::ml::model::{EncoderBackboneConfig, GapClassifier, GapClassifierConfig};

    type TestBackend = burn::backend::NdArray;

    fn fixture() -> (GapClassifier<TestBackend>, Arc<dyn DataLoader<EmotionBatch<TestBackend>>>) {
        let device = Default::default();
        let model = GapClassifierConfig::new(
            EncoderBackboneConfig::new(16, 8, 32, 2, 1, 64, 0.0),
            0.0,
        )
        .init(&device);

        let dataset = EmotionDataset::new(vec![
            Example::new("a b", 0),
            Example::new("c", 1),
            Example::new("a c d", 1),
            Example::new("b b", 0),
        ]);
        let batcher = EmotionBatcher::<TestBackend>::new(toy_tokenizer(), 8, device);
        let loader = DataLoaderBuilder::new(batcher)
            .batch_size(2)
            .num_workers(1)
            .build(dataset);
        (model, loader)
    }

    #[test]
    fn test_collects_one_prediction_per_example() {
        let (model, loader) = fixture();
        let out = run_evaluation(&model, loader).unwrap();
        assert_eq!(out.y_true, vec![0, 1, 1, 0]);
        assert_eq!(out.y_pred.len(), 4);
        // Binary model: one raw positive-class logit per example
        assert_eq!(out.y_score.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let (model, loader) = fixture();
        let first  = run_evaluation(&model, loader.clone()).unwrap();
        let second = run_evaluation(&model, loader).unwrap();
        assert_eq!(first.y_pred, second.y_pred);
        assert_eq!(first.y_true, second.y_true);
        // Bit-identical scores, not merely close
        assert_eq!(first.y_score.unwrap(), second.y_score.unwrap());
    }
}
