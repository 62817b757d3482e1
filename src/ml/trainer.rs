// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Fixed-epoch fine-tuning with class-imbalance correction.
//
// Per epoch:
//   1. Resample the training split with replacement, weighted by
//      inverse class frequency (epoch size == dataset size)
//   2. For each batch: forward → loss → backward → Adam step
//   3. Accumulate running loss and arg-max accuracy, then print
//      one epoch line and append a CSV row
//
// The loss criterion is variant-dependent: the intensity model
// computes its own unweighted cross-entropy; the gap model gets
// class-weighted cross-entropy applied here.
//
// Deliberately absent: early stopping, LR schedules, retry. A
// failure in any batch aborts the run.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};
use rand::{rngs::StdRng, SeedableRng};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::EmotionBatcher, dataset::EmotionDataset, sampler};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::TextClassifier;

pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
pub type EvalBackend  = burn::backend::Wgpu;

/// Run the full fixed-epoch loop and return the trained model.
pub fn run_training<M>(
    cfg:            &TrainConfig,
    mut model:      M,
    train_dataset:  &EmotionDataset,
    sample_weights: &[f64],
    class_weights:  Vec<f32>,
    batcher:        EmotionBatcher<TrainBackend>,
    logger:         &MetricsLogger,
) -> Result<M>
where
    M: AutodiffModule<TrainBackend> + TextClassifier<TrainBackend>,
{
    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // External criterion for models without a built-in one
    let criterion = CrossEntropyLossConfig::new().with_weights(Some(class_weights));

    let mut rng = StdRng::seed_from_u64(cfg.seed);

    for epoch in 1..=cfg.epochs {
        // ── Weighted epoch view ───────────────────────────────────────────────
        // Fresh draw every epoch; the sampler already randomises order,
        // so the loader itself does not shuffle.
        let epoch_view = sampler::resample_with_replacement(train_dataset, sample_weights, &mut rng)?;
        let loader = DataLoaderBuilder::new(batcher.clone())
            .batch_size(cfg.batch_size)
            .num_workers(1)
            .build(epoch_view);

        let mut epoch_loss = 0.0f64;
        let mut epoch_acc  = 0.0f64;
        let mut batches    = 0usize;

        for batch in loader.iter() {
            let logits = model.forward(batch.input_ids.clone(), batch.attention_mask.clone());

            let loss = match model.builtin_loss(logits.clone(), batch.labels.clone()) {
                Some(loss) => loss,
                None => criterion
                    .init(&logits.device())
                    .forward(logits.clone(), batch.labels.clone()),
            };

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);

            // Batch accuracy: fraction of arg-max predictions that hit
            let batch_len = batch.labels.dims()[0];
            let preds     = logits.argmax(1).flatten::<1>(0, 1);
            let correct: i64 = preds
                .equal(batch.labels)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();

            epoch_loss += loss_val;
            epoch_acc  += correct as f64 / batch_len as f64;
            batches    += 1;
        }

        let mean_loss = if batches > 0 { epoch_loss / batches as f64 } else { f64::NAN };
        let mean_acc  = if batches > 0 { epoch_acc  / batches as f64 } else { f64::NAN };

        println!(
            "Epoch {}/{} | train | Loss: {:.4} Accuracy: {:.4}",
            epoch, cfg.epochs, mean_loss, mean_acc
        );
        logger.log(&EpochMetrics::new(epoch, mean_loss, mean_acc))?;
    }

    tracing::info!("Training complete after {} epochs", cfg.epochs);
    Ok(model)
}
