// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Re-runs evaluation from a saved checkpoint, without training:
//
//   Step 1: Load train_config.json      (Layer 6 - infra)
//   Step 2: Load the labelled TSV       (Layer 4 - data)
//   Step 3: Load tokenizer + weights    (Layer 6 - infra)
//   Step 4: One deterministic pass      (Layer 5 - ml)
//   Step 5: Print the metrics block     (metrics)
//
// Only the gap task persists a checkpoint at the end of
// training, so this command refuses intensity configs up front
// instead of failing later on a missing weights file.

use anyhow::{bail, Result};
use burn::{backend::wgpu::WgpuDevice, data::dataloader::DataLoaderBuilder};

use crate::data::{batcher::EmotionBatcher, dataset::EmotionDataset, loader::TsvLoader};
use crate::domain::{task::TaskKind, traits::ExampleSource};
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::metrics::report::classification_report;
use crate::ml::{
    evaluator::run_evaluation,
    model::GapClassifierConfig,
    trainer::EvalBackend,
};

use super::train_use_case::report_auc;

pub struct EvaluateUseCase {
    /// Directory a previous training run wrote its artifacts to
    output_dir: String,
    /// Labelled TSV to score, in the same format as the training data
    data_path:  String,
}

impl EvaluateUseCase {
    pub fn new(output_dir: impl Into<String>, data_path: impl Into<String>) -> Self {
        Self { output_dir: output_dir.into(), data_path: data_path.into() }
    }

    pub fn execute(&self) -> Result<()> {
        // ── Step 1: Recover the architecture from the saved config ────────────
        let ckpt = CheckpointManager::new(&self.output_dir);
        let cfg  = ckpt.load_config()?;

        if cfg.task != TaskKind::Gap {
            bail!(
                "the '{}' task does not persist a checkpoint; only 'gap' runs can be re-evaluated",
                cfg.task
            );
        }
        let num_labels = cfg.task.num_labels();

        // ── Step 2: Load the split to score ───────────────────────────────────
        let loader  = TsvLoader::new(
            &self.data_path, &cfg.text_column, &cfg.label_column, num_labels,
        );
        let dataset = EmotionDataset::new(loader.load_all()?);

        // ── Step 3: Rebuild the model and restore the fine-tuned weights ──────
        let tokenizer = TokenizerStore::new(&cfg.model_dir).load()?;
        let device    = WgpuDevice::default();

        let model = GapClassifierConfig::new(cfg.backbone_config(), cfg.dropout)
            .init::<EvalBackend>(&device);
        let model = ckpt.load_latest(model, &device)?;

        // ── Steps 4-5: evaluate and report ────────────────────────────────────
        let batcher = EmotionBatcher::<EvalBackend>::new(tokenizer, cfg.max_seq_len, device);
        let eval_loader = DataLoaderBuilder::new(batcher)
            .batch_size(cfg.batch_size)
            .num_workers(1)
            .build(dataset);

        let preds  = run_evaluation(&model, eval_loader)?;
        let report = classification_report(&preds.y_true, &preds.y_pred, num_labels)?;
        println!("{report}");
        report_auc(&preds)?;

        Ok(())
    }
}
