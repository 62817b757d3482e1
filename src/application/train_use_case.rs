// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full fine-tuning pipeline in order:
//
//   Step 1: Load train/test TSV splits   (Layer 4 - data)
//   Step 2: Fit the class balancer       (Layer 4 - data)
//   Step 3: Load pretrained tokenizer    (Layer 6 - infra)
//   Step 4: Build / load the backbone    (Layer 5 - ml)
//   Step 5: Save resolved config         (Layer 6 - infra)
//   Step 6: Run training loop            (Layer 5 - ml)
//   Step 7: Evaluate on the test split   (Layer 5 - ml)
//   Step 8: Report metrics per task      (metrics)
//   Step 9: Checkpoint (gap task only)   (Layer 6 - infra)
//
// The two task variants share every step; only the model type
// and the final metrics block differ, so the shared portion is
// generic over the classifier.
//
// Reference: Burn Book §5 (Training)
//            Clean Architecture pattern

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use burn::{
    backend::wgpu::WgpuDevice,
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
};
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::data::{
    balancer::ClassBalancer,
    batcher::EmotionBatcher,
    dataset::EmotionDataset,
    loader::TsvLoader,
};
use crate::domain::{task::TaskKind, traits::ExampleSource};
use crate::infra::{
    checkpoint::{self, CheckpointManager},
    metrics::MetricsLogger,
    tokenizer_store::TokenizerStore,
};
use crate::metrics::{
    auc::roc_auc,
    report::{accuracy, classification_report, mean_absolute_error},
};
use crate::ml::{
    evaluator::{run_evaluation, EvalPredictions},
    model::{
        EncoderBackbone, EncoderBackboneConfig, GapClassifierConfig, IntensityClassifierConfig,
        TextClassifier,
    },
    trainer::{run_training, EvalBackend, TrainBackend},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a fine-tuning run.
// Serialisable so it can be saved to disk and reloaded for evaluation.
// The #[derive(Serialize, Deserialize)] macros from serde handle
// reading/writing this struct to JSON automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub task:             TaskKind,
    pub train_path:       String,
    pub test_path:        String,
    pub text_column:      String,
    pub label_column:     String,
    /// Directory holding the pretrained tokenizer.json
    pub model_dir:        String,
    /// Optional pretrained backbone weights (.mpk.gz);
    /// without them fine-tuning starts from random initialisation
    pub backbone_weights: Option<String>,
    pub output_dir:       String,
    pub max_seq_len:      usize,
    pub batch_size:       usize,
    pub epochs:           usize,
    pub lr:               f64,
    pub d_model:          usize,
    pub num_heads:        usize,
    pub num_layers:       usize,
    pub d_ff:             usize,
    pub dropout:          f64,
    /// Overwritten with the tokenizer's actual vocabulary size
    /// before the backbone is built
    pub vocab_size:       usize,
    pub seed:             u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            task:             TaskKind::Gap,
            train_path:       "data/train.tsv".to_string(),
            test_path:        "data/test.tsv".to_string(),
            text_column:      "sentence".to_string(),
            label_column:     "gap".to_string(),
            model_dir:        "pretrained".to_string(),
            backbone_weights: None,
            output_dir:       "output".to_string(),
            max_seq_len:      512,
            batch_size:       32,
            epochs:           3,
            lr:               2e-5,
            d_model:          768,
            num_heads:        12,
            num_layers:       12,
            d_ff:             3072,
            dropout:          0.1,
            vocab_size:       32768,
            seed:             42,
        }
    }
}

impl TrainConfig {
    pub fn backbone_config(&self) -> EncoderBackboneConfig {
        EncoderBackboneConfig::new(
            self.vocab_size,
            self.max_seq_len,
            self.d_model,
            self.num_heads,
            self.num_layers,
            self.d_ff,
            self.dropout,
        )
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full fine-tuning pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full fine-tuning pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let mut cfg = self.config.clone();
        let num_labels = cfg.task.num_labels();

        // ── Step 1: Load both TSV splits ──────────────────────────────────────
        tracing::info!("Task: {} ({} classes)", cfg.task, num_labels);
        let train_dataset = load_split(&cfg, &cfg.train_path, num_labels)?;
        let test_dataset  = load_split(&cfg, &cfg.test_path, num_labels)?;
        tracing::info!(
            "Loaded {} train / {} test examples",
            burn::data::dataset::Dataset::len(&train_dataset),
            burn::data::dataset::Dataset::len(&test_dataset),
        );

        // ── Step 2: Fit the class balancer on the TRAINING split only ─────────
        // Fails fast if any class has no training examples — the
        // inverse-frequency weights would otherwise divide by zero.
        let balancer       = ClassBalancer::fit(train_dataset.labels(), num_labels)?;
        let class_weights  = balancer.class_weights();
        let sample_weights = balancer.sample_weights(train_dataset.labels());

        // ── Step 3: Load the pretrained tokenizer ─────────────────────────────
        // A fine-tuning pipeline NEVER builds its own vocabulary; the
        // tokenizer must match the pretrained backbone exactly.
        let tokenizer  = TokenizerStore::new(&cfg.model_dir).load()?;
        cfg.vocab_size = tokenizer.get_vocab_size(true);

        // ── Step 4: Build the backbone (+ pretrained weights if given) ────────
        let device   = WgpuDevice::default();
        let backbone = build_backbone(&cfg, &device)?;

        // ── Step 5: Save the resolved config for later evaluation ─────────────
        let ckpt = CheckpointManager::new(&cfg.output_dir);
        ckpt.save_config(&cfg)?;
        let logger = MetricsLogger::new(&cfg.output_dir)?;

        // ── Steps 6-9: train, evaluate, report, checkpoint ────────────────────
        match cfg.task {
            TaskKind::Gap => {
                let model = GapClassifierConfig::new(cfg.backbone_config(), cfg.dropout)
                    .init_from(backbone, &device);
                let (trained, preds) = train_and_evaluate(
                    &cfg, model, &train_dataset, test_dataset,
                    &sample_weights, class_weights, tokenizer, &device, &logger,
                )?;

                let report = classification_report(&preds.y_true, &preds.y_pred, num_labels)?;
                println!("{report}");
                report_auc(&preds)?;

                ckpt.save_model(&trained, cfg.task.checkpoint_name())?;
            }
            TaskKind::Intensity => {
                let model = IntensityClassifierConfig::new(cfg.backbone_config(), cfg.dropout)
                    .with_num_labels(num_labels)
                    .init_from(backbone, &device);
                let (_trained, preds) = train_and_evaluate(
                    &cfg, model, &train_dataset, test_dataset,
                    &sample_weights, class_weights, tokenizer, &device, &logger,
                )?;

                let report = classification_report(&preds.y_true, &preds.y_pred, num_labels)?;
                println!("{report}");
                println!("Accuracy: {:.4}", accuracy(&preds.y_true, &preds.y_pred)?);
                println!("MAE:      {:.4}", mean_absolute_error(&preds.y_true, &preds.y_pred)?);
                // The intensity run is exploratory — no checkpoint is kept
            }
        }

        Ok(())
    }
}

// ─── Shared pipeline steps ────────────────────────────────────────────────────

fn load_split(cfg: &TrainConfig, path: &str, num_labels: usize) -> Result<EmotionDataset> {
    let loader = TsvLoader::new(path, &cfg.text_column, &cfg.label_column, num_labels);
    Ok(EmotionDataset::new(loader.load_all()?))
}

fn build_backbone(
    cfg:    &TrainConfig,
    device: &WgpuDevice,
) -> Result<EncoderBackbone<TrainBackend>> {
    let backbone = cfg.backbone_config().init::<TrainBackend>(device);
    match &cfg.backbone_weights {
        Some(weights) => {
            Ok(checkpoint::load_pretrained_backbone(backbone, Path::new(weights), device)?)
        }
        None => {
            tracing::warn!(
                "No pretrained backbone weights supplied — fine-tuning from random initialisation"
            );
            Ok(backbone)
        }
    }
}

/// Train on the weighted training split, then run one deterministic
/// pass over the test split with the gradient-free model. Generic so
/// both classifier variants flow through the same code path.
#[allow(clippy::too_many_arguments)]
fn train_and_evaluate<M>(
    cfg:            &TrainConfig,
    model:          M,
    train_dataset:  &EmotionDataset,
    test_dataset:   EmotionDataset,
    sample_weights: &[f64],
    class_weights:  Vec<f32>,
    tokenizer:      Arc<Tokenizer>,
    device:         &WgpuDevice,
    logger:         &MetricsLogger,
) -> Result<(M, EvalPredictions)>
where
    M: AutodiffModule<TrainBackend> + TextClassifier<TrainBackend>,
    M::InnerModule: TextClassifier<EvalBackend>,
{
    let train_batcher =
        EmotionBatcher::<TrainBackend>::new(tokenizer.clone(), cfg.max_seq_len, device.clone());
    let trained = run_training(
        cfg, model, train_dataset, sample_weights, class_weights, train_batcher, logger,
    )?;

    // model.valid() strips the autodiff wrapper: no gradient graph,
    // dropout inert, so evaluation is deterministic.
    let eval_batcher =
        EmotionBatcher::<EvalBackend>::new(tokenizer, cfg.max_seq_len, device.clone());
    let eval_loader = DataLoaderBuilder::new(eval_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(test_dataset);

    let predictions = run_evaluation(&trained.valid(), eval_loader)?;
    Ok((trained, predictions))
}

/// AUC only exists for the binary task, and only when the test split
/// contains both classes.
pub(crate) fn report_auc(preds: &EvalPredictions) -> Result<()> {
    if let Some(scores) = &preds.y_score {
        match roc_auc(&preds.y_true, scores)? {
            Some(auc) => println!("ROC AUC: {auc:.4}"),
            None => println!("ROC AUC: undefined (test split contains a single class)"),
        }
    }
    Ok(())
}
