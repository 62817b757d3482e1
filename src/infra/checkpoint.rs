// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved per run:
//   1. Model weights (.mpk.gz file) — all learned parameters,
//      stored under the task's checkpoint name
//   2. latest.json                  — which checkpoint was last saved
//   3. train_config.json            — model architecture config
//
// Why save the config separately?
//   When loading for evaluation, we need to know the exact
//   model architecture (d_model, num_layers, etc.) to rebuild
//   the model before loading the weights into it.
//   Without the config, we can't reconstruct the model.
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip for smaller file size
//   - Type-safe: loading fails if architecture doesn't match
//
// File naming convention:
//   output/
//     gap_anger_model.mpk.gz   ← fine-tuned weights (binary task)
//     latest.json              ← name of the latest checkpoint
//     train_config.json        ← model hyperparameters
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs, path::Path, path::PathBuf};
use burn::{
    module::Module,
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::errors::PipelineError;
use crate::ml::model::EncoderBackbone;

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    /// Path to the directory where checkpoints are stored
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        // create_dir_all creates parent directories too, like `mkdir -p`
        // .ok() ignores the error if the directory already exists
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save model weights under the given checkpoint name.
    ///
    /// Uses Burn's CompactRecorder which:
    ///   1. Calls model.into_record() to extract all parameters
    ///   2. Serialises to MessagePack binary format
    ///   3. Compresses with gzip
    ///   4. Writes to {dir}/{name}.mpk.gz
    pub fn save_model<B, M>(&self, model: &M, name: &str) -> Result<()>
    where
        B: Backend,
        M: Module<B>,
    {
        // Build the file path (without extension — recorder adds it)
        let path = self.dir.join(name);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        // Update the latest checkpoint pointer
        // This tells the evaluate command which file to load
        let latest_path = self.dir.join("latest.json");
        fs::write(&latest_path, serde_json::to_string(&name)?)
            .with_context(|| "Failed to write latest.json")?;

        tracing::info!("Saved checkpoint '{}'", name);
        Ok(())
    }

    /// Load model weights from the latest saved checkpoint.
    ///
    /// Steps:
    ///   1. Read latest.json to find the checkpoint name
    ///   2. Load the corresponding .mpk.gz file
    ///   3. Call model.load_record() to restore weights
    ///
    /// The model parameter must have the correct architecture
    /// (matching the saved checkpoint) or loading will fail.
    pub fn load_latest<B, M>(&self, model: M, device: &B::Device) -> Result<M>
    where
        B: Backend,
        M: Module<B>,
    {
        let name = self.latest_name()?;
        let path = self.dir.join(&name);

        tracing::info!("Loading checkpoint '{}'", name);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        // load_record() returns a new model with the loaded weights
        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    ///
    /// This must be called before training starts so the
    /// evaluate command can reconstruct the exact model
    /// architecture.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");

        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    ///
    /// Called by the evaluate command to know what model
    /// architecture was used during training so it can rebuild
    /// the same model.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'evaluate'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Read latest.json and return the checkpoint name.
    /// Returns an error if training hasn't been run yet.
    fn latest_name(&self) -> Result<String> {
        let path = self.dir.join("latest.json");

        let s = fs::read_to_string(&path)
            .with_context(|| {
                "Cannot find 'latest.json'. \
                 Have you run 'train' first?"
            })?;

        Ok(serde_json::from_str::<String>(&s)?)
    }
}

/// Load pretrained backbone weights into a freshly initialised
/// backbone. The weights file is an external input artifact, so
/// any failure here is a fatal resource error.
pub fn load_pretrained_backbone<B: Backend>(
    backbone: EncoderBackbone<B>,
    weights:  &Path,
    device:   &B::Device,
) -> Result<EncoderBackbone<B>, PipelineError> {
    let record = CompactRecorder::new()
        .load(weights.to_path_buf(), device)
        .map_err(|e| {
            PipelineError::Resource(format!(
                "cannot load pretrained weights from '{}': {e}",
                weights.display()
            ))
        })?;

    tracing::info!("Loaded pretrained backbone from '{}'", weights.display());
    Ok(backbone.load_record(record))
}
