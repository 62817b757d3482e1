// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `evaluate`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// The task name stays a plain string here and is parsed into
// TaskKind at the conversion boundary, so the domain layer
// never depends on clap.
//
// Reference: Rust Book §12 (Building a CLI Program)

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::domain::task::TaskKind;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fine-tune an emotion classifier on labelled TSV splits
    Train(TrainArgs),

    /// Score a labelled TSV with a previously saved gap checkpoint
    Evaluate(EvaluateArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Which task to train: 'gap' (binary anger gap) or
    /// 'intensity' (four-level emotion intensity)
    #[arg(long, default_value = "gap")]
    pub task: String,

    /// Tab-separated training split with a header row
    #[arg(long, default_value = "data/train.tsv")]
    pub train: String,

    /// Tab-separated test split in the same format
    #[arg(long, default_value = "data/test.tsv")]
    pub test: String,

    /// Header name of the column holding the input sentence
    #[arg(long, default_value = "sentence")]
    pub text_column: String,

    /// Header name of the label column
    /// (defaults to the task's own column name)
    #[arg(long)]
    pub label_column: Option<String>,

    /// Directory holding the pretrained tokenizer.json
    #[arg(long, default_value = "pretrained")]
    pub model_dir: String,

    /// Pretrained backbone weights (.mpk.gz); omit to fine-tune
    /// from random initialisation
    #[arg(long)]
    pub backbone_weights: Option<String>,

    /// Directory to write the checkpoint, config and metrics CSV
    #[arg(long, default_value = "output")]
    pub output_dir: String,

    /// Maximum number of tokens per input sequence
    #[arg(long, default_value_t = 512)]
    pub max_seq_len: usize,

    /// Number of sentences processed together in one forward pass
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 3)]
    pub epochs: usize,

    /// Adam learning rate — the standard fine-tuning rate is
    /// far lower than from-scratch training rates
    #[arg(long, default_value_t = 2e-5)]
    pub lr: f64,

    /// Hidden dimension of the transformer (d_model in the paper)
    #[arg(long, default_value_t = 768)]
    pub d_model: usize,

    /// Number of attention heads in multi-head attention
    /// d_model must be divisible by num_heads
    #[arg(long, default_value_t = 12)]
    pub num_heads: usize,

    /// Number of stacked encoder layers
    #[arg(long, default_value_t = 12)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    /// Typically 4x d_model
    #[arg(long, default_value_t = 3072)]
    pub d_ff: usize,

    /// Dropout probability — randomly zeroes activations during
    /// training to prevent overfitting
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Seed for the weighted epoch resampler
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl TrainArgs {
    /// Convert CLI TrainArgs into the application-layer TrainConfig.
    /// This is the boundary between Layer 1 and Layer 2 —
    /// the application layer never sees clap types.
    pub fn into_config(self) -> Result<TrainConfig> {
        let task: TaskKind = self.task.parse().map_err(anyhow::Error::msg)?;
        let label_column = self
            .label_column
            .unwrap_or_else(|| task.default_label_column().to_string());

        Ok(TrainConfig {
            task,
            train_path:       self.train,
            test_path:        self.test,
            text_column:      self.text_column,
            label_column,
            model_dir:        self.model_dir,
            backbone_weights: self.backbone_weights,
            output_dir:       self.output_dir,
            max_seq_len:      self.max_seq_len,
            batch_size:       self.batch_size,
            epochs:           self.epochs,
            lr:               self.lr,
            d_model:          self.d_model,
            num_heads:        self.num_heads,
            num_layers:       self.num_layers,
            d_ff:             self.d_ff,
            dropout:          self.dropout,
            seed:             self.seed,
            // Placeholder until the tokenizer is loaded
            ..TrainConfig::default()
        })
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Labelled TSV to score (same columns as the training data)
    #[arg(long)]
    pub data: String,

    /// Directory where a previous 'train' run saved its artifacts
    #[arg(long, default_value = "output")]
    pub output_dir: String,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: Commands,
    }

    #[test]
    fn test_label_column_defaults_per_task() {
        let cli = TestCli::parse_from(["prog", "train", "--task", "intensity"]);
        let Commands::Train(args) = cli.command else {
            panic!("expected train subcommand")
        };
        let cfg = args.into_config().unwrap();
        assert_eq!(cfg.task, TaskKind::Intensity);
        assert_eq!(cfg.label_column, "intensity");
        assert_eq!(cfg.epochs, 3);
        assert!((cfg.lr - 2e-5).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_label_column_wins() {
        let cli = TestCli::parse_from([
            "prog", "train", "--task", "gap", "--label-column", "avg_gap",
        ]);
        let Commands::Train(args) = cli.command else {
            panic!("expected train subcommand")
        };
        let cfg = args.into_config().unwrap();
        assert_eq!(cfg.label_column, "avg_gap");
    }

    #[test]
    fn test_unknown_task_is_rejected() {
        let cli = TestCli::parse_from(["prog", "train", "--task", "sentiment"]);
        let Commands::Train(args) = cli.command else {
            panic!("expected train subcommand")
        };
        assert!(args.into_config().is_err());
    }
}
