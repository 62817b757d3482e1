// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — fine-tunes a classifier on labelled TSVs
//   2. `evaluate` — scores a TSV with a saved gap checkpoint
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "wrime-emotion",
    version = "0.1.0",
    about = "Fine-tune Japanese emotion classifiers on WRIME-style TSV data."
)]
pub struct Cli {
    /// The subcommand to run (train or evaluate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => Self::run_train(args),
            Commands::Evaluate(args) => Self::run_evaluate(args),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting '{}' run on '{}'", args.task, args.train);

        // Convert CLI args → application config (separates presentation from domain)
        let config = args.into_config()?;
        let save   = config.task.saves_checkpoint();
        TrainUseCase::new(config).execute()?;

        if save {
            println!("Training complete. Checkpoint saved.");
        } else {
            println!("Training complete.");
        }
        Ok(())
    }

    /// Handles the `evaluate` subcommand.
    /// Restores the model from its checkpoint and prints the metrics.
    fn run_evaluate(args: EvaluateArgs) -> Result<()> {
        use crate::application::evaluate_use_case::EvaluateUseCase;

        EvaluateUseCase::new(args.output_dir, args.data).execute()
    }
}
