// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw TSV files to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   train/dev/test .tsv files
//       │
//       ▼
//   TsvLoader         → reads rows, extracts (text, label) pairs
//       │
//       ▼
//   EmotionDataset    → implements Burn's Dataset trait,
//       │               exposes the derived label vector
//       ▼
//   ClassBalancer     → inverse-frequency sample + class weights
//       │               (training split only)
//       ▼
//   WeightedSampler   → per-epoch resample with replacement
//       │
//       ▼
//   EmotionBatcher    → tokenises, pads, truncates into tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads (text, label) examples from tab-separated files
pub mod loader;

/// Implements Burn's Dataset trait for emotion examples
pub mod dataset;

/// Inverse-frequency class and sample weights
pub mod balancer;

/// Weighted-with-replacement epoch resampling
pub mod sampler;

/// Implements Burn's Batcher trait: tokenise + pad + stack
pub mod batcher;
