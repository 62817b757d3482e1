// ============================================================
// Metrics — Evaluation Reporting
// ============================================================
// Pure functions over parallel prediction/label sequences.
// Nothing here touches Burn, files, or global state — every
// function is deterministic and read-only over its inputs,
// which keeps the whole layer testable with plain asserts.
//
// What is reported depends on the task:
//   gap (binary)        → per-class report + ROC AUC
//   intensity (ordinal) → per-class report + accuracy + MAE

/// Per-class precision/recall/F1 report, accuracy, MAE
pub mod report;

/// Rank-based ROC AUC for the binary task
pub mod auc;
