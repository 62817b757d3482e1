// ============================================================
// Layer 3 — Task Variants
// ============================================================
// The pipeline supports two classification tasks over the same
// WRIME-style data. Rather than two near-identical binaries,
// a single tagged enum selects the classifier variant, the
// label column, and the metrics reported at the end:
//
//   Gap       — binary {0,1}: is there an anger gap between
//               what the writer felt and what readers perceived?
//               Reported with a per-class report + ROC AUC.
//   Intensity — ordinal {0,1,2,3}: four-level emotion intensity.
//               Reported with a per-class report + accuracy + MAE
//               (MAE captures how far off an intensity miss is).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Gap,
    Intensity,
}

impl TaskKind {
    /// Number of classes the task predicts over.
    pub fn num_labels(&self) -> usize {
        match self {
            TaskKind::Gap => 2,
            TaskKind::Intensity => 4,
        }
    }

    /// TSV column holding this task's label, unless overridden.
    pub fn default_label_column(&self) -> &'static str {
        match self {
            TaskKind::Gap => "gap",
            TaskKind::Intensity => "intensity",
        }
    }

    /// File stem the trained model is checkpointed under.
    /// Only the gap task is checkpointed at run end.
    pub fn checkpoint_name(&self) -> &'static str {
        match self {
            TaskKind::Gap => "gap_anger_model",
            TaskKind::Intensity => "intensity_model",
        }
    }

    /// Whether the trained model is persisted after the run.
    pub fn saves_checkpoint(&self) -> bool {
        matches!(self, TaskKind::Gap)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Gap => write!(f, "gap"),
            TaskKind::Intensity => write!(f, "intensity"),
        }
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gap" => Ok(TaskKind::Gap),
            "intensity" => Ok(TaskKind::Intensity),
            other => Err(format!(
                "unknown task '{other}' (expected 'gap' or 'intensity')"
            )),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_domains() {
        assert_eq!(TaskKind::Gap.num_labels(), 2);
        assert_eq!(TaskKind::Intensity.num_labels(), 4);
    }

    #[test]
    fn test_parse_roundtrip() {
        assert_eq!("gap".parse::<TaskKind>().unwrap(), TaskKind::Gap);
        assert_eq!(
            "Intensity".parse::<TaskKind>().unwrap(),
            TaskKind::Intensity
        );
        assert!("anger".parse::<TaskKind>().is_err());
    }

    #[test]
    fn test_only_gap_saves_checkpoint() {
        assert!(TaskKind::Gap.saves_checkpoint());
        assert!(!TaskKind::Intensity.saves_checkpoint());
    }
}
