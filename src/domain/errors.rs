// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every error in this pipeline is fatal at the point it occurs:
// there is no retry, no partial-epoch recovery. Errors propagate
// up through anyhow to main() and terminate the process with a
// non-zero status.
//
// Four kinds cover the whole pipeline:
//   DataLoad      — bad input file (missing, malformed, bad label)
//   ClassCoverage — an expected class has no training examples,
//                   which would produce an infinite inverse-
//                   frequency weight
//   ShapeMismatch — an encoder/model/metrics contract violation
//   Resource      — pretrained tokenizer or backbone unavailable

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load dataset '{path}': {reason}")]
    DataLoad { path: String, reason: String },

    #[error(
        "class {class} has no examples in the training split \
         ({num_labels} classes expected) — cannot compute inverse-frequency weights"
    )]
    ClassCoverage { class: usize, num_labels: usize },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("resource unavailable: {0}")]
    Resource(String),
}

impl PipelineError {
    /// Shorthand for a DataLoad error tied to a source path.
    pub fn data_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataLoad { path: path.into(), reason: reason.into() }
    }
}
