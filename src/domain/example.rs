use serde::{Deserialize, Serialize};

/// One labelled sentence from a dataset split.
/// Immutable once loaded — the pipeline never rewrites examples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    /// The raw sentence text, exactly as read from the TSV
    pub text: String,

    /// The integer class label.
    /// {0,1} for the gap task, {0,1,2,3} for the intensity task
    pub label: usize,
}

impl Example {
    /// Create a new Example.
    /// Uses impl Into<String> so callers can pass &str or String.
    pub fn new(text: impl Into<String>, label: usize) -> Self {
        Self { text: text.into(), label }
    }
}
