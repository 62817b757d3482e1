// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Loads the pretrained tokenizer that ships with the Japanese
// backbone. The pipeline never trains a vocabulary of its own:
// fine-tuning only makes sense with the exact tokenizer the
// backbone was pretrained with, so a missing or malformed
// tokenizer.json is a fatal resource error, not something to
// paper over with a fresh vocabulary.
//
// Reference: HuggingFace tokenizers (serialised JSON format)

use std::{path::PathBuf, sync::Arc};
use tokenizers::Tokenizer;

use crate::domain::errors::PipelineError;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the pretrained tokenizer from {dir}/tokenizer.json.
    pub fn load(&self) -> Result<Arc<Tokenizer>, PipelineError> {
        let path = self.dir.join("tokenizer.json");

        if !path.exists() {
            return Err(PipelineError::Resource(format!(
                "pretrained tokenizer not found at '{}'",
                path.display()
            )));
        }

        let tokenizer = Tokenizer::from_file(&path).map_err(|e| {
            PipelineError::Resource(format!(
                "cannot load tokenizer from '{}': {e}",
                path.display()
            ))
        })?;

        tracing::info!(
            "Loaded tokenizer from '{}' (vocab size {})",
            path.display(),
            tokenizer.get_vocab_size(true)
        );
        Ok(Arc::new(tokenizer))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tokenizer_is_resource_error() {
        let store = TokenizerStore::new("/nonexistent/model/dir");
        let err = store.load().unwrap_err();
        assert!(matches!(err, PipelineError::Resource(_)));
    }
}
