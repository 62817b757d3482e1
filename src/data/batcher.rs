// ============================================================
// Layer 4 — Emotion Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<Example> into
// GPU-ready tensors. Unlike pipelines that pad every sample to a
// global maximum up front, encoding happens per batch:
//
//   1. Tokenise each raw sentence with the pretrained tokenizer
//   2. Truncate to the backbone's maximum input length
//   3. Pad every sequence to the LONGEST sequence in this batch
//   4. Stack token ids and attention masks into [batch, seq] Int
//      tensors; labels into a [batch] Int tensor
//
// Alignment guarantee: row i of every tensor corresponds to
// items[i]. There is no randomness anywhere in this module.
//
// The Batcher trait returns the batch by value with no error
// channel, so a tokenisation failure aborts the run — consistent
// with the pipeline's no-partial-failure model.
//
// Reference: Burn Book §4 (Batcher)

use std::sync::Arc;

use burn::{data::dataloader::batcher::Batcher, prelude::*};
use tokenizers::Tokenizer;

use crate::domain::example::Example;

// ─── EmotionBatch ─────────────────────────────────────────────────────────────
/// One encoded batch, ready for the model forward pass.
/// All tensors have batch_size as their first dimension.
#[derive(Debug, Clone)]
pub struct EmotionBatch<B: Backend> {
    /// Token id sequences — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// Attention masks — shape: [batch_size, seq_len]
    /// 1 = real token, 0 = padding
    pub attention_mask: Tensor<B, 2, Int>,

    /// Ground-truth class labels — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── EmotionBatcher ───────────────────────────────────────────────────────────
#[derive(Clone)]
pub struct EmotionBatcher<B: Backend> {
    /// Pretrained tokenizer shared across loader worker threads
    tokenizer:   Arc<Tokenizer>,
    /// Hard upper bound on sequence length (backbone limit)
    max_seq_len: usize,
    pad_id:      u32,
    device:      B::Device,
}

impl<B: Backend> EmotionBatcher<B> {
    pub fn new(tokenizer: Arc<Tokenizer>, max_seq_len: usize, device: B::Device) -> Self {
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);
        Self { tokenizer, max_seq_len, pad_id, device }
    }
}

impl<B: Backend> Batcher<Example, EmotionBatch<B>> for EmotionBatcher<B> {
    fn batch(&self, items: Vec<Example>) -> EmotionBatch<B> {
        let batch_size = items.len();

        // ── Tokenise + truncate ───────────────────────────────────────────────
        let mut sequences: Vec<Vec<u32>> = Vec::with_capacity(batch_size);
        for item in &items {
            let encoding = self
                .tokenizer
                .encode(item.text.as_str(), true)
                .unwrap_or_else(|e| panic!("tokenisation failed for '{}': {e}", item.text));
            let mut ids = encoding.get_ids().to_vec();
            ids.truncate(self.max_seq_len);
            sequences.push(ids);
        }

        // Pad to the longest sequence in THIS batch
        let seq_len = sequences.iter().map(Vec::len).max().unwrap_or(1).max(1);

        // ── Flatten ids and masks row-major ───────────────────────────────────
        let mut input_flat: Vec<i32> = Vec::with_capacity(batch_size * seq_len);
        let mut mask_flat:  Vec<i32> = Vec::with_capacity(batch_size * seq_len);

        for ids in &sequences {
            for &id in ids {
                input_flat.push(id as i32);
                mask_flat.push(1);
            }
            for _ in ids.len()..seq_len {
                input_flat.push(self.pad_id as i32);
                mask_flat.push(0);
            }
        }

        let labels_flat: Vec<i32> = items.iter().map(|e| e.label as i32).collect();

        // ── Create tensors ────────────────────────────────────────────────────
        let input_ids = Tensor::<B, 1, Int>::from_ints(input_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let attention_mask = Tensor::<B, 1, Int>::from_ints(mask_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels_flat.as_slice(), &self.device);

        EmotionBatch { input_ids, attention_mask, labels }
    }
}

// ─── Test Support ─────────────────────────────────────────────────────────────
// A minimal word-level tokenizer in the same JSON layout the pretrained
// tokenizer.json ships with. Shared with the evaluator tests.
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn toy_tokenizer() -> Arc<Tokenizer> {
        let json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0, "content": "[PAD]", "single_word": false, "lstrip": false,
                 "rstrip": false, "normalized": false, "special": true},
                {"id": 1, "content": "[UNK]", "single_word": false, "lstrip": false,
                 "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": null,
            "pre_tokenizer": {"type": "Whitespace"},
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": {"[PAD]": 0, "[UNK]": 1, "a": 2, "b": 3, "c": 4, "d": 5},
                "unk_token": "[UNK]"
            }
        });
        Arc::new(
            Tokenizer::from_bytes(serde_json::to_vec(&json).unwrap())
                .expect("valid tokenizer json"),
        )
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::test_support::toy_tokenizer;
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn ints(t: Tensor<TestBackend, 2, Int>) -> Vec<i64> {
        t.into_data().convert::<i64>().to_vec::<i64>().unwrap()
    }

    #[test]
    fn test_pads_to_longest_in_batch() {
        let batcher =
            EmotionBatcher::<TestBackend>::new(toy_tokenizer(), 16, Default::default());
        let batch = batcher.batch(vec![
            Example::new("a", 0),
            Example::new("a b c", 1),
        ]);

        assert_eq!(batch.input_ids.dims(), [2, 3]);
        assert_eq!(batch.attention_mask.dims(), [2, 3]);
        // Row 0 padded with [PAD]=0; row 1 full
        assert_eq!(ints(batch.input_ids), vec![2, 0, 0, 2, 3, 4]);
        assert_eq!(ints(batch.attention_mask), vec![1, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_labels_align_with_rows() {
        let batcher =
            EmotionBatcher::<TestBackend>::new(toy_tokenizer(), 16, Default::default());
        let batch = batcher.batch(vec![
            Example::new("a b", 1),
            Example::new("c", 0),
            Example::new("d d", 3),
        ]);
        assert_eq!(batch.labels.dims(), [3]);
        let labels = batch
            .labels
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .unwrap();
        assert_eq!(labels, vec![1, 0, 3]);
    }

    #[test]
    fn test_truncates_to_max_seq_len() {
        let batcher =
            EmotionBatcher::<TestBackend>::new(toy_tokenizer(), 2, Default::default());
        let batch = batcher.batch(vec![Example::new("a b c d", 0)]);
        assert_eq!(batch.input_ids.dims(), [1, 2]);
        assert_eq!(ints(batch.input_ids), vec![2, 3]);
    }

    #[test]
    fn test_batch_size_preserved() {
        let batcher =
            EmotionBatcher::<TestBackend>::new(toy_tokenizer(), 8, Default::default());
        let items: Vec<Example> = (0..5).map(|i| Example::new("a b", i % 2)).collect();
        let batch = batcher.batch(items);
        assert_eq!(batch.input_ids.dims()[0], 5);
        assert_eq!(batch.labels.dims(), [5]);
    }
}
