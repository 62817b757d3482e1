use burn::data::dataset::Dataset;

use crate::domain::example::Example;

/// An in-memory split of labelled sentences.
/// Constructed once per split at startup, read-only thereafter.
#[derive(Debug, Clone)]
pub struct EmotionDataset {
    examples: Vec<Example>,
    /// Derived label vector, aligned with `examples` —
    /// kept separately so weighting never re-walks the examples
    labels: Vec<usize>,
}

impl EmotionDataset {
    pub fn new(examples: Vec<Example>) -> Self {
        let labels = examples.iter().map(|e| e.label).collect();
        Self { examples, labels }
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

impl Dataset<Example> for EmotionDataset {
    fn get(&self, index: usize) -> Option<Example> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_align_with_examples() {
        let ds = EmotionDataset::new(vec![
            Example::new("a", 0),
            Example::new("b", 1),
            Example::new("c", 1),
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.labels(), &[0, 1, 1]);
        assert_eq!(ds.get(1).unwrap().text, "b");
        assert!(ds.get(3).is_none());
    }
}
