// ============================================================
// Layer 4 — TSV Loader
// ============================================================
// Loads labelled sentences from a tab-separated file with a
// header row. The caller names the text column and the label
// column (the task provides a default label column).
//
// Every failure here is a DataLoad error and aborts the run:
//   - file missing or unreadable
//   - named column absent from the header
//   - label not an integer, or outside the task's class range
//
// Reading has no side effects beyond the file read; row order
// is preserved exactly.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use crate::domain::errors::PipelineError;
use crate::domain::example::Example;
use crate::domain::traits::ExampleSource;

pub struct TsvLoader {
    path:         PathBuf,
    text_column:  String,
    label_column: String,
    /// Labels must fall in 0..num_labels
    num_labels:   usize,
}

impl TsvLoader {
    pub fn new(
        path:         impl Into<PathBuf>,
        text_column:  impl Into<String>,
        label_column: impl Into<String>,
        num_labels:   usize,
    ) -> Self {
        Self {
            path:         path.into(),
            text_column:  text_column.into(),
            label_column: label_column.into(),
            num_labels,
        }
    }

    /// Parse examples from any reader. Split out from load_all so the
    /// parsing rules are testable from in-memory strings.
    fn parse<R: Read>(&self, reader: R) -> Result<Vec<Example>, PipelineError> {
        let path = self.path.display().to_string();

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(reader);

        // ── Resolve column indices from the header row ────────────────────────
        let headers = rdr
            .headers()
            .map_err(|e| PipelineError::data_load(&path, format!("cannot read header: {e}")))?
            .clone();

        let col_index = |name: &str| -> Result<usize, PipelineError> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                PipelineError::data_load(
                    &path,
                    format!("missing column '{name}' (header: {headers:?})"),
                )
            })
        };

        let text_idx  = col_index(&self.text_column)?;
        let label_idx = col_index(&self.label_column)?;

        // ── Read rows in order ────────────────────────────────────────────────
        let mut examples = Vec::new();

        for (row, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| {
                PipelineError::data_load(&path, format!("row {}: {e}", row + 1))
            })?;

            let text = record.get(text_idx).ok_or_else(|| {
                PipelineError::data_load(&path, format!("row {}: no text field", row + 1))
            })?;

            let raw_label = record.get(label_idx).ok_or_else(|| {
                PipelineError::data_load(&path, format!("row {}: no label field", row + 1))
            })?;

            let label: usize = raw_label.trim().parse().map_err(|_| {
                PipelineError::data_load(
                    &path,
                    format!("row {}: label '{raw_label}' is not an integer", row + 1),
                )
            })?;

            if label >= self.num_labels {
                return Err(PipelineError::data_load(
                    &path,
                    format!(
                        "row {}: label {label} out of range (expected 0..{})",
                        row + 1,
                        self.num_labels
                    ),
                ));
            }

            examples.push(Example::new(text, label));
        }

        tracing::info!("Loaded {} examples from '{}'", examples.len(), path);
        Ok(examples)
    }
}

impl ExampleSource for TsvLoader {
    fn load_all(&self) -> Result<Vec<Example>, PipelineError> {
        let path = self.path.display().to_string();
        let file = File::open(&self.path)
            .map_err(|e| PipelineError::data_load(&path, e.to_string()))?;
        self.parse(file)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn loader(num_labels: usize) -> TsvLoader {
        TsvLoader::new("test.tsv", "sentence", "gap", num_labels)
    }

    #[test]
    fn test_parses_rows_in_order() {
        let tsv = "sentence\tgap\n今日は楽しい\t0\n本当に腹が立つ\t1\n";
        let examples = loader(2).parse(tsv.as_bytes()).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].text, "今日は楽しい");
        assert_eq!(examples[0].label, 0);
        assert_eq!(examples[1].label, 1);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let tsv = "id\tsentence\tgap\tintensity\n7\thello\t1\t3\n";
        let examples = loader(2).parse(tsv.as_bytes()).unwrap();
        assert_eq!(examples[0].text, "hello");
        assert_eq!(examples[0].label, 1);
    }

    #[test]
    fn test_missing_label_column_fails() {
        let tsv = "sentence\tintensity\nhello\t2\n";
        let err = loader(2).parse(tsv.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::DataLoad { .. }));
        assert!(err.to_string().contains("missing column 'gap'"));
    }

    #[test]
    fn test_non_integer_label_fails() {
        let tsv = "sentence\tgap\nhello\thigh\n";
        let err = loader(2).parse(tsv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("not an integer"));
    }

    #[test]
    fn test_out_of_range_label_fails() {
        let tsv = "sentence\tgap\nhello\t3\n";
        let err = loader(2).parse(tsv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_missing_file_fails() {
        let l = TsvLoader::new("/no/such/dir/train.tsv", "sentence", "gap", 2);
        assert!(matches!(
            l.load_all().unwrap_err(),
            PipelineError::DataLoad { .. }
        ));
    }
}
