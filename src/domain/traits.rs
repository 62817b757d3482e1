// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// By programming against traits instead of concrete types, the
// application layer can swap implementations without changing
// the code that uses them:
//   - TsvLoader implements ExampleSource
//   - a future JsonlLoader could implement it too
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::errors::PipelineError;
use crate::domain::example::Example;

/// Any component that can produce labelled examples for one split.
pub trait ExampleSource {
    /// Load every example from this source, in file order.
    fn load_all(&self) -> Result<Vec<Example>, PipelineError>;
}
