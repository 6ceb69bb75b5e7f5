// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The data layer and the application layer meet the rest of
// the system through these traits:
//   - TsvLoader implements ExampleSource
//   - ClassifyUseCase implements TextClassifier

use crate::domain::example::Example;
use crate::error::Result;

// ─── ExampleSource ────────────────────────────────────────────────────────────
/// Any component that can produce tokenised examples.
pub trait ExampleSource {
    /// Load every example from this source in file order.
    fn load_all(&self) -> Result<Vec<Example>>;
}

// ─── TextClassifier ───────────────────────────────────────────────────────────
/// A single ranked class prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Probability in [0, 1]
    pub probability: f32,
}

/// Any component that can classify raw lines of text.
pub trait TextClassifier {
    /// Return the `top_k` most probable labels for each input line,
    /// best first.
    fn classify(&self, lines: &[String], top_k: usize) -> anyhow::Result<Vec<Vec<Prediction>>>;
}
