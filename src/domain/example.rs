// ============================================================
// Layer 3 — Example Domain Type
// ============================================================
// One line of a `label<TAB>text` file after tokenisation.
// The label is kept as a single raw token; the text is the
// token sequence produced by the text field (including the
// end-of-sequence marker when that is enabled).

use serde::{Deserialize, Serialize};

/// A tokenised (label, text) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// 1-based line number in the source file, kept for diagnostics
    pub line: usize,

    /// The categorical label token
    pub label: String,

    /// Text tokens in reading order
    pub text: Vec<String>,
}

impl Example {
    pub fn new(line: usize, label: impl Into<String>, text: Vec<String>) -> Self {
        Self {
            line,
            label: label.into(),
            text,
        }
    }

    /// Number of text tokens, the key used for length bucketing
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
