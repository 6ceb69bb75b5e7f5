use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One example after vocabulary lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedExample {
    pub label: usize,
    pub tokens: Vec<usize>,
}

impl EncodedExample {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

pub struct TextDataset {
    examples: Vec<EncodedExample>,
}

impl TextDataset {
    pub fn new(examples: Vec<EncodedExample>) -> Self {
        Self { examples }
    }

    /// Text length of the example at `index`, the bucketing key.
    pub fn length_of(&self, index: usize) -> usize {
        self.examples.get(index).map_or(0, EncodedExample::len)
    }
}

impl Dataset<EncodedExample> for TextDataset {
    fn get(&self, index: usize) -> Option<EncodedExample> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}
