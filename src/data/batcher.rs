// ============================================================
// Layer 4 — Text Batcher
// ============================================================
// Implements Burn's Batcher trait to stack encoded examples
// into tensors on the configured device.
//
//   Input:  Vec of N EncodedExamples of varying length
//   Output: TextBatch { labels: [N], text: [N, L] }
//
// L is the batch's own longest sequence, raised to
// `min_length` (and never below 1). Shorter rows are padded
// on the right with the text field's padding index.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::{backend::AutodiffBackend, TensorData},
};

use crate::data::dataset::EncodedExample;

// ─── TextBatch ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct TextBatch<B: Backend> {
    /// Label indices — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,

    /// Padded token indices — shape: [batch_size, padded_length]
    pub text: Tensor<B, 2, Int>,
}

impl<B: Backend> TextBatch<B> {
    pub fn batch_size(&self) -> usize {
        self.labels.dims()[0]
    }
}

impl<B: AutodiffBackend> TextBatch<B> {
    /// Same batch on the inner backend, for validation without autodiff.
    pub fn inner(self) -> TextBatch<B::InnerBackend> {
        TextBatch {
            labels: self.labels.inner(),
            text: self.text.inner(),
        }
    }
}

// ─── TextBatcher ──────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct TextBatcher<B: Backend> {
    pub device: B::Device,
    pad_index: usize,
    min_length: usize,
}

impl<B: Backend> TextBatcher<B> {
    pub fn new(device: B::Device, pad_index: usize) -> Self {
        Self {
            device,
            pad_index,
            min_length: 1,
        }
    }

    /// Pad every batch to at least `min_length` positions.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length.max(1);
        self
    }

    pub fn pad_index(&self) -> usize {
        self.pad_index
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }
}

impl<B: Backend> Batcher<EncodedExample, TextBatch<B>> for TextBatcher<B> {
    fn batch(&self, items: Vec<EncodedExample>) -> TextBatch<B> {
        let batch_size = items.len();
        let padded_len = items
            .iter()
            .map(EncodedExample::len)
            .max()
            .unwrap_or(0)
            .max(self.min_length);

        // Row-major [batch_size, padded_len], right-padded
        let mut text: Vec<i64> = Vec::with_capacity(batch_size * padded_len);
        for item in &items {
            text.extend(item.tokens.iter().map(|&t| t as i64));
            text.extend(std::iter::repeat(self.pad_index as i64).take(padded_len - item.len()));
        }

        let labels: Vec<i64> = items.iter().map(|item| item.label as i64).collect();

        TextBatch {
            labels: Tensor::<B, 1, Int>::from_data(
                TensorData::new(labels, [batch_size]),
                &self.device,
            ),
            text: Tensor::<B, 2, Int>::from_data(
                TensorData::new(text, [batch_size, padded_len]),
                &self.device,
            ),
        }
    }
}
