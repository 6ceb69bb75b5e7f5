// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds a trained classifier and ranks labels for raw lines.
//
//   raw line → text field tokens → text vocabulary ids (<unk> fallback)
//            → padded batch → forward → exp(log-probs) → top-k labels

use anyhow::{Context, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*};
use std::path::Path;

use crate::data::{batcher::TextBatcher, dataset::EncodedExample};
use crate::domain::{device::DeviceTarget, traits::Prediction};
use crate::infra::{
    checkpoint::CheckpointManager,
    vocab_store::{StoredVocab, VocabStore},
};
use crate::ml::{backend::ResolveDevice, model::CnnClassifier};

pub struct Inferencer<B: Backend> {
    model: CnnClassifier<B>,
    vocab: StoredVocab,
    batcher: TextBatcher<B>,
    batch_size: usize,
}

impl<B: Backend> Inferencer<B> {
    /// `model` is switched to inference mode.
    pub fn new(
        model: CnnClassifier<B>,
        vocab: StoredVocab,
        batcher: TextBatcher<B>,
        batch_size: usize,
    ) -> Self {
        Self {
            model: model.with_training(false),
            vocab,
            batcher,
            batch_size: batch_size.max(1),
        }
    }

    pub fn labels(&self) -> &[String] {
        self.vocab.label_vocab.tokens()
    }

    /// Top `top_k` labels per line, most probable first.
    pub fn predict(&self, lines: &[String], top_k: usize) -> Result<Vec<Vec<Prediction>>> {
        let mut predictions = Vec::with_capacity(lines.len());
        for chunk in lines.chunks(self.batch_size) {
            predictions.extend(self.predict_batch(chunk, top_k)?);
        }
        Ok(predictions)
    }

    fn predict_batch(&self, lines: &[String], top_k: usize) -> Result<Vec<Vec<Prediction>>> {
        let text = &self.vocab.text;
        let items = lines
            .iter()
            .map(|line| -> Result<EncodedExample> {
                let tokens = text.encode(&text.tokenize(line), &self.vocab.text_vocab)?;
                Ok(EncodedExample { label: 0, tokens })
            })
            .collect::<Result<Vec<_>>>()?;

        let batch = self.batcher.batch(items);
        let probs = self.model.forward(batch.text)?.exp();
        let [_, num_classes] = probs.dims();
        let values = probs
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read probabilities: {e:?}"))?;

        Ok(values
            .chunks(num_classes)
            .map(|row| self.rank(row, top_k))
            .collect())
    }

    fn rank(&self, row: &[f32], top_k: usize) -> Vec<Prediction> {
        let mut ranked: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(top_k);
        ranked
            .into_iter()
            .map(|(index, probability)| Prediction {
                label: self
                    .vocab
                    .label_vocab
                    .token(index)
                    .map_or_else(|| index.to_string(), str::to_string),
                probability,
            })
            .collect()
    }
}

impl<B: ResolveDevice> Inferencer<B> {
    /// Load the model, configs and vocabularies saved in `model_dir`.
    pub fn from_checkpoint(model_dir: &Path, target: DeviceTarget, batch_size: usize) -> Result<Self> {
        let device = B::resolve_device(target);
        let ckpt = CheckpointManager::new(model_dir)?;
        let cfg = ckpt.load_model_config()?;
        let model = ckpt.load_model(cfg.init::<B>(&device)?, &device)?;
        let vocab = VocabStore::new(model_dir).load()?;

        let pad_index = vocab
            .text_vocab
            .pad_index()
            .context("Saved text vocabulary has no padding token")?;
        let batcher = TextBatcher::new(device, pad_index).with_min_length(cfg.min_length());

        tracing::info!(
            "Model loaded from '{}' ({} classes)",
            model_dir.display(),
            vocab.label_vocab.len()
        );
        Ok(Self::new(model, vocab, batcher, batch_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::field::Field;
    use crate::ml::model::CnnClassifierConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn inferencer(batch_size: usize) -> Inferencer<TestBackend> {
        let label = Field::label();
        let text = Field::text(false);
        let label_vocab = label.build_vocab(
            [["pos".to_string()], ["neg".to_string()], ["neu".to_string()]],
            None,
            1,
        );
        let text_vocab = text.build_vocab([text.tokenize("good bad okay film")], None, 1);

        let cfg = CnnClassifierConfig::new(text_vocab.len(), 6, label_vocab.len())
            .with_window_sizes(vec![2, 3])
            .with_num_filters(vec![4, 4]);
        let model = cfg.init::<TestBackend>(&Default::default()).unwrap();
        let batcher = TextBatcher::new(Default::default(), text_vocab.pad_index().unwrap())
            .with_min_length(cfg.min_length());

        let vocab = StoredVocab {
            label,
            text,
            label_vocab,
            text_vocab,
        };
        Inferencer::new(model, vocab, batcher, batch_size)
    }

    #[test]
    fn test_ranks_labels_best_first() {
        let inf = inferencer(8);
        let lines = vec!["good film".to_string(), "unseen words only".to_string()];
        let preds = inf.predict(&lines, 3).unwrap();

        assert_eq!(preds.len(), 2);
        for row in &preds {
            assert_eq!(row.len(), 3);
            assert!(row.windows(2).all(|w| w[0].probability >= w[1].probability));
            let total: f32 = row.iter().map(|p| p.probability).sum();
            assert!((total - 1.0).abs() < 1e-4);
            for p in row {
                assert!(inf.labels().contains(&p.label));
            }
        }
    }

    #[test]
    fn test_top_k_truncates() {
        let inf = inferencer(8);
        let preds = inf.predict(&["okay".to_string()], 1).unwrap();
        assert_eq!(preds[0].len(), 1);
    }

    #[test]
    fn test_chunks_preserve_line_order() {
        let lines: Vec<String> = ["good", "bad film", "", "okay okay okay", "film"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let whole = inferencer(8);
        let chunked = Inferencer {
            batch_size: 2,
            ..whole
        };
        let preds = chunked.predict(&lines, 3).unwrap();
        assert_eq!(preds.len(), lines.len());
    }
}
