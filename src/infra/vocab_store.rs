// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Persists the fields and vocabularies built at training time
// so inference encodes text exactly the way training did.
//
// File: {model_dir}/vocab.json
//   { "label": Field, "text": Field,
//     "label_vocab": Vocabulary, "text_vocab": Vocabulary }

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::data::{field::Field, vocab::Vocabulary};

/// Everything needed to encode raw text for a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredVocab {
    pub label: Field,
    pub text: Field,
    pub label_vocab: Vocabulary,
    pub text_vocab: Vocabulary,
}

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join("vocab.json")
    }

    pub fn save(&self, vocab: &StoredVocab) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.path();
        fs::write(&path, serde_json::to_string(vocab)?)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))?;
        tracing::debug!(
            "Saved {} labels / {} tokens to '{}'",
            vocab.label_vocab.len(),
            vocab.text_vocab.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load(&self) -> Result<StoredVocab> {
        let path = self.path();
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read vocabulary from '{}'. Have you run 'train' first?",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}
