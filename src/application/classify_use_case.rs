// ============================================================
// Layer 2 — Classify Use Case
// ============================================================
// Loads a trained model directory and labels raw text lines.
// Output per line:
//
//   label1:0.9132 label2:0.0611<TAB>input text

use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, BufRead},
    path::{Path, PathBuf},
};

use crate::domain::{
    device::DeviceTarget,
    traits::{Prediction, TextClassifier},
};
use crate::ml::{backend::InferBackend, inferencer::Inferencer};

pub struct ClassifyUseCase {
    inferencer: Inferencer<InferBackend>,
}

impl ClassifyUseCase {
    pub fn new(model_dir: &Path, device: DeviceTarget, batch_size: usize) -> Result<Self> {
        let inferencer = Inferencer::from_checkpoint(model_dir, device, batch_size)?;
        Ok(Self { inferencer })
    }

    /// Classify every line of `input` (stdin when `None`) and return the
    /// formatted output lines.
    pub fn run(&self, input: Option<&PathBuf>, top_k: usize) -> Result<Vec<String>> {
        let lines = read_lines(input)?;
        tracing::info!("Classifying {} lines", lines.len());
        let predictions = self.classify(&lines, top_k)?;
        Ok(lines
            .iter()
            .zip(&predictions)
            .map(|(line, preds)| format_prediction(line, preds))
            .collect())
    }
}

impl TextClassifier for ClassifyUseCase {
    fn classify(&self, lines: &[String], top_k: usize) -> Result<Vec<Vec<Prediction>>> {
        self.inferencer.predict(lines, top_k)
    }
}

fn read_lines(input: Option<&PathBuf>) -> Result<Vec<String>> {
    let lines = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?
            .lines()
            .map(str::to_string)
            .collect(),
        None => io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<String>>>()
            .context("Cannot read stdin")?,
    };
    Ok(lines)
}

pub fn format_prediction(line: &str, preds: &[Prediction]) -> String {
    let labels: Vec<String> = preds
        .iter()
        .map(|p| format!("{}:{:.4}", p.label, p.probability))
        .collect();
    format!("{}\t{}", labels.join(" "), line)
}
