// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a training run:
//
//   Step 1: Load both splits, build vocabularies   (Layer 4 - data)
//   Step 2: Save fields + vocabularies             (Layer 6 - infra)
//   Step 3: Build and save the model config        (Layer 5 - ml / Layer 6)
//   Step 4: Initialise the model on the device     (Layer 5 - ml)
//   Step 5: Run the epoch loop                     (Layer 5 - ml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::data_loader::{DataLoader, DataLoaderConfig};
use crate::domain::device::DeviceTarget;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    vocab_store::{StoredVocab, VocabStore},
};
use crate::ml::{
    backend::{ResolveDevice, TrainBackend},
    model::CnnClassifierConfig,
    trainer::{train, TrainOutcome},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All options of a training run. Saved next to the checkpoint
// as train_config.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub train_path: PathBuf,
    pub valid_path: PathBuf,
    pub model_dir: PathBuf,
    pub batch_size: usize,
    pub device: DeviceTarget,
    pub max_vocab: Option<usize>,
    pub min_freq: usize,
    pub use_eos: bool,
    pub shuffle: bool,
    pub seed: u64,
    pub epochs: usize,
    pub lr: f64,
    /// Stop after this many epochs without a better validation loss
    pub early_stop: Option<usize>,
    pub embedding_dim: usize,
    pub dropout: f64,
    pub window_sizes: Vec<usize>,
    pub num_filters: Vec<usize>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("data/train.tsv"),
            valid_path: PathBuf::from("data/valid.tsv"),
            model_dir: PathBuf::from("models"),
            batch_size: 64,
            device: DeviceTarget::Cpu,
            max_vocab: None,
            min_freq: 1,
            use_eos: false,
            shuffle: true,
            seed: 42,
            epochs: 10,
            lr: 1e-3,
            early_stop: Some(5),
            embedding_dim: 256,
            dropout: 0.5,
            window_sizes: vec![3, 4, 5],
            num_filters: vec![100, 100, 100],
        }
    }
}

impl TrainConfig {
    pub fn loader_config(&self) -> DataLoaderConfig {
        DataLoaderConfig::new(&self.train_path, &self.valid_path)
            .with_batch_size(self.batch_size)
            .with_device(self.device)
            .with_max_vocab(self.max_vocab)
            .with_min_freq(self.min_freq)
            .with_use_eos(self.use_eos)
            .with_shuffle(self.shuffle)
            .with_seed(self.seed)
            .with_min_length(self.window_sizes.iter().copied().max().unwrap_or(1))
    }

    pub fn model_config(&self, vocab_size: usize, num_classes: usize) -> CnnClassifierConfig {
        CnnClassifierConfig::new(vocab_size, self.embedding_dim, num_classes)
            .with_dropout(self.dropout)
            .with_window_sizes(self.window_sizes.clone())
            .with_num_filters(self.num_filters.clone())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train on the default GPU-capable backend.
    pub fn execute(&self) -> Result<TrainOutcome<TrainBackend>> {
        self.execute_on::<TrainBackend>()
    }

    /// Train on any autodiff backend that can resolve the configured device.
    pub fn execute_on<B>(&self) -> Result<TrainOutcome<B>>
    where
        B: burn::tensor::backend::AutodiffBackend + ResolveDevice,
    {
        let cfg = &self.config;
        B::seed(cfg.seed);

        // ── Step 1: Data ──────────────────────────────────────────────────────
        tracing::info!(
            "Loading '{}' and '{}'",
            cfg.train_path.display(),
            cfg.valid_path.display()
        );
        let mut data = DataLoader::<B>::load(&cfg.loader_config())?;

        // ── Step 2: Vocabularies ──────────────────────────────────────────────
        VocabStore::new(&cfg.model_dir).save(&StoredVocab {
            label: data.label.clone(),
            text: data.text.clone(),
            label_vocab: data.label_vocab.as_ref().clone(),
            text_vocab: data.text_vocab.as_ref().clone(),
        })?;

        // ── Step 3: Configs ───────────────────────────────────────────────────
        let model_cfg = cfg.model_config(data.text_vocab.len(), data.num_classes());
        let ckpt = CheckpointManager::new(&cfg.model_dir)?;
        ckpt.save_model_config(&model_cfg)?;
        ckpt.save_train_config(cfg)?;

        // ── Step 4: Model ─────────────────────────────────────────────────────
        let device = B::resolve_device(cfg.device);
        tracing::info!("Using device: {:?}", device);
        let model = model_cfg.init::<B>(&device)?;
        tracing::info!(
            "Model ready: vocab={}, classes={}, windows={:?}, filters={:?}",
            model_cfg.vocab_size,
            model_cfg.num_classes,
            model_cfg.window_sizes,
            model_cfg.num_filters
        );

        // ── Step 5: Epoch loop ────────────────────────────────────────────────
        let metrics = MetricsLogger::new(&cfg.model_dir)?;
        train(cfg, &mut data, model, &ckpt, &metrics)
    }
}
