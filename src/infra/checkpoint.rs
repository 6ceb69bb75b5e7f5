// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// File layout:
//   {model_dir}/
//     model.mpk.gz        ← weights of the best epoch so far
//     model_config.json   ← CnnClassifierConfig (architecture)
//     train_config.json   ← full TrainConfig of the run
//     vocab.json          ← written by VocabStore
//
// The architecture config must be loaded first: the model is
// rebuilt from it and the weights are loaded into that shell.

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{CnnClassifier, CnnClassifierConfig};

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Save model weights, replacing the previous checkpoint.
    pub fn save_model<B: Backend>(&self, model: &CnnClassifier<B>) -> Result<()> {
        // The recorder adds the file extension
        let path = self.dir.join("model");
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .map_err(|e| anyhow::anyhow!("Failed to save checkpoint to '{}': {e:?}", path.display()))?;
        tracing::debug!("Saved checkpoint to '{}'", path.display());
        Ok(())
    }

    /// Load saved weights into `model`, which must have the saved architecture.
    pub fn load_model<B: Backend>(
        &self,
        model: CnnClassifier<B>,
        device: &B::Device,
    ) -> Result<CnnClassifier<B>> {
        let path = self.dir.join("model");
        let record = CompactRecorder::new().load(path.clone(), device).map_err(|e| {
            anyhow::anyhow!(
                "Cannot load checkpoint '{}'. Have you trained the model first? ({e:?})",
                path.display()
            )
        })?;
        Ok(model.load_record(record))
    }

    pub fn save_model_config(&self, cfg: &CnnClassifierConfig) -> Result<()> {
        let path = self.dir.join("model_config.json");
        cfg.save(&path)
            .with_context(|| format!("Cannot write model config to '{}'", path.display()))?;
        Ok(())
    }

    pub fn load_model_config(&self) -> Result<CnnClassifierConfig> {
        let path = self.dir.join("model_config.json");
        CnnClassifierConfig::load(&path).map_err(|e| {
            anyhow::anyhow!("Cannot read model config from '{}': {e:?}", path.display())
        })
    }

    pub fn save_train_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    type TestBackend = NdArray;

    #[test]
    fn test_model_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();

        let cfg = CnnClassifierConfig::new(12, 6, 2)
            .with_window_sizes(vec![2, 3])
            .with_num_filters(vec![3, 3]);
        let model = cfg.init::<TestBackend>(&device).unwrap().with_training(false);
        ckpt.save_model_config(&cfg).unwrap();
        ckpt.save_model(&model).unwrap();

        let loaded_cfg = ckpt.load_model_config().unwrap();
        assert_eq!(loaded_cfg.window_sizes, vec![2, 3]);
        let fresh = loaded_cfg.init::<TestBackend>(&device).unwrap().with_training(false);
        let restored = ckpt.load_model(fresh, &device).unwrap();

        let tokens = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![1i64, 2, 3, 4], [1, 4]),
            &device,
        );
        let a = model.forward(tokens.clone()).unwrap().into_data().to_vec::<f32>().unwrap();
        let b = restored.forward(tokens).unwrap().into_data().to_vec::<f32>().unwrap();
        // CompactRecorder stores half precision
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-2, "{x} vs {y}");
        }
    }

    #[test]
    fn test_train_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let cfg = TrainConfig::default();
        ckpt.save_train_config(&cfg).unwrap();
        let json = fs::read_to_string(dir.path().join("train_config.json")).unwrap();
        let loaded: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_missing_checkpoint_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let model = CnnClassifierConfig::new(5, 2, 2)
            .init::<TestBackend>(&Default::default())
            .unwrap();
        assert!(ckpt.load_model(model, &Default::default()).is_err());
        assert!(ckpt.load_model_config().is_err());
    }
}
