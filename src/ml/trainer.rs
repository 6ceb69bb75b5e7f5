// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Epoch loop with Adam over the bucketed train iterator.
//
//   - training passes use the autodiff backend B with dropout on
//   - model.valid() moves the model to B::InnerBackend for
//     evaluation; dropout is switched off on that copy
//   - validation batches are moved with TextBatch::inner()
//   - loss = mean negative log-likelihood of the true labels
//     under the model's log-probabilities

use anyhow::Result;
use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{backend::AutodiffBackend, ElementConversion},
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::TextBatch, data_loader::DataLoader};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{
    backend::ResolveDevice,
    model::{nll_loss, CnnClassifier},
};

/// Result of a finished training run.
pub struct TrainOutcome<B: Backend> {
    /// Model after the last completed epoch
    pub model: CnnClassifier<B>,
    pub history: Vec<EpochMetrics>,
    pub best_valid_loss: f64,
}

pub fn train<B>(
    cfg: &TrainConfig,
    data: &mut DataLoader<B>,
    mut model: CnnClassifier<B>,
    ckpt: &CheckpointManager,
    metrics: &MetricsLogger,
) -> Result<TrainOutcome<B>>
where
    B: AutodiffBackend + ResolveDevice,
{
    let mut optim = AdamConfig::new().init::<B, CnnClassifier<B>>();

    let mut history = Vec::with_capacity(cfg.epochs);
    let mut best_valid_loss = f64::INFINITY;
    let mut stale_epochs = 0usize;

    for epoch in 1..=cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        model.set_training(true);
        let mut loss_sum = 0.0f64;
        let mut batches = 0usize;

        for batch in data.train_iter.iter() {
            let (loss, _) = model.forward_loss(batch.text, batch.labels)?;
            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }
        let train_loss = if batches > 0 {
            loss_sum / batches as f64
        } else {
            f64::NAN
        };

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid().with_training(false);
        let (valid_loss, valid_accuracy) =
            evaluate(&model_valid, data.valid_iter.iter().map(TextBatch::inner))?;

        let m = EpochMetrics::new(epoch, train_loss, valid_loss, valid_accuracy);
        metrics.log(&m)?;
        tracing::info!(
            "Epoch {:>3}/{} | train_loss={:.4} | valid_loss={:.4} | valid_acc={:.1}%",
            epoch,
            cfg.epochs,
            train_loss,
            valid_loss,
            valid_accuracy * 100.0,
        );

        if m.is_improvement(best_valid_loss) {
            best_valid_loss = valid_loss;
            stale_epochs = 0;
            ckpt.save_model(&model)?;
            tracing::info!("Validation loss improved; checkpoint saved");
        } else {
            stale_epochs += 1;
        }
        history.push(m);

        if cfg.early_stop.is_some_and(|limit| stale_epochs >= limit) {
            tracing::info!("No improvement for {} epochs, stopping early", stale_epochs);
            break;
        }
    }

    tracing::info!("Training complete. Best valid_loss={:.4}", best_valid_loss);
    model.set_training(false);
    Ok(TrainOutcome {
        model,
        history,
        best_valid_loss,
    })
}

/// Mean batch loss and accuracy of `model` over `batches`.
pub fn evaluate<B: Backend>(
    model: &CnnClassifier<B>,
    batches: impl Iterator<Item = TextBatch<B>>,
) -> Result<(f64, f64)> {
    let mut loss_sum = 0.0f64;
    let mut num_batches = 0usize;
    let mut correct = 0usize;
    let mut total = 0usize;

    for batch in batches {
        total += batch.batch_size();
        let log_probs = model.forward(batch.text)?;

        // argmax(1) returns [batch, 1]; flatten to compare with labels
        let predicted = log_probs.clone().argmax(1).flatten::<1>(0, 1);
        let hits: i64 = predicted
            .equal(batch.labels.clone())
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>();
        correct += hits as usize;

        loss_sum += nll_loss(log_probs, batch.labels).into_scalar().elem::<f64>();
        num_batches += 1;
    }

    let loss = if num_batches > 0 {
        loss_sum / num_batches as f64
    } else {
        f64::NAN
    };
    let accuracy = if total > 0 {
        correct as f64 / total as f64
    } else {
        0.0
    };
    Ok((loss, accuracy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainUseCase;
    use burn::backend::{Autodiff, NdArray};
    use std::{fs, path::Path};

    type TestBackend = Autodiff<NdArray>;

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn tiny_config(dir: &Path) -> TrainConfig {
        let train = "pos\tgood great fine\npos\tgreat fun\nneg\tbad awful\nneg\tawful boring bad\n";
        let valid = "pos\tgood fun\nneg\tbad boring\n";
        TrainConfig {
            train_path: write(dir, "train.tsv", train),
            valid_path: write(dir, "valid.tsv", valid),
            model_dir: dir.join("model"),
            batch_size: 2,
            epochs: 2,
            early_stop: None,
            embedding_dim: 8,
            window_sizes: vec![1, 2],
            num_filters: vec![4, 4],
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_runs_every_epoch_and_logs_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        let outcome = TrainUseCase::new(cfg.clone()).execute_on::<TestBackend>().unwrap();

        assert_eq!(outcome.history.len(), 2);
        for m in &outcome.history {
            assert!(m.train_loss.is_finite());
            assert!(m.valid_loss.is_finite());
            assert!((0.0..=1.0).contains(&m.valid_accuracy));
        }
        assert!(outcome.best_valid_loss.is_finite());
        assert!(!outcome.model.is_training());

        let csv = fs::read_to_string(cfg.model_dir.join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(cfg.model_dir.join("vocab.json").exists());
        assert!(cfg.model_dir.join("model_config.json").exists());
    }

    #[test]
    fn test_early_stop_bounds_epochs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            epochs: 50,
            lr: 0.0,
            early_stop: Some(1),
            ..tiny_config(dir.path())
        };
        // With a zero learning rate nothing improves after the first epoch
        let outcome = TrainUseCase::new(cfg).execute_on::<TestBackend>().unwrap();
        assert!(outcome.history.len() <= 3, "{} epochs", outcome.history.len());
    }

    #[test]
    fn test_evaluate_empty_is_nan_loss() {
        let model = crate::ml::model::CnnClassifierConfig::new(4, 2, 2)
            .init::<NdArray>(&Default::default())
            .unwrap();
        let (loss, acc) = evaluate(&model, std::iter::empty()).unwrap();
        assert!(loss.is_nan());
        assert_eq!(acc, 0.0);
    }
}
