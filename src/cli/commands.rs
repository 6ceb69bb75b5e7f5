// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Two subcommands: `train` and `classify`.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use text_cnn::application::train_use_case::TrainConfig;
use text_cnn::domain::device::DeviceTarget;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the classifier on tab-separated label/text files
    Train(TrainArgs),

    /// Label raw text lines with a trained model
    Classify(ClassifyArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Training file, one `label<TAB>text` example per line
    #[arg(long)]
    pub train_path: PathBuf,

    /// Validation file in the same format
    #[arg(long)]
    pub valid_path: PathBuf,

    /// Directory for the checkpoint, configs, vocabularies and metrics
    #[arg(long, default_value = "models")]
    pub model_dir: PathBuf,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// `cpu`, `-1`, `gpu:N`, `cuda:N` or a device id
    #[arg(long, default_value = "cpu")]
    pub device: DeviceTarget,

    /// Maximum number of text tokens kept (unbounded when omitted)
    #[arg(long)]
    pub max_vocab: Option<usize>,

    /// Minimum token frequency to enter the vocabulary
    #[arg(long, default_value_t = 1)]
    pub min_freq: usize,

    /// Append <EOS> to every text
    #[arg(long)]
    pub use_eos: bool,

    /// Keep batch order fixed between epochs
    #[arg(long)]
    pub no_shuffle: bool,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Stop after this many epochs without a better validation loss
    #[arg(long)]
    pub early_stop: Option<usize>,

    #[arg(long, default_value_t = 256)]
    pub embedding_dim: usize,

    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Comma-separated convolution window sizes
    #[arg(long, value_delimiter = ',', default_values_t = [3, 4, 5])]
    pub window_sizes: Vec<usize>,

    /// Comma-separated filter counts, one per window size
    #[arg(long, value_delimiter = ',', default_values_t = [100, 100, 100])]
    pub num_filters: Vec<usize>,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            train_path: a.train_path,
            valid_path: a.valid_path,
            model_dir: a.model_dir,
            batch_size: a.batch_size,
            device: a.device,
            max_vocab: a.max_vocab,
            min_freq: a.min_freq,
            use_eos: a.use_eos,
            shuffle: !a.no_shuffle,
            seed: a.seed,
            epochs: a.epochs,
            lr: a.lr,
            early_stop: a.early_stop,
            embedding_dim: a.embedding_dim,
            dropout: a.dropout,
            window_sizes: a.window_sizes,
            num_filters: a.num_filters,
        }
    }
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Directory written by `train`
    #[arg(long, default_value = "models")]
    pub model_dir: PathBuf,

    /// File with one text per line (stdin when omitted)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Number of labels printed per line
    #[arg(long, default_value_t = 1)]
    pub top_k: usize,

    #[arg(long, default_value = "cpu")]
    pub device: DeviceTarget,

    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,
}
