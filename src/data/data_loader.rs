// ============================================================
// Layer 4 — Data Loader
// ============================================================
// Composes the pipeline for one train/valid pair of files:
//
//   read both files (TsvLoader)
//       → build label / text vocabularies from the TRAIN split only
//       → encode both splits (unseen valid labels are fatal)
//       → wrap in TextDataset
//       → one BucketIterator per split, sharing the vocabularies
//
// Everything that can fail does so here, before the first
// batch is produced.

use std::{path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::data::{
    batcher::TextBatcher,
    dataset::{EncodedExample, TextDataset},
    field::Field,
    iterator::{BucketIterator, BucketPolicy},
    loader::TsvLoader,
    vocab::Vocabulary,
};
use crate::domain::{device::DeviceTarget, example::Example, traits::ExampleSource};
use crate::error::{Error, Result};
use crate::ml::backend::ResolveDevice;

/// Options for loading one train/valid pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataLoaderConfig {
    pub train_path: PathBuf,
    pub valid_path: PathBuf,
    pub batch_size: usize,
    pub device: DeviceTarget,
    /// Maximum number of non-special text tokens; `None` is unbounded
    pub max_vocab: Option<usize>,
    pub min_freq: usize,
    pub use_eos: bool,
    pub shuffle: bool,
    pub seed: u64,
    /// Minimum padded width of a text batch
    pub min_length: usize,
}

impl DataLoaderConfig {
    pub fn new(train_path: impl Into<PathBuf>, valid_path: impl Into<PathBuf>) -> Self {
        Self {
            train_path: train_path.into(),
            valid_path: valid_path.into(),
            batch_size: 64,
            device: DeviceTarget::Cpu,
            max_vocab: None,
            min_freq: 1,
            use_eos: false,
            shuffle: true,
            seed: 42,
            min_length: 1,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_device(mut self, device: DeviceTarget) -> Self {
        self.device = device;
        self
    }

    pub fn with_max_vocab(mut self, max_vocab: Option<usize>) -> Self {
        self.max_vocab = max_vocab;
        self
    }

    pub fn with_min_freq(mut self, min_freq: usize) -> Self {
        self.min_freq = min_freq;
        self
    }

    pub fn with_use_eos(mut self, use_eos: bool) -> Self {
        self.use_eos = use_eos;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }
}

/// Train/valid iterators plus the fields and vocabularies that produced them.
pub struct DataLoader<B: ResolveDevice> {
    pub label: Field,
    pub text: Field,
    pub label_vocab: Arc<Vocabulary>,
    pub text_vocab: Arc<Vocabulary>,
    pub train_iter: BucketIterator<B>,
    pub valid_iter: BucketIterator<B>,
}

impl<B: ResolveDevice> DataLoader<B> {
    pub fn load(cfg: &DataLoaderConfig) -> Result<Self> {
        if cfg.batch_size == 0 {
            return Err(Error::Config("batch size must be positive".into()));
        }

        let label = Field::label();
        let text = Field::text(cfg.use_eos);

        let train = TsvLoader::new(&cfg.train_path, label.clone(), text.clone()).load_all()?;
        let valid = TsvLoader::new(&cfg.valid_path, label.clone(), text.clone()).load_all()?;
        tracing::info!(
            "Loaded {} train / {} valid examples",
            train.len(),
            valid.len()
        );
        for (path, examples) in [(&cfg.train_path, &train), (&cfg.valid_path, &valid)] {
            if examples.is_empty() {
                return Err(Error::Config(format!(
                    "'{}' contains no examples",
                    path.display()
                )));
            }
        }

        let label_vocab = label.build_vocab(
            train.iter().map(|ex| std::slice::from_ref(&ex.label)),
            None,
            1,
        );
        let text_vocab = text.build_vocab(
            train.iter().map(|ex| ex.text.as_slice()),
            cfg.max_vocab,
            cfg.min_freq,
        );
        tracing::info!(
            "Vocabulary sizes: {} labels, {} text tokens",
            label_vocab.len(),
            text_vocab.len()
        );

        let train = encode_split(&cfg.train_path, &train, &label, &label_vocab, &text, &text_vocab)?;
        let valid = encode_split(&cfg.valid_path, &valid, &label, &label_vocab, &text, &text_vocab)?;

        let pad_index = text_vocab
            .pad_index()
            .ok_or_else(|| Error::Config("text field has no padding token".into()))?;
        let device = B::resolve_device(cfg.device);
        let batcher = TextBatcher::<B>::new(device, pad_index).with_min_length(cfg.min_length);

        let train_iter = BucketIterator::new(
            Arc::new(TextDataset::new(train)),
            batcher.clone(),
            cfg.batch_size,
            BucketPolicy::Pooled { shuffle: cfg.shuffle },
            cfg.seed,
        )?;
        let valid_iter = BucketIterator::new(
            Arc::new(TextDataset::new(valid)),
            batcher,
            cfg.batch_size,
            BucketPolicy::Sorted,
            cfg.seed,
        )?;

        Ok(Self {
            label,
            text,
            label_vocab: Arc::new(label_vocab),
            text_vocab: Arc::new(text_vocab),
            train_iter,
            valid_iter,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.label_vocab.len()
    }
}

/// Encode one split through the training vocabularies.
pub fn encode_split(
    path: &std::path::Path,
    examples: &[Example],
    label: &Field,
    label_vocab: &Vocabulary,
    text: &Field,
    text_vocab: &Vocabulary,
) -> Result<Vec<EncodedExample>> {
    examples
        .iter()
        .map(|ex| {
            let context = |source| Error::Vocabulary {
                path: path.to_path_buf(),
                line: ex.line,
                source,
            };
            let label_ids = label
                .encode(std::slice::from_ref(&ex.label), label_vocab)
                .map_err(context)?;
            let tokens = text.encode(&ex.text, text_vocab).map_err(context)?;
            Ok(EncodedExample {
                label: label_ids[0],
                tokens,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::field::EncodeError;
    use burn::backend::NdArray;
    use std::io::Write;
    use tempfile::NamedTempFile;

    type TestBackend = NdArray;

    fn tsv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn load(train: &NamedTempFile, valid: &NamedTempFile, batch_size: usize) -> Result<DataLoader<TestBackend>> {
        let cfg = DataLoaderConfig::new(train.path(), valid.path())
            .with_batch_size(batch_size)
            .with_shuffle(false);
        DataLoader::load(&cfg)
    }

    #[test]
    fn test_two_line_scenario() {
        let contents = "positive\tgreat movie\nnegative\tterrible film\n";
        let (train, valid) = (tsv(contents), tsv(contents));
        let mut loader = load(&train, &valid, 2).unwrap();

        for t in ["great", "movie", "terrible", "film"] {
            assert!(loader.text_vocab.contains(t));
        }
        assert_eq!(loader.label_vocab.len(), 2);
        let pos = loader.label_vocab.index_of("positive").unwrap();
        let neg = loader.label_vocab.index_of("negative").unwrap();
        assert_ne!(pos, neg);
        assert!(pos < 2 && neg < 2);

        let batches: Vec<_> = loader.train_iter.iter().collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].batch_size(), 2);

        let valid_batches: Vec<_> = loader.valid_iter.iter().collect();
        assert_eq!(valid_batches.len(), 1);
        let mut labels = valid_batches[0].labels.clone().into_data().to_vec::<i64>().unwrap();
        labels.sort_unstable();
        assert_eq!(labels, vec![0, 1]);
    }

    #[test]
    fn test_unseen_valid_label_is_fatal() {
        let train = tsv("positive\tgood\nnegative\tbad\n");
        let valid = tsv("positive\tfine\nneutral\tmeh\n");
        let err = load(&train, &valid, 2).err().unwrap();
        match err {
            Error::Vocabulary { path, line, source } => {
                assert_eq!(path, valid.path());
                assert_eq!(line, 2);
                assert_eq!(source, EncodeError::UnknownToken("neutral".into()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_valid_tokens_never_enter_vocab() {
        let train = tsv("a\tone two\n");
        let valid = tsv("a\tthree four\n");
        let loader = load(&train, &valid, 4).unwrap();
        assert!(!loader.text_vocab.contains("three"));
        assert!(loader.text_vocab.contains("one"));
    }

    #[test]
    fn test_label_vocab_matches_distinct_labels() {
        let train = tsv("x\ta\ny\tb\nx\tc\nz\td\ny\te\n");
        let valid = tsv("z\ta\n");
        let loader = load(&train, &valid, 2).unwrap();
        assert_eq!(loader.num_classes(), 3);
        assert_eq!(loader.label_vocab.unk_index(), None);
    }

    #[test]
    fn test_parse_error_aborts_load() {
        let train = tsv("positive\tgood\nbroken line\n");
        let valid = tsv("positive\tgood\n");
        assert!(matches!(
            load(&train, &valid, 2),
            Err(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_zero_batch_size_is_config_error() {
        let train = tsv("a\tb\n");
        assert!(matches!(load(&train, &train, 0), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_split_is_config_error() {
        let train = tsv("a\tb\n");
        let empty = tsv("");
        assert!(matches!(
            load(&train, &empty, 2),
            Err(Error::Config(msg)) if msg.contains("no examples")
        ));
        assert!(matches!(load(&empty, &train, 2), Err(Error::Config(_))));
    }

    #[test]
    fn test_min_length_pads_every_batch() {
        let train = tsv("a\tx\nb\tx y\n");
        let cfg = DataLoaderConfig::new(train.path(), train.path())
            .with_batch_size(1)
            .with_min_length(5);
        let mut loader = DataLoader::<TestBackend>::load(&cfg).unwrap();
        assert!(loader.train_iter.iter().all(|b| b.text.dims()[1] >= 5));
    }

    #[test]
    fn test_eos_is_appended_and_indexed() {
        let train = tsv("a\tx\n");
        let cfg = DataLoaderConfig::new(train.path(), train.path())
            .with_batch_size(1)
            .with_use_eos(true);
        let mut loader = DataLoader::<TestBackend>::load(&cfg).unwrap();
        let eos = loader.text_vocab.eos_index().unwrap() as i64;
        let batch = loader.train_iter.iter().next().unwrap();
        let row = batch.text.into_data().to_vec::<i64>().unwrap();
        assert_eq!(row.last(), Some(&eos));
    }
}
