use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        Dropout, DropoutConfig, Embedding, EmbeddingConfig, Linear, LinearConfig,
    },
    prelude::*,
    tensor::{
        activation::{log_softmax, relu},
        Distribution,
    },
};

use crate::error::{self, Error};

/// Architecture of a [`CnnClassifier`], saved next to its weights.
#[derive(Config, Debug)]
pub struct CnnClassifierConfig {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub num_classes: usize,
    #[config(default = 0.5)]
    pub dropout: f64,
    /// Token positions covered by each filter group
    #[config(default = "vec![3, 4, 5]")]
    pub window_sizes: Vec<usize>,
    /// Feature maps per filter group, paired with `window_sizes`
    #[config(default = "vec![100, 100, 100]")]
    pub num_filters: Vec<usize>,
}

impl CnnClassifierConfig {
    pub fn validate(&self) -> error::Result<()> {
        let fail = |msg: String| Err(Error::Config(msg));

        if self.vocab_size == 0 || self.embedding_dim == 0 || self.num_classes == 0 {
            return fail(format!(
                "vocab_size, embedding_dim and num_classes must be positive \
                 (got {}, {}, {})",
                self.vocab_size, self.embedding_dim, self.num_classes
            ));
        }
        if self.window_sizes.len() != self.num_filters.len() {
            return fail(format!(
                "{} window sizes but {} filter counts",
                self.window_sizes.len(),
                self.num_filters.len()
            ));
        }
        if self.window_sizes.is_empty() {
            return fail("at least one convolution window is required".into());
        }
        if self.window_sizes.contains(&0) || self.num_filters.contains(&0) {
            return fail("window sizes and filter counts must be positive".into());
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return fail(format!("dropout must be in [0, 1), got {}", self.dropout));
        }
        Ok(())
    }

    /// Shortest sequence every filter can slide over.
    pub fn min_length(&self) -> usize {
        self.window_sizes.iter().copied().max().unwrap_or(1)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<CnnClassifier<B>> {
        self.validate()?;

        let embedding = EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device);
        let filters: Vec<ConvFilter<B>> = self
            .window_sizes
            .iter()
            .zip(&self.num_filters)
            .map(|(&window_size, &num_filters)| ConvFilter {
                conv: Conv2dConfig::new([1, num_filters], [window_size, self.embedding_dim])
                    .init(device),
                window_size,
                num_filters,
            })
            .collect();
        let generator = LinearConfig::new(self.num_filters.iter().sum(), self.num_classes).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();

        Ok(CnnClassifier {
            embedding,
            filters,
            dropout,
            generator,
            num_classes: self.num_classes,
            min_length: self.min_length(),
            training: true,
        })
    }
}

/// One group of same-width filters spanning the whole embedding.
#[derive(Module, Debug)]
pub struct ConvFilter<B: Backend> {
    pub conv: Conv2d<B>,
    pub window_size: usize,
    pub num_filters: usize,
}

impl<B: Backend> ConvFilter<B> {
    /// [batch, 1, length, dim] → rectified maps [batch, num_filters, length - window_size + 1]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 3> {
        relu(self.conv.forward(x)).squeeze::<3>(3)
    }
}

#[derive(Module, Debug)]
pub struct CnnClassifier<B: Backend> {
    pub embedding: Embedding<B>,
    pub filters: Vec<ConvFilter<B>>,
    pub dropout: Dropout,
    pub generator: Linear<B>,
    pub num_classes: usize,
    pub min_length: usize,
    /// Dropout is applied only while this is set
    pub training: bool,
}

impl<B: Backend> CnnClassifier<B> {
    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    pub fn with_training(mut self, training: bool) -> Self {
        self.training = training;
        self
    }

    /// Width of the pooled feature vector, `sum(num_filters)`.
    pub fn feature_dim(&self) -> usize {
        self.filters.iter().map(|f| f.num_filters).sum()
    }

    /// tokens: [batch, length] → log-probabilities: [batch, num_classes]
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> error::Result<Tensor<B, 2>> {
        let features = self.features(tokens)?;
        Ok(log_softmax(self.generator.forward(features), 1))
    }

    /// tokens: [batch, length] → pooled features: [batch, sum(num_filters)]
    pub fn features(&self, tokens: Tensor<B, 2, Int>) -> error::Result<Tensor<B, 2>> {
        let [batch_size, length] = tokens.dims();
        if batch_size == 0 || length == 0 {
            return Err(Error::Shape {
                expected: "[batch_size > 0, length > 0]".into(),
                actual: vec![batch_size, length],
            });
        }

        let x = self.embedding.forward(tokens); // [batch, length, dim]
        let x = self.pad_to_min_length(x);
        // Single input channel for the 2-D convolution
        let x = x.unsqueeze_dim::<4>(1); // [batch, 1, length, dim]

        let pooled: Vec<Tensor<B, 2>> = self
            .filters
            .iter()
            .map(|filter| {
                let maps = filter.forward(x.clone());
                let maps = if self.training {
                    self.apply_dropout(maps)
                } else {
                    maps
                };
                // Max over every remaining position → [batch, num_filters]
                maps.max_dim(2).squeeze::<2>(2)
            })
            .collect();

        Ok(Tensor::cat(pooled, 1))
    }

    pub fn forward_loss(
        &self,
        tokens: Tensor<B, 2, Int>,
        labels: Tensor<B, 1, Int>,
    ) -> error::Result<(Tensor<B, 1>, Tensor<B, 2>)> {
        let log_probs = self.forward(tokens)?;
        let loss = nll_loss(log_probs.clone(), labels);
        Ok((loss, log_probs))
    }

    /// Zero each activation with probability `p` and rescale the survivors
    /// by `1 / (1 - p)`. Runs on any backend, autodiff or not.
    fn apply_dropout(&self, maps: Tensor<B, 3>) -> Tensor<B, 3> {
        let p = self.dropout.prob;
        if p <= 0.0 {
            return maps;
        }
        let keep = 1.0 - p;
        let mask =
            Tensor::<B, 3>::random(maps.shape(), Distribution::Bernoulli(keep), &maps.device());
        maps * mask.div_scalar(keep)
    }

    /// Right-pad with zero vectors up to the widest window.
    fn pad_to_min_length(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch_size, length, dim] = x.dims();
        if length >= self.min_length {
            return x;
        }
        let pad = Tensor::zeros([batch_size, self.min_length - length, dim], &x.device());
        Tensor::cat(vec![x, pad], 1)
    }
}

/// Mean negative log-likelihood of `targets` under `log_probs`.
pub fn nll_loss<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    log_probs
        .gather(1, targets.unsqueeze_dim::<2>(1))
        .mean()
        .neg()
}
