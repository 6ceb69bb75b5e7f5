// ============================================================
// Layer 4 — Bucket Iterator
// ============================================================
// Turns a dataset into a restartable sequence of batches.
// Each call to `iter()` is one pass (epoch) over the split.
//
// Pooled policy (training split), per pass:
//   1. if shuffling, permute the example order
//   2. cut the order into pools of batch_size * POOL_FACTOR
//   3. stable-sort each pool by text length (ascending)
//   4. slice the pool into batches of batch_size
//   5. if shuffling, permute the batch order inside the pool
//
// Sorted policy (validation split):
//   stable-sort the whole split by length, slice, never shuffle.
//
// Inside a batch examples are always ordered by ascending
// length. Batch plans are index lists; tensors are only built
// when the consumer pulls the next batch.

use std::sync::Arc;

use burn::{
    data::{dataloader::batcher::Batcher, dataset::Dataset},
    prelude::*,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::{
    batcher::{TextBatch, TextBatcher},
    dataset::{EncodedExample, TextDataset},
};
use crate::error::{Error, Result};

/// Number of batches worth of examples sorted together in one pool.
pub const POOL_FACTOR: usize = 100;

/// How a pass groups examples into batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketPolicy {
    Pooled { shuffle: bool },
    Sorted,
}

pub struct BucketIterator<B: Backend> {
    dataset: Arc<TextDataset>,
    batcher: TextBatcher<B>,
    batch_size: usize,
    policy: BucketPolicy,
    rng: StdRng,
}

impl<B: Backend> BucketIterator<B> {
    pub fn new(
        dataset: Arc<TextDataset>,
        batcher: TextBatcher<B>,
        batch_size: usize,
        policy: BucketPolicy,
        seed: u64,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Config("batch size must be positive".into()));
        }
        Ok(Self {
            dataset,
            batcher,
            batch_size,
            policy,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Batches per pass (the last one may be smaller).
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    /// Start a new pass over the split.
    pub fn iter(&mut self) -> BatchIter<'_, B> {
        let plan = self.plan();
        tracing::debug!("Planned {} batches for this pass", plan.len());
        BatchIter {
            dataset: &self.dataset,
            batcher: &self.batcher,
            plan: plan.into_iter(),
        }
    }

    /// Index lists of one pass, in delivery order.
    fn plan(&mut self) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        let by_length = |dataset: &TextDataset, slice: &mut [usize]| {
            slice.sort_by_key(|&i| dataset.length_of(i));
        };

        match self.policy {
            BucketPolicy::Sorted => {
                by_length(&self.dataset, &mut order);
                order.chunks(self.batch_size).map(<[usize]>::to_vec).collect()
            }
            BucketPolicy::Pooled { shuffle } => {
                if shuffle {
                    order.shuffle(&mut self.rng);
                }

                let mut plan = Vec::with_capacity(self.num_batches());
                for pool in order.chunks_mut(self.batch_size * POOL_FACTOR) {
                    by_length(&self.dataset, pool);
                    let mut batches: Vec<Vec<usize>> =
                        pool.chunks(self.batch_size).map(<[usize]>::to_vec).collect();
                    if shuffle {
                        batches.shuffle(&mut self.rng);
                    }
                    plan.extend(batches);
                }
                plan
            }
        }
    }
}

/// One pass over a [`BucketIterator`].
pub struct BatchIter<'a, B: Backend> {
    dataset: &'a TextDataset,
    batcher: &'a TextBatcher<B>,
    plan: std::vec::IntoIter<Vec<usize>>,
}

impl<B: Backend> Iterator for BatchIter<'_, B> {
    type Item = TextBatch<B>;

    fn next(&mut self) -> Option<Self::Item> {
        let indices = self.plan.next()?;
        let mut items: Vec<EncodedExample> = indices
            .into_iter()
            .filter_map(|i| self.dataset.get(i))
            .collect();
        items.sort_by_key(EncodedExample::len);
        Some(self.batcher.batch(items))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.plan.size_hint()
    }
}

impl<B: Backend> ExactSizeIterator for BatchIter<'_, B> {}
