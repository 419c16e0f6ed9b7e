//! Training Data Splitting and Batch Sampling
//!
//! This module turns an encoded corpus into randomized training batches.
//! The corpus is first split by position into a training prefix and a
//! validation suffix (no shuffling — validation stays a contiguous,
//! held-out tail). Batches are then drawn by sampling uniformly random
//! start offsets and slicing aligned (context, target) windows:
//!
//! ```text
//! Corpus:  [5, 1, 3, 3, 0, 7, 4, 1, ...]
//! Offset s = 2, block_size = 4
//!
//! context row: [3, 3, 0, 7]   corpus[s     .. s + block_size]
//! target row:  [3, 0, 7, 4]   corpus[s + 1 .. s + 1 + block_size]
//! ```
//!
//! The target row is the context row's corpus window shifted one position
//! forward, teaching the model to predict the next token at every position.
//!
//! ## Randomness
//!
//! The sampler owns no random state: every call takes `&mut impl Rng`, so
//! tests pass a seeded [`rand::rngs::StdRng`] and get reproducible batches,
//! while production callers pass whatever source they like. No state
//! persists between calls.
//!
//! ## Example
//!
//! ```rust
//! use cobweb::{Split, SplitCorpus};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let corpus = SplitCorpus::new((0..100).collect(), 0.9);
//! let mut rng = StdRng::seed_from_u64(42);
//! let (context, target) = corpus
//!     .sample_batch(Split::Train, 4, 8, &mut rng)
//!     .unwrap();
//! assert_eq!(context.len(), 4);
//! assert_eq!(context[0].len(), 8);
//! assert_eq!(target[0][0], context[0][1]);
//! ```

use rand::Rng;
use thiserror::Error;

/// Default fraction of the corpus used for training; the rest is the
/// validation suffix.
pub const TRAIN_FRACTION: f32 = 0.9;

/// Type alias for a batch of (context, target) rows.
/// Both members have shape `[batch_size][block_size]`.
pub type Batch = (Vec<Vec<usize>>, Vec<Vec<usize>>);

/// Errors produced by the batch sampler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    /// The selected corpus is too short to cut a single
    /// (context, target) window from.
    #[error(
        "insufficient data in {split:?} split: {actual} tokens, need more than {needed} \
         (block_size + 1)"
    )]
    InsufficientData {
        split: Split,
        needed: usize,
        actual: usize,
    },
}

/// Which side of the train/validation split to sample from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Validation,
}

/// An encoded corpus split into a training prefix and validation suffix.
///
/// The split is positional and deterministic: the first `train_fraction`
/// of tokens train, the remainder validate. Immutable after construction.
pub struct SplitCorpus {
    train: Vec<usize>,
    validation: Vec<usize>,
}

impl SplitCorpus {
    /// Split `tokens` by position.
    ///
    /// # Panics
    ///
    /// Panics if `train_fraction` is outside `[0.0, 1.0]`.
    pub fn new(tokens: Vec<usize>, train_fraction: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&train_fraction),
            "train_fraction must be in [0, 1], got {}",
            train_fraction
        );
        let mut train = tokens;
        let split_at = (train_fraction * train.len() as f32) as usize;
        let validation = train.split_off(split_at);
        Self { train, validation }
    }

    /// Number of tokens in the training split.
    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    /// Number of tokens in the validation split.
    pub fn validation_len(&self) -> usize {
        self.validation.len()
    }

    /// Draw one batch of aligned (context, target) rows from `split`.
    ///
    /// Each of the `batch_size` rows starts at an independent uniformly
    /// random offset in `[0, len - block_size)`; the context row is the
    /// `block_size` tokens at that offset and the target row is the same
    /// window shifted one token forward.
    ///
    /// # Errors
    ///
    /// [`DatasetError::InsufficientData`] if the selected corpus has
    /// `block_size` or fewer tokens — there is no valid start offset.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` or `block_size` is zero.
    pub fn sample_batch<R: Rng>(
        &self,
        split: Split,
        batch_size: usize,
        block_size: usize,
        rng: &mut R,
    ) -> Result<Batch, DatasetError> {
        assert!(batch_size >= 1, "batch_size must be at least 1");
        assert!(block_size >= 1, "block_size must be at least 1");

        let data = match split {
            Split::Train => &self.train,
            Split::Validation => &self.validation,
        };

        if data.len() <= block_size {
            return Err(DatasetError::InsufficientData {
                split,
                needed: block_size,
                actual: data.len(),
            });
        }

        let mut contexts = Vec::with_capacity(batch_size);
        let mut targets = Vec::with_capacity(batch_size);

        for _ in 0..batch_size {
            // s < len - block_size, so s + 1 + block_size <= len and the
            // target slice never runs off the end.
            let s = rng.random_range(0..data.len() - block_size);
            contexts.push(data[s..s + block_size].to_vec());
            targets.push(data[s + 1..s + 1 + block_size].to_vec());
        }

        Ok((contexts, targets))
    }
}
