//! Bigram Language Model
//!
//! The simplest trainable language model: a single embedding table of shape
//! `(vocab_size, vocab_size)` where row `i` is directly the logits for the
//! token following token `i`. The entire forward computation is one lookup
//! per position — no attention, no hidden layers:
//!
//! ```text
//! Input tokens [batch, block]
//!     ↓  row lookup into the (V, V) embedding table
//! Logits [batch, block, vocab]
//!     ↓  reshape to [batch * block, vocab] (training only)
//! Cross-entropy loss (mean NLL under softmax)
//! ```
//!
//! Because each prediction depends only on the current token, the model
//! learns exactly the corpus's bigram statistics — a useful baseline and
//! the smallest model that exercises the full
//! sample → forward → loss → generate pipeline.
//!
//! ## Generation
//!
//! [`BigramLanguageModel::generate`] is a standard autoregressive loop:
//! forward the running sequence, take the final time step's logits, scale
//! by temperature, softmax into a distribution, sample one token per batch
//! row, append, repeat.
//!
//! ## Example
//!
//! ```rust
//! use cobweb::BigramLanguageModel;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let model = BigramLanguageModel::new(6, &mut rng);
//!
//! // Logits only
//! let (logits, loss) = model.forward(&[vec![2]], None).unwrap();
//! assert_eq!(logits.shape, vec![1, 1, 6]);
//! assert!(loss.is_none());
//!
//! // With targets: scalar loss
//! let (_, loss) = model.forward(&[vec![2]], Some(&[vec![3]])).unwrap();
//! assert!(loss.unwrap() >= 0.0);
//! ```

use crate::tensor::{Tensor, TensorError};
use rand::Rng;
use rand_distr::{weighted::WeightedIndex, Distribution, Normal};
use thiserror::Error;

/// Standard deviation for the N(0, 0.02) embedding initialization
/// (the GPT-2 convention).
const INIT_STD: f32 = 0.02;

/// Errors produced by the model's forward pass and generation loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A context or target token id is outside `[0, vocab_size)`.
    #[error("token id {id} out of range (vocab size {vocab_size})")]
    IndexOutOfRange { id: usize, vocab_size: usize },

    /// The batch has no rows, or a row has no tokens. Generation needs a
    /// last time step to sample from, and the forward pass has nothing to
    /// embed.
    #[error("empty context: batch must contain at least one non-empty row")]
    EmptyContext,

    /// The tensor engine rejected a shape.
    #[error("engine failure: {0}")]
    Engine(#[from] TensorError),

    /// The sampled probability row could not form a categorical
    /// distribution (e.g. all weights zero or non-finite).
    #[error("sampling failure: {0}")]
    Sampling(#[from] rand::distr::weighted::Error),
}

/// A bigram language model: one learnable `(vocab_size, vocab_size)`
/// embedding table.
///
/// The table is randomly initialized once and never mutated by the model
/// itself; an external optimizer owns updates between training steps.
pub struct BigramLanguageModel {
    vocab_size: usize,
    /// Embedding table of shape `(vocab_size, vocab_size)`; row `i` holds
    /// the next-token logits for token `i`.
    pub token_embedding_table: Tensor,
}

impl BigramLanguageModel {
    /// Create a model with N(0, 0.02)-initialized embeddings.
    ///
    /// Takes the random source explicitly so tests can seed it; production
    /// callers pass `rand::rng()` or a pipeline-owned seeded rng.
    pub fn new<R: Rng>(vocab_size: usize, rng: &mut R) -> Self {
        let normal = Normal::new(0.0_f32, INIT_STD).unwrap();
        let weight_data: Vec<f32> = (0..vocab_size * vocab_size)
            .map(|_| normal.sample(rng))
            .collect();

        Self {
            vocab_size,
            token_embedding_table: Tensor::new(weight_data, vec![vocab_size, vocab_size]),
        }
    }

    /// Vocabulary size this model was built for.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Forward pass: token ids → logits, and optionally cross-entropy loss.
    ///
    /// `contexts` is a rectangular `(B, T)` batch of token ids. The logits
    /// tensor has shape `(B, T, vocab_size)`, where `logits[b, t, :]` is
    /// the embedding-table row for `contexts[b][t]`.
    ///
    /// With `targets` (same `(B, T)` shape), the logits are reshaped to
    /// `(B·T, vocab_size)` and the loss is the mean negative log-likelihood
    /// of each target under the row's softmax distribution, computed via
    /// stable log-softmax. Without targets, no loss is computed.
    ///
    /// # Errors
    ///
    /// - [`ModelError::EmptyContext`] if the batch has no rows or a row is
    ///   empty.
    /// - [`ModelError::IndexOutOfRange`] if any context or target id is
    ///   `>= vocab_size`.
    /// - [`ModelError::Engine`] if the engine rejects a shape.
    ///
    /// # Panics
    ///
    /// Panics if the batch is ragged (rows of unequal length) or if
    /// `targets` has a different shape than `contexts`.
    pub fn forward(
        &self,
        contexts: &[Vec<usize>],
        targets: Option<&[Vec<usize>]>,
    ) -> Result<(Tensor, Option<f32>), ModelError> {
        let batch_size = contexts.len();
        if batch_size == 0 || contexts[0].is_empty() {
            return Err(ModelError::EmptyContext);
        }
        let block_size = contexts[0].len();

        let v = self.vocab_size;
        let mut logits_data = Vec::with_capacity(batch_size * block_size * v);
        for row in contexts {
            assert_eq!(row.len(), block_size, "ragged context batch");
            for &token_id in row {
                if token_id >= v {
                    return Err(ModelError::IndexOutOfRange {
                        id: token_id,
                        vocab_size: v,
                    });
                }
                // Copy this token's logit row from the embedding table.
                let start = token_id * v;
                logits_data.extend_from_slice(&self.token_embedding_table.data[start..start + v]);
            }
        }
        let logits = Tensor::new(logits_data, vec![batch_size, block_size, v]);

        let loss = match targets {
            None => None,
            Some(target_rows) => {
                assert_eq!(target_rows.len(), batch_size, "targets batch size mismatch");
                let mut flat_targets = Vec::with_capacity(batch_size * block_size);
                for row in target_rows {
                    assert_eq!(row.len(), block_size, "targets block size mismatch");
                    for &target_id in row {
                        if target_id >= v {
                            return Err(ModelError::IndexOutOfRange {
                                id: target_id,
                                vocab_size: v,
                            });
                        }
                        flat_targets.push(target_id);
                    }
                }

                let flat_logits = logits.reshape(&[batch_size * block_size, v])?;
                let loss = flat_logits.log_softmax_rows().nll_mean(&flat_targets)?;
                Some(loss)
            }
        };

        Ok((logits, loss))
    }

    /// Autoregressive generation: extend each seed row by `max_new_tokens`
    /// sampled tokens.
    ///
    /// Each step forwards the running sequences (no targets), slices the
    /// logits at the final time step, divides by `temperature`, applies
    /// softmax, and samples one token id per row from the resulting
    /// categorical distribution. Runs exactly `max_new_tokens` steps with
    /// no early stopping; `max_new_tokens == 0` returns the seed unchanged.
    ///
    /// Lower temperature sharpens the distribution toward the most likely
    /// token; 1.0 samples the model's distribution as-is.
    ///
    /// # Errors
    ///
    /// - [`ModelError::EmptyContext`] if the seed has no rows or a row is
    ///   empty (there is no last time step to sample from).
    /// - Any forward-pass error, propagated.
    /// - [`ModelError::Sampling`] if a probability row cannot form a
    ///   categorical distribution.
    ///
    /// # Panics
    ///
    /// Panics if `temperature` is not strictly positive.
    pub fn generate<R: Rng>(
        &self,
        seed: &[Vec<usize>],
        max_new_tokens: usize,
        temperature: f32,
        rng: &mut R,
    ) -> Result<Vec<Vec<usize>>, ModelError> {
        assert!(temperature > 0.0, "temperature must be positive");
        if seed.is_empty() || seed.iter().any(|row| row.is_empty()) {
            return Err(ModelError::EmptyContext);
        }

        let v = self.vocab_size;
        let mut sequences: Vec<Vec<usize>> = seed.to_vec();

        for _ in 0..max_new_tokens {
            let (logits, _) = self.forward(&sequences, None)?;

            // Slice out the final time step: (B, T, V) -> (B, V).
            let block_size = sequences[0].len();
            let mut last_step = Vec::with_capacity(sequences.len() * v);
            for b in 0..sequences.len() {
                let start = (b * block_size + (block_size - 1)) * v;
                last_step.extend_from_slice(&logits.data[start..start + v]);
            }
            let last_logits = Tensor::new(last_step, vec![sequences.len(), v]);

            let probs = last_logits.mul_scalar(1.0 / temperature).softmax_rows();

            for (b, row) in sequences.iter_mut().enumerate() {
                let dist = WeightedIndex::new(&probs.data[b * v..(b + 1) * v])?;
                row.push(dist.sample(rng));
            }
        }

        Ok(sequences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn model(vocab_size: usize) -> BigramLanguageModel {
        let mut rng = StdRng::seed_from_u64(42);
        BigramLanguageModel::new(vocab_size, &mut rng)
    }

    #[test]
    fn test_logits_shape() {
        let m = model(6);
        let (logits, loss) = m.forward(&[vec![2]], None).unwrap();
        assert_eq!(logits.shape, vec![1, 1, 6]);
        assert!(loss.is_none());
    }

    #[test]
    fn test_logits_are_embedding_rows() {
        let m = model(5);
        let (logits, _) = m.forward(&[vec![3, 0], vec![1, 1]], None).unwrap();
        assert_eq!(logits.shape, vec![2, 2, 5]);

        // logits[0, 0, :] must be embedding row 3.
        let row3 = &m.token_embedding_table.data[3 * 5..4 * 5];
        assert_eq!(&logits.data[0..5], row3);
    }

    #[test]
    fn test_loss_with_targets_is_nonnegative() {
        let m = model(6);
        let (_, loss) = m.forward(&[vec![2]], Some(&[vec![3]])).unwrap();
        let loss = loss.unwrap();
        assert!(loss >= 0.0);
        assert!(loss.is_finite());
    }

    #[test]
    fn test_loss_near_uniform_at_init() {
        // With N(0, 0.02) init the logits are nearly uniform, so the loss
        // should sit close to ln(vocab_size).
        let m = model(64);
        let contexts = vec![vec![0, 1, 2, 3], vec![10, 20, 30, 40]];
        let targets = vec![vec![1, 2, 3, 4], vec![20, 30, 40, 50]];
        let (_, loss) = m.forward(&contexts, Some(&targets)).unwrap();
        let loss = loss.unwrap();
        assert!((loss - 64.0_f32.ln()).abs() < 0.1, "loss was {}", loss);
    }

    #[test]
    fn test_context_id_out_of_range() {
        let m = model(6);
        let err = m.forward(&[vec![6]], None).unwrap_err();
        assert_eq!(err, ModelError::IndexOutOfRange { id: 6, vocab_size: 6 });
    }

    #[test]
    fn test_target_id_out_of_range() {
        let m = model(6);
        let err = m.forward(&[vec![2]], Some(&[vec![9]])).unwrap_err();
        assert_eq!(err, ModelError::IndexOutOfRange { id: 9, vocab_size: 6 });
    }

    #[test]
    fn test_empty_batch_is_an_error() {
        let m = model(6);
        assert_eq!(m.forward(&[], None).unwrap_err(), ModelError::EmptyContext);
        assert_eq!(
            m.forward(&[vec![]], None).unwrap_err(),
            ModelError::EmptyContext
        );
    }

    #[test]
    fn test_generate_length() {
        let m = model(6);
        let mut rng = StdRng::seed_from_u64(1);
        for n in [0, 1, 5, 20] {
            let out = m.generate(&[vec![2, 3]], n, 1.0, &mut rng).unwrap();
            assert_eq!(out[0].len(), 2 + n);
        }
    }

    #[test]
    fn test_generate_zero_tokens_is_identity() {
        let m = model(6);
        let mut rng = StdRng::seed_from_u64(1);
        let seed = vec![vec![2, 3, 1]];
        let out = m.generate(&seed, 0, 1.0, &mut rng).unwrap();
        assert_eq!(out, seed);
    }

    #[test]
    fn test_generate_preserves_seed_prefix() {
        let m = model(6);
        let mut rng = StdRng::seed_from_u64(9);
        let out = m.generate(&[vec![4, 0, 2]], 10, 1.0, &mut rng).unwrap();
        assert_eq!(&out[0][..3], &[4, 0, 2]);
    }

    #[test]
    fn test_generate_samples_valid_ids() {
        let m = model(4);
        let mut rng = StdRng::seed_from_u64(5);
        let out = m.generate(&[vec![0], vec![3]], 50, 1.0, &mut rng).unwrap();
        for row in &out {
            assert_eq!(row.len(), 51);
            assert!(row.iter().all(|&t| t < 4));
        }
    }

    #[test]
    fn test_generate_empty_seed_is_an_error() {
        let m = model(6);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            m.generate(&[], 5, 1.0, &mut rng).unwrap_err(),
            ModelError::EmptyContext
        );
        assert_eq!(
            m.generate(&[vec![]], 5, 1.0, &mut rng).unwrap_err(),
            ModelError::EmptyContext
        );
    }

    #[test]
    fn test_generate_is_reproducible_with_seeded_rng() {
        let m = model(8);
        let mut rng_a = StdRng::seed_from_u64(123);
        let mut rng_b = StdRng::seed_from_u64(123);
        let a = m.generate(&[vec![1]], 25, 0.8, &mut rng_a).unwrap();
        let b = m.generate(&[vec![1]], 25, 0.8, &mut rng_b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_model_parameters_unchanged_by_forward_and_generate() {
        let m = model(6);
        let before = m.token_embedding_table.data.clone();
        let mut rng = StdRng::seed_from_u64(2);
        let _ = m.forward(&[vec![1, 2]], Some(&[vec![2, 3]])).unwrap();
        let _ = m.generate(&[vec![0]], 10, 1.0, &mut rng).unwrap();
        assert_eq!(m.token_embedding_table.data, before);
    }
}
