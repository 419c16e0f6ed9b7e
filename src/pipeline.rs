//! Evaluation Pipeline
//!
//! This module wires the components into a single end-to-end run over a raw
//! text corpus:
//!
//! ```text
//! Raw text
//!     ↓  Vocabulary::from_text + encode
//! Token ids
//!     ↓  SplitCorpus::new (train / validation)
//! Split corpus
//!     ↓  sample_batch → model.forward (per evaluation step)
//! Loss curve
//!     ↓  model.generate + decode
//! Sampled text
//! ```
//!
//! There is no optimizer in the loop: each step samples a fresh random
//! batch, forwards it through the randomly initialized model, and records
//! the cross-entropy loss. The loop exists to demonstrate (and test) the
//! full data path; at initialization the losses hover near
//! `ln(vocab_size)`.
//!
//! All randomness flows from a single seeded [`StdRng`] owned by the run,
//! so a given corpus and [`PipelineConfig`] always produce identical
//! batches, losses, and sampled text.
//!
//! ## Example
//!
//! ```rust
//! use cobweb::pipeline::{run, PipelineConfig};
//!
//! let text: String = std::iter::repeat("the quick brown fox. ").take(50).collect();
//! let config = PipelineConfig {
//!     max_new_tokens: 20,
//!     ..PipelineConfig::default()
//! };
//!
//! let report = run(&text, &config, None).unwrap();
//! assert_eq!(report.vocab_size, report.vocab.chars().count());
//! assert!(report.mean_train_loss > 0.0);
//! ```

use crate::dataset::{DatasetError, Split, SplitCorpus, TRAIN_FRACTION};
use crate::model::{BigramLanguageModel, ModelError};
use crate::training_logger::TrainingLogger;
use crate::vocab::{VocabError, Vocabulary};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

/// Errors surfaced by a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Vocab(#[from] VocabError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("logging failure: {0}")]
    Log(#[from] std::io::Error),
}

/// Configuration for a pipeline run.
///
/// The defaults match the classic character-level setup: batches of 4
/// sequences of 8 tokens, a 90/10 train/validation split, 10 evaluation
/// steps, and 100 generated tokens at temperature 1.0.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of sequences per sampled batch.
    pub batch_size: usize,
    /// Tokens per sequence (context length).
    pub block_size: usize,
    /// Fraction of the corpus used for training; the rest is validation.
    pub train_fraction: f32,
    /// Number of forward-pass evaluation steps to run.
    pub eval_steps: usize,
    /// Tokens to sample during the generation phase.
    pub max_new_tokens: usize,
    /// Sampling temperature for generation. Must be positive.
    pub temperature: f32,
    /// Seed for the run's random source. Every batch offset, the model
    /// initialization, and generation sampling all derive from it.
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 4,
            block_size: 8,
            train_fraction: TRAIN_FRACTION,
            eval_steps: 10,
            max_new_tokens: 100,
            temperature: 1.0,
            seed: 42,
        }
    }
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Number of distinct characters in the corpus.
    pub vocab_size: usize,
    /// The vocabulary's characters in id order, as a string.
    pub vocab: String,
    /// Token counts of the train and validation splits.
    pub train_len: usize,
    pub validation_len: usize,
    /// Mean cross-entropy loss across the evaluation steps.
    pub mean_train_loss: f32,
    /// Loss on a single validation batch.
    pub validation_loss: f32,
    /// Text generated from a one-character seed after evaluation.
    pub sample: String,
}

/// Run the full pipeline over `text`.
///
/// Builds the vocabulary, encodes and splits the corpus, runs
/// `config.eval_steps` forward passes over fresh training batches (logging
/// each loss if a logger is given), measures loss on one validation batch,
/// and generates `config.max_new_tokens` characters from a seed containing
/// the corpus's first token.
///
/// # Errors
///
/// - [`PipelineError::Dataset`] if either split is too small for
///   `config.block_size`.
/// - [`PipelineError::Model`] or [`PipelineError::Vocab`] if a component
///   rejects its input.
/// - [`PipelineError::Log`] if the logger fails to write.
pub fn run(
    text: &str,
    config: &PipelineConfig,
    mut logger: Option<&mut TrainingLogger>,
) -> Result<PipelineReport, PipelineError> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let vocab = Vocabulary::from_text(text);
    let tokens = vocab.encode(text)?;
    let corpus = SplitCorpus::new(tokens, config.train_fraction);

    let model = BigramLanguageModel::new(vocab.size(), &mut rng);

    let mut total_loss = 0.0;
    for step in 1..=config.eval_steps {
        let (contexts, targets) = corpus.sample_batch(
            Split::Train,
            config.batch_size,
            config.block_size,
            &mut rng,
        )?;
        let (_, loss) = model.forward(&contexts, Some(&targets))?;
        let loss = loss.unwrap_or(0.0);
        total_loss += loss;

        if let Some(logger) = logger.as_deref_mut() {
            logger.log(step, loss, None)?;
        }
    }
    let mean_train_loss = if config.eval_steps > 0 {
        total_loss / config.eval_steps as f32
    } else {
        0.0
    };

    let (val_contexts, val_targets) = corpus.sample_batch(
        Split::Validation,
        config.batch_size,
        config.block_size,
        &mut rng,
    )?;
    let (_, val_loss) = model.forward(&val_contexts, Some(&val_targets))?;
    let validation_loss = val_loss.unwrap_or(0.0);

    // Seed generation with the corpus's first character.
    let seed_text: String = text.chars().take(1).collect();
    let seed = vocab.encode(&seed_text)?;
    let generated = model.generate(&[seed], config.max_new_tokens, config.temperature, &mut rng)?;
    let sample = vocab.decode(&generated[0])?;

    if let Some(logger) = logger.as_deref_mut() {
        logger.log(config.eval_steps + 1, validation_loss, Some(&sample))?;
    }

    Ok(PipelineReport {
        vocab_size: vocab.size(),
        vocab: vocab.as_string(),
        train_len: corpus.train_len(),
        validation_len: corpus.validation_len(),
        mean_train_loss,
        validation_loss,
        sample,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus_text() -> String {
        std::iter::repeat("the quick brown fox jumps over the lazy dog. ")
            .take(20)
            .collect()
    }

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            eval_steps: 3,
            max_new_tokens: 12,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_run_produces_a_complete_report() {
        let text = corpus_text();
        let report = run(&text, &small_config(), None).unwrap();

        assert_eq!(report.vocab_size, report.vocab.chars().count());
        assert_eq!(
            report.train_len + report.validation_len,
            text.chars().count()
        );
        assert!(report.mean_train_loss > 0.0);
        assert!(report.validation_loss > 0.0);
        // Seed character plus the requested new tokens.
        assert_eq!(report.sample.chars().count(), 1 + 12);
        assert!(report.sample.starts_with('t'));
    }

    #[test]
    fn test_run_is_reproducible_for_a_fixed_seed() {
        let text = corpus_text();
        let a = run(&text, &small_config(), None).unwrap();
        let b = run(&text, &small_config(), None).unwrap();
        assert_eq!(a.mean_train_loss, b.mean_train_loss);
        assert_eq!(a.validation_loss, b.validation_loss);
        assert_eq!(a.sample, b.sample);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let text = corpus_text();
        let a = run(&text, &small_config(), None).unwrap();
        let b = run(
            &text,
            &PipelineConfig {
                seed: 7,
                ..small_config()
            },
            None,
        )
        .unwrap();
        // Different model init and batch offsets make equal losses
        // vanishingly unlikely.
        assert_ne!(a.mean_train_loss, b.mean_train_loss);
    }

    #[test]
    fn test_initial_loss_near_uniform() {
        let text = corpus_text();
        let report = run(
            &text,
            &PipelineConfig {
                eval_steps: 20,
                max_new_tokens: 0,
                ..PipelineConfig::default()
            },
            None,
        )
        .unwrap();

        let uniform = (report.vocab_size as f32).ln();
        assert!(
            (report.mean_train_loss - uniform).abs() < 0.1,
            "mean loss {} vs ln(V) {}",
            report.mean_train_loss,
            uniform
        );
    }

    #[test]
    fn test_tiny_corpus_is_an_error() {
        // Validation split ends up smaller than block_size.
        let err = run("abcdefgh", &PipelineConfig::default(), None).unwrap_err();
        assert!(matches!(err, PipelineError::Dataset(_)));
    }
}
