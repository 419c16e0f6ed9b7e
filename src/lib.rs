//! Cobweb: Character-Level Bigram Language Model
//!
//! A character-level bigram language model implemented from scratch in
//! Rust. The model is deliberately minimal so the full pipeline stays
//! legible end to end: build a vocabulary from raw text, encode it, split
//! it, sample random batches, forward them through a single embedding
//! table, measure cross-entropy loss, and generate text autoregressively.
//!
//! # Modules
//!
//! - [`tensor`] - Flat-buffer tensor engine (matmul, softmax, NLL)
//! - [`vocab`] - Deterministic character vocabulary and codec
//! - [`dataset`] - Corpus splitting and random batch sampling
//! - [`model`] - The bigram model: forward, loss, generation
//! - [`pipeline`] - End-to-end run over a corpus
//! - [`training_logger`] - CSV metrics logging
//!
//! # Example
//!
//! ```rust,no_run
//! use cobweb::pipeline::{run, PipelineConfig};
//!
//! let text = std::fs::read_to_string("corpus.txt").unwrap();
//! let report = run(&text, &PipelineConfig::default(), None).unwrap();
//!
//! println!("vocab: {:?}", report.vocab);
//! println!("mean loss: {:.4}", report.mean_train_loss);
//! println!("sample: {}", report.sample);
//! ```

pub mod dataset;
pub mod model;
pub mod pipeline;
pub mod tensor;
pub mod training_logger;
pub mod vocab;

// Re-export main types for convenience
pub use dataset::{Batch, DatasetError, Split, SplitCorpus, TRAIN_FRACTION};
pub use model::{BigramLanguageModel, ModelError};
pub use pipeline::{run, PipelineConfig, PipelineError, PipelineReport};
pub use tensor::{Tensor, TensorError};
pub use training_logger::TrainingLogger;
pub use vocab::{VocabError, Vocabulary};
